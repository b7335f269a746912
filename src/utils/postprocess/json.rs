use serde_json::{from_str, Value};
use anyhow::Result;
use std::error::Error;
use std::fmt;
use std::fmt::Formatter;


/// Filters invalid content and tries to parse the valid json string.
///
/// Models rarely answer with bare JSON even when told to, so this takes everything
/// between the first `{` and the last `}` and parses that.
///
/// Returns a [serde_json::Value] if the string contains valid json else an [InvalidJson] error.
///
/// # Example
/// ```
/// use promptkit::utils::postprocess::json::filter_to_json;
/// let valid_str = "partially valid: {\"a\":\"alice\"}";
/// let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
/// assert_eq!(json_value["a"], "alice");
///
/// let invalid_str = "partially valid: \"a\":\"alice\"}";
/// assert_eq!(filter_to_json(invalid_str).is_err(), true)
/// ```
pub fn filter_to_json(string: impl Into<String>) -> Result<Value> {
    let string = string.into();
    let left_brace_idx = string.find('{');
    let right_brace_idx = string.rfind('}');
    match (left_brace_idx, right_brace_idx) {
        (Some(lbi), Some(rbi)) if lbi < rbi => {
            let valid_json = &string[lbi..rbi + 1];
            let value = from_str(valid_json)?;
            Ok(value)
        }
        _ => Err(InvalidJson { invalid_string: string }.into())
    }
}

/// Error when the string does not contain a valid json object.
#[derive(Debug, Clone)]
pub struct InvalidJson {
    pub invalid_string: String,
}


impl fmt::Display for InvalidJson {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid string to be parsed:\n{}", self.invalid_string)
    }
}

impl Error for InvalidJson {}


#[cfg(test)]
mod test_json {
    use super::filter_to_json;

    #[test]
    fn test_filter_to_json() {
        let valid_str = "{\"a\":\"alice\"}";
        let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
        assert_eq!(json_value["a"], "alice");

        let valid_str = "Here is the result you ask for: {\"a\":\"alice\"}";
        let json_value = filter_to_json(valid_str).expect("Expect to be fine but failed");
        assert_eq!(json_value["a"], "alice");

        let invalid_str = "Here is the result you ask for: {\"a\":\"alice\"";
        filter_to_json(invalid_str).expect_err("This should give error but not");

        let invalid_str = "{{}}";
        filter_to_json(invalid_str).expect_err("This should give error but not");

        let invalid_str = "} backwards {";
        filter_to_json(invalid_str).expect_err("This should give error but not");
    }
}
