//! Token counting traits and utilities

use std::collections::{HashMap, HashSet};

use crate::prompt::errors::PlaceholderNotExist;
use crate::prompt::PartialPrompt;
use crate::utils::prompt_processing::{strip_format, PLACEHOLDER_MATCH_RE};

pub mod tiktoken;

/// Trait for counting tokens in a string.
pub trait CountToken {
    fn count_token(&self, string: &str) -> usize;
}

/// Blanket impl of CountToken for Fn(&str) -> usize.
impl<F> CountToken for F where F: Fn(&str) -> usize {
    fn count_token(&self, string: &str) -> usize {
        self(string)
    }
}

/// Count the number of tokens in a string by the length of the string.
/// This is the character-count proxy the conversation budget defaults to.
#[inline]
pub fn count_tokens_by_len(string: &str) -> usize {
    string.len()
}

/// Cache for counting tokens in a [PartialPrompt](crate::prompt::PartialPrompt).
///
/// Counting a long template is the expensive part, so the template count and the
/// per-placeholder occurrence/token counts are computed once. Previewing a fill
/// value is then a per-placeholder delta, which may be negative when the value
/// counts fewer tokens than the placeholder name it replaces.
#[derive(Debug, Clone)]
#[readonly::make]
pub struct PromptTokenCountCache<'a, C: CountToken> {
    /// The token count of the template of the partial prompt. Placeholders are counted as their `{{name}}` text.
    pub template_token_count: usize,
    all_placeholders: &'a HashSet<String>,
    placeholder_to_val: &'a HashMap<String, Option<String>>,
    placeholder_occurrence: HashMap<&'a str, usize>,
    placeholder_token_count: HashMap<&'a str, usize>,
    counter: &'a C,
}

impl<'a, C: CountToken> PromptTokenCountCache<'a, C> {
    fn get_placeholder_occurrence(string: &'a str, placeholders: &'a HashSet<String>) -> HashMap<&'a str, usize> {
        let mut count: HashMap<&str, usize> = placeholders.iter().map(|s| (s.as_str(), 0)).collect();
        PLACEHOLDER_MATCH_RE
            .captures_iter(string)
            .for_each(|captures| {
                let placeholder_name = strip_format(&captures[0]);
                let count = count.get_mut(placeholder_name).unwrap();
                *count += 1;
            });
        count
    }

    /// Create a new cache for counting tokens in a [PartialPrompt](crate::prompt::PartialPrompt).
    pub fn new(partial_prompt: &'a PartialPrompt, counter: &'a C) -> Self {
        let template_str = partial_prompt.template.str();
        let template_token_count = counter.count_token(template_str);
        let placeholder_occurrence = Self::get_placeholder_occurrence(template_str, &partial_prompt.template.placeholders);
        // a filled slot replaces the whole `{{name}}` occurrence, so that is what gets costed
        let placeholder_token_count = partial_prompt.template.placeholders.iter()
            .map(|p| (p.as_str(), counter.count_token(&format!("{{{{{}}}}}", p))))
            .collect();
        Self {
            template_token_count,
            all_placeholders: &partial_prompt.template.placeholders,
            placeholder_to_val: &partial_prompt.placeholder_to_vals,
            placeholder_occurrence,
            placeholder_token_count,
            counter,
        }
    }

    fn delta_for(&self, placeholder: &str, fill_value: Option<&String>) -> isize {
        // an unfilled slot stays as its `{{name}}` text, which the template count already covers
        match fill_value {
            None => 0,
            Some(value) => {
                let value_token_count = self.counter.count_token(value) as isize;
                let placeholder_token_count = *self.placeholder_token_count.get(placeholder).unwrap() as isize;
                let placeholder_occurrence = *self.placeholder_occurrence.get(placeholder).unwrap() as isize;
                (value_token_count - placeholder_token_count) * placeholder_occurrence
            }
        }
    }

    /// Count the tokens of the prompt as if the given placeholder were filled with the given value.
    /// Note that this does not change the partial prompt itself. Unfilled placeholders are counted
    /// as their `{{name}}` text.
    /// Returns an error if the placeholder does not exist.
    pub fn preview_fill(&self, placeholder_name: impl Into<String>, fill_value: impl Into<String>) -> Result<usize, PlaceholderNotExist> {
        let placeholder_name = placeholder_name.into();
        let fill_value = fill_value.into();
        if !self.placeholder_occurrence.contains_key(placeholder_name.as_str()) {
            return Err(PlaceholderNotExist::new(placeholder_name, fill_value, self.all_placeholders));
        }
        let total_delta: isize = self.all_placeholders.iter()
            .map(|placeholder| {
                let placeholder = placeholder.as_str();
                let fill_value = if placeholder == placeholder_name {
                    Some(&fill_value)
                } else {
                    self.placeholder_to_val.get(placeholder).unwrap().as_ref()
                };
                self.delta_for(placeholder, fill_value)
            })
            .sum();

        Ok((self.template_token_count as isize + total_delta).max(0) as usize)
    }

    /// Count the tokens of the prompt as if the given placeholders were filled with the given values.
    /// Note that this does not change the partial prompt itself. Unfilled placeholders are counted
    /// as their `{{name}}` text.
    /// Returns an error if any of the placeholders does not exist.
    pub fn preview_fill_many(&self, mappings: &HashMap<String, String>) -> Result<usize, PlaceholderNotExist> {
        for (placeholder_to_fill, value) in mappings {
            if !self.all_placeholders.contains(placeholder_to_fill.as_str()) {
                return Err(PlaceholderNotExist::new(placeholder_to_fill, value, self.all_placeholders));
            }
        }
        let total_delta: isize = self.all_placeholders.iter()
            .map(|placeholder| {
                let placeholder = placeholder.as_str();
                let fill_value = mappings.get(placeholder).or(self.placeholder_to_val.get(placeholder).unwrap().as_ref());
                self.delta_for(placeholder, fill_value)
            })
            .sum();

        Ok((self.template_token_count as isize + total_delta).max(0) as usize)
    }
}

#[cfg(test)]
mod test_token {
    use std::collections::HashMap;
    use crate::prompt::PromptTemplate;
    use super::{count_tokens_by_len, CountToken};

    #[test]
    fn test_str_len_impl() {
        let counter = str::len;
        let size = counter.count_token("");
        assert_eq!(0, size);
    }

    #[test]
    fn test_preview_fill() {
        let template = PromptTemplate::new("{{name}} says hi to {{name}} and {{other}}");
        let partial_prompt = template.construct_prompt();
        let cache = partial_prompt.with_counter_cache(&count_tokens_by_len);
        // "name" occurs twice: each {{name}} (8 chars) becomes "bo" (2 chars)
        let expected = template.str().len() - 2 * ("{{name}}".len() - "bo".len());
        assert_eq!(expected, cache.preview_fill("name", "bo").unwrap());
        assert!(cache.preview_fill("nope", "x").is_err());
    }

    #[test]
    fn test_preview_fill_many_matches_complete() {
        let template = PromptTemplate::new("{{a}} and {{b}}");
        let mut partial_prompt = template.construct_prompt();
        let mapping = HashMap::from([
            ("a".to_string(), "alice".to_string()),
            ("b".to_string(), "bob".to_string()),
        ]);
        let previewed = {
            let cache = partial_prompt.with_counter_cache(&count_tokens_by_len);
            cache.preview_fill_many(&mapping).unwrap()
        };
        partial_prompt.fill("a", "alice").fill("b", "bob");
        assert_eq!(previewed, partial_prompt.complete().unwrap().len());
    }
}
