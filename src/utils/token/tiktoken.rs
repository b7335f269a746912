use std::collections::HashMap;
use anyhow::Result;
pub use tiktoken_rs::{get_bpe_from_model, CoreBPE};

use crate::conversation::Message;
use crate::utils::token::CountToken;
use lazy_static::lazy_static;

const TOKENS_PER_MESSAGE: usize = 3;
const TOKENS_PER_NAME: usize = 1;

lazy_static! {
    /// const map from model name to max tokens.
    /// TODO: when `LazyCell` is stabilized, use that instead
    pub static ref MODEL_TO_MAX_TOKENS: HashMap<&'static str, usize> = HashMap::from([
        ("gpt-4", 8192),
        ("gpt-4-0613", 8192),
        ("gpt-4-32k", 32768),
        ("gpt-4-32k-0613", 32768),
        ("gpt-3.5-turbo", 4096),
        ("gpt-3.5-turbo-16k", 16384),
        ("gpt-3.5-turbo-0613", 4096),
        ("gpt-3.5-turbo-16k-0613", 16384),
    ]);
}

/// Counter using the Tiktoken tokenizer.
#[derive(Clone)]
#[readonly::make]
pub struct Tiktoken {
    /// The model family name of the tokenizer. read-only.
    pub model: String,
    /// The tokenizer. read-only.
    pub bpe: CoreBPE,
}

impl Tiktoken {
    /// Create a new Tiktoken counter.
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        assert!(MODEL_TO_MAX_TOKENS.contains_key(model.as_str()), "model {} is not supported", model);
        let model = if model.starts_with("gpt-4-32k") {
            "gpt-4-32k"
        } else if model.starts_with("gpt-4") {
            "gpt-4"
        } else if model.starts_with("gpt-3.5") {
            "gpt-3.5-turbo"
        } else {
            unreachable!()
        };
        get_bpe_from_model(model).map(|bpe| Tiktoken {
            model: model.to_string(),
            bpe,
        })
    }

    /// The context window of the model this counter tokenizes for.
    pub fn max_tokens(&self) -> usize {
        *MODEL_TO_MAX_TOKENS.get(self.model.as_str()).unwrap()
    }

    /// Count the tokens a message occupies in an OpenAI-format chat request.
    /// Following best practices from the OpenAI cookbook: message content plus
    /// a fixed per-message overhead, assuming the model is NOT the legacy
    /// `gpt-3.5-turbo-0301`.
    pub fn count_message_tokens(&self, msg: &Message) -> usize {
        let content_token_count = self.count_token(msg.content.as_str());
        let name_token_count = if msg.name.is_some() { TOKENS_PER_NAME } else { 0 };
        content_token_count + name_token_count + TOKENS_PER_MESSAGE
    }
}

impl CountToken for Tiktoken {
    fn count_token(&self, string: &str) -> usize {
        self.bpe.encode_with_special_tokens(string).len()
    }
}

#[cfg(test)]
mod test_tiktoken {
    use crate::conversation::Message;
    use crate::utils::token::CountToken;
    use super::Tiktoken;

    #[test]
    fn test_message_overhead() {
        let counter = Tiktoken::new("gpt-3.5-turbo").unwrap();
        let msg = Message::user("hello");
        let content = counter.count_token("hello");
        assert_eq!(content + 3, counter.count_message_tokens(&msg));
    }

    #[test]
    #[should_panic]
    fn test_unknown_model() {
        let _ = Tiktoken::new("text-davinci-003");
    }
}
