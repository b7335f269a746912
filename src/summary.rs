//! # Running summary
//! A small schema-validated record the model keeps about an ongoing conversation:
//! who the user is, what is still unresolved, and a running prose summary.
//!
//! [Summarizer::update] sends the previous record and the current transcript to the
//! model and deserializes a **fresh** [ConversationSummary] from the reply. The
//! record is fully overwritten on each update, never merged field by field; when
//! the reply cannot be parsed the update fails and the caller keeps the previous
//! record.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::{Conversation, Message};
use crate::prompt::PromptTemplate;
use crate::utils::llm::openai::ChatClient;
use crate::utils::postprocess::json::filter_to_json;

/// What the model currently believes about the conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// Questions the user asked that have not been answered yet.
    #[serde(default)]
    pub unresolved_questions: Vec<String>,
    /// Running prose summary of the conversation so far.
    #[serde(default)]
    pub running_summary: String,
}

/// Maintains a [ConversationSummary] by asking the model to rewrite it.
pub struct Summarizer {
    client: ChatClient,
    template: PromptTemplate,
}

impl Summarizer {
    const SUMMARY_TEMPLATE_STR: &'static str = r#"You maintain a record about an ongoing conversation. Here is the record as of the previous turn:
{{previous_summary}}

Here is the full conversation transcript so far:
{{transcript}}

Rewrite the record from scratch so it reflects the whole transcript. Keep the running summary short and factual. Respond with a JSON object with exactly these fields and nothing else:
{"first_name": string or null, "last_name": string or null, "unresolved_questions": [string], "running_summary": string}"#;

    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            template: PromptTemplate::new(Self::SUMMARY_TEMPLATE_STR),
        }
    }

    /// Produce a fresh summary record for `conversation`, given the `previous` record.
    pub async fn update(&self, previous: &ConversationSummary, conversation: &Conversation) -> Result<ConversationSummary> {
        let previous_json = serde_json::to_string(previous)?;
        let prompt = self
            .template
            .construct_prompt()
            .fill("previous_summary", previous_json)
            .fill("transcript", conversation.transcript())
            .complete()?;
        let reply = self.client.complete(&[Message::user(prompt)]).await?;
        parse_summary(&reply.content)
    }
}

fn parse_summary(raw: &str) -> Result<ConversationSummary> {
    let value = filter_to_json(raw)?;
    serde_json::from_value(value).context("summary reply did not match the record schema")
}

#[cfg(test)]
mod test_summary {
    use super::{parse_summary, ConversationSummary};

    #[test]
    fn test_parse_summary() {
        let raw = r#"Here is the updated record:
{"first_name": "Ada", "last_name": null, "unresolved_questions": ["What is the deadline?"], "running_summary": "Ada asked about deadlines."}"#;
        let summary = parse_summary(raw).unwrap();
        assert_eq!(Some("Ada".to_string()), summary.first_name);
        assert_eq!(None, summary.last_name);
        assert_eq!(vec!["What is the deadline?".to_string()], summary.unresolved_questions);
        assert_eq!("Ada asked about deadlines.", summary.running_summary);
    }

    #[test]
    fn test_parse_summary_fills_missing_fields() {
        let summary = parse_summary(r#"{"running_summary": "Nothing yet."}"#).unwrap();
        assert_eq!(None, summary.first_name);
        assert!(summary.unresolved_questions.is_empty());
    }

    #[test]
    fn test_parse_summary_rejects_garbage() {
        assert!(parse_summary("the model rambled with no json").is_err());
        assert!(parse_summary(r#"{"running_summary": 3}"#).is_err());
    }

    #[test]
    fn test_default_record_is_empty() {
        let summary = ConversationSummary::default();
        assert_eq!(None, summary.first_name);
        assert_eq!(None, summary.last_name);
        assert!(summary.unresolved_questions.is_empty());
        assert!(summary.running_summary.is_empty());
    }
}
