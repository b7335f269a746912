//! Faithfulness scoring: what fraction of an answer's statements does the
//! retrieval context actually support?
//!
//! Two stages, both plain chat calls: one request decomposes the answer into
//! standalone statements, then one request per statement asks for a 0/1 verdict
//! given only the context. The score is the mean of the verdicts.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::conversation::Message;
use crate::prompt::PromptTemplate;
use crate::utils::llm::openai::ChatClient;
use crate::utils::postprocess::json::filter_to_json;

/// One extracted statement and whether the judge found it supported by the context.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementVerdict {
    pub statement: String,
    pub supported: bool,
}

/// Per-statement verdicts plus their mean.
#[derive(Debug, Clone)]
pub struct FaithfulnessReport {
    pub verdicts: Vec<StatementVerdict>,
    pub score: f32,
}

impl FaithfulnessReport {
    fn from_verdicts(verdicts: Vec<StatementVerdict>) -> Self {
        let supported = verdicts.iter().filter(|verdict| verdict.supported).count();
        let score = supported as f32 / verdicts.len() as f32;
        Self { verdicts, score }
    }
}

/// Judge that scores a generated answer against a retrieval context.
pub struct FaithfulnessJudge {
    client: ChatClient,
    extract_template: PromptTemplate,
    verdict_template: PromptTemplate,
}

impl FaithfulnessJudge {
    const EXTRACT_TEMPLATE_STR: &'static str = r#"Given a question and an answer, rewrite the answer as a list of short standalone statements. Each statement must be fully understandable on its own, without pronouns referring to earlier statements.
Question: {{question}}
Answer: {{answer}}
Respond with a JSON object of the form {"statements": ["...", "..."]} and nothing else."#;

    const VERDICT_TEMPLATE_STR: &'static str = r#"Consider the following context and statement. Decide whether the statement can be directly inferred from the context alone. Do not use any outside knowledge.
Context: ```{{context}}```
Statement: ```{{statement}}```
Respond with a JSON object of the form {"supported": 1} if the statement is inferable from the context, or {"supported": 0} if it is not, and nothing else."#;

    pub fn new(client: ChatClient) -> Self {
        Self {
            client,
            extract_template: PromptTemplate::new(Self::EXTRACT_TEMPLATE_STR),
            verdict_template: PromptTemplate::new(Self::VERDICT_TEMPLATE_STR),
        }
    }

    /// Score `answer` against `context`. An answer from which no statements can be
    /// extracted is an error, not a score.
    pub async fn score(&self, question: &str, answer: &str, context: &str) -> Result<FaithfulnessReport> {
        let statements = self.extract_statements(question, answer).await?;
        if statements.is_empty() {
            bail!("no statements could be extracted from the answer");
        }
        let mut verdicts = Vec::with_capacity(statements.len());
        for statement in statements {
            let supported = self.judge_statement(&statement, context).await?;
            verdicts.push(StatementVerdict { statement, supported });
        }
        Ok(FaithfulnessReport::from_verdicts(verdicts))
    }

    async fn extract_statements(&self, question: &str, answer: &str) -> Result<Vec<String>> {
        let prompt = self
            .extract_template
            .construct_prompt()
            .fill("question", question)
            .fill("answer", answer)
            .complete()?;
        let reply = self.client.complete(&[Message::user(prompt)]).await?;
        parse_statements(&reply.content)
    }

    async fn judge_statement(&self, statement: &str, context: &str) -> Result<bool> {
        let prompt = self
            .verdict_template
            .construct_prompt()
            .fill("context", context)
            .fill("statement", statement)
            .complete()?;
        let reply = self.client.complete(&[Message::user(prompt)]).await?;
        parse_verdict(&reply.content)
    }
}

fn parse_statements(raw: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct Extraction {
        statements: Vec<String>,
    }

    let value = filter_to_json(raw)?;
    let extraction: Extraction =
        serde_json::from_value(value).context("statement extraction reply did not match the schema")?;
    let statements = extraction
        .statements
        .into_iter()
        .map(|statement| statement.trim().to_string())
        .filter(|statement| !statement.is_empty())
        .collect();
    Ok(statements)
}

fn parse_verdict(raw: &str) -> Result<bool> {
    let value = filter_to_json(raw)?;
    match &value["supported"] {
        Value::Bool(supported) => Ok(*supported),
        Value::Number(number) => Ok(number.as_f64().map_or(false, |n| n != 0.0)),
        other => bail!("verdict reply carried no usable \"supported\" field: {}", other),
    }
}

#[cfg(test)]
mod test_faithfulness {
    use super::{parse_statements, parse_verdict, FaithfulnessReport, StatementVerdict};

    #[test]
    fn test_parse_statements() {
        let raw = r#"Sure! Here you go: {"statements": ["The sky is blue.", "  Water is wet. ", ""]}"#;
        let statements = parse_statements(raw).unwrap();
        assert_eq!(vec!["The sky is blue.".to_string(), "Water is wet.".to_string()], statements);
    }

    #[test]
    fn test_parse_statements_schema_mismatch() {
        assert!(parse_statements(r#"{"facts": ["a"]}"#).is_err());
        assert!(parse_statements("no json at all").is_err());
    }

    #[test]
    fn test_parse_verdict() {
        assert!(parse_verdict(r#"{"supported": 1}"#).unwrap());
        assert!(!parse_verdict(r#"{"supported": 0}"#).unwrap());
        assert!(parse_verdict(r#"{"supported": true}"#).unwrap());
        assert!(parse_verdict(r#"The verdict is {"supported": 1}"#).unwrap());
        assert!(parse_verdict(r#"{"verdict": "yes"}"#).is_err());
    }

    #[test]
    fn test_score_is_mean_of_verdicts() {
        let verdicts = vec![
            StatementVerdict { statement: "a".to_string(), supported: true },
            StatementVerdict { statement: "b".to_string(), supported: false },
            StatementVerdict { statement: "c".to_string(), supported: true },
            StatementVerdict { statement: "d".to_string(), supported: true },
        ];
        let report = FaithfulnessReport::from_verdicts(verdicts);
        assert!((report.score - 0.75).abs() < 1e-6);
    }
}
