//! # Techniques
//! The two prompt-engineering staples: chain-of-thought and few-shot prompting.
//!
//! Neither is clever. Chain-of-thought appends one instruction; few-shot arranges
//! example input/output pairs ahead of the real query so the model mimics their
//! format. Both exist so that the arrangement is written down once instead of
//! re-concatenated in every call site.

use crate::conversation::Message;

/// The step-by-step instruction appended by [chain_of_thought].
pub const CHAIN_OF_THOUGHT_INSTRUCTION: &str =
    "Think step by step before answering, then give the final answer on its own last line.";

/// Append the chain-of-thought instruction to a prompt.
pub fn chain_of_thought(prompt: &str) -> String {
    let mut prompt = prompt.trim_end().to_string();
    prompt.push_str("\n\n");
    prompt.push_str(CHAIN_OF_THOUGHT_INSTRUCTION);
    prompt
}

/// One worked example: an input and the output the model should produce for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub input: String,
    pub output: String,
}

/// A few-shot prompt: an instruction plus ordered worked examples.
///
/// Render it with [FewShotPrompt::messages] for chat endpoints (the form used for
/// few-shot classification: each example becomes a user/assistant pair) or with
/// [FewShotPrompt::prompt] as one flat string for single-prompt endpoints.
#[derive(Debug, Clone)]
pub struct FewShotPrompt {
    instruction: String,
    examples: Vec<Example>,
}

impl FewShotPrompt {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            examples: Vec::new(),
        }
    }

    /// Append one worked example. Order is preserved in the rendered prompt.
    pub fn example(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.examples.push(Example {
            input: input.into(),
            output: output.into(),
        });
        self
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Render as a chat message list: the instruction as the system message, each
    /// example as a user/assistant pair, and `query` as the final user message.
    pub fn messages(&self, query: impl Into<String>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.examples.len() * 2 + 2);
        messages.push(Message::system(self.instruction.as_str()));
        for example in &self.examples {
            messages.push(Message::user(example.input.as_str()));
            messages.push(Message::assistant(example.output.as_str()));
        }
        messages.push(Message::user(query));
        messages
    }

    /// Render as one flat prompt with `Input:`/`Output:` markers, ending with a
    /// trailing `Output:` cue for the model to continue.
    pub fn prompt(&self, query: impl Into<String>) -> String {
        let mut prompt = String::new();
        prompt.push_str(self.instruction.as_str());
        prompt.push_str("\n");
        for example in &self.examples {
            prompt.push_str("\nInput: ");
            prompt.push_str(example.input.as_str());
            prompt.push_str("\nOutput: ");
            prompt.push_str(example.output.as_str());
            prompt.push_str("\n");
        }
        prompt.push_str("\nInput: ");
        prompt.push_str(&query.into());
        prompt.push_str("\nOutput:");
        prompt
    }
}

#[cfg(test)]
mod test_techniques {
    use crate::conversation::Role;
    use super::{chain_of_thought, FewShotPrompt, CHAIN_OF_THOUGHT_INSTRUCTION};

    #[test]
    fn test_chain_of_thought_appends_instruction() {
        let prompt = chain_of_thought("How many weeks are in a year?  ");
        assert!(prompt.starts_with("How many weeks are in a year?"));
        assert!(prompt.ends_with(CHAIN_OF_THOUGHT_INSTRUCTION));
    }

    #[test]
    fn test_few_shot_messages() {
        let few_shot = FewShotPrompt::new("Classify the sentiment as positive or negative.")
            .example("I loved it", "positive")
            .example("Terrible service", "negative");
        let messages = few_shot.messages("The food was great");

        assert_eq!(6, messages.len());
        assert_eq!(Role::System, messages[0].role);
        assert_eq!(Role::User, messages[1].role);
        assert_eq!("I loved it", messages[1].content);
        assert_eq!(Role::Assistant, messages[2].role);
        assert_eq!("positive", messages[2].content);
        assert_eq!(Role::User, messages[5].role);
        assert_eq!("The food was great", messages[5].content);
    }

    #[test]
    fn test_few_shot_flat_prompt() {
        let few_shot = FewShotPrompt::new("Classify.").example("a", "x");
        let prompt = few_shot.prompt("b");
        assert_eq!("Classify.\n\nInput: a\nOutput: x\n\nInput: b\nOutput:", prompt);
    }

    #[test]
    fn test_no_examples_still_renders() {
        let few_shot = FewShotPrompt::new("Answer briefly.");
        let messages = few_shot.messages("hi");
        assert_eq!(2, messages.len());
    }
}
