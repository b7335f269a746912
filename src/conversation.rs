//! # Conversation
//! An ordered transcript of role-tagged messages with a token budget.
//!
//! A [Conversation] only ever mutates in two ways: a message is appended at the end,
//! or the oldest non-reserved message is evicted from the front when the running
//! token total exceeds the budget. The first message, when its role is
//! [Role::System], is reserved and survives every eviction.
//!
//! Token counting goes through [CountToken], so the budget can be enforced with the
//! cheap character-count proxy ([count_tokens_by_len](crate::utils::token::count_tokens_by_len))
//! or exactly with [Tiktoken](crate::utils::token::tiktoken::Tiktoken).

use std::fmt;
use serde::{Deserialize, Serialize};
use crate::utils::token::CountToken;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let role = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        write!(f, "{}", role)
    }
}

/// One turn of a conversation: a role and its text content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Optional participant name, forwarded to the chat endpoint when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An ordered message list under a token budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
    max_tokens: usize,
}

impl Conversation {
    /// The budget used by [Conversation::default], sized for the smaller chat models.
    pub const DEFAULT_TOKEN_BUDGET: usize = 4096;

    pub fn new(max_tokens: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_tokens,
        }
    }

    /// Start a conversation with a reserved system message.
    pub fn with_system(system: impl Into<String>, max_tokens: usize) -> Self {
        Self {
            messages: vec![Message::system(system)],
            max_tokens,
        }
    }

    /// Append a message, then evict the oldest non-reserved messages until the
    /// conversation fits the budget again.
    ///
    /// The just-appended message is not special: if it alone exceeds the whole
    /// budget it is evicted right back out, leaving at most the reserved system
    /// message. An oversized system message is never dropped, even when it keeps
    /// the total over budget on its own.
    pub fn push(&mut self, message: Message, counter: &impl CountToken) {
        self.messages.push(message);
        self.enforce_budget(counter);
    }

    pub fn push_user(&mut self, content: impl Into<String>, counter: &impl CountToken) {
        self.push(Message::user(content), counter);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>, counter: &impl CountToken) {
        self.push(Message::assistant(content), counter);
    }

    /// The messages in chronological order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// The reserved system message text, if the conversation starts with one.
    pub fn system_prompt(&self) -> Option<&str> {
        match self.messages.first() {
            Some(msg) if msg.role == Role::System => Some(msg.content.as_str()),
            _ => None,
        }
    }

    /// Sum of per-message content token counts under the given counter.
    pub fn token_count(&self, counter: &impl CountToken) -> usize {
        self.messages.iter().map(|msg| counter.count_token(&msg.content)).sum()
    }

    /// Drop everything except the reserved system message.
    pub fn clear(&mut self) {
        let reserved = self.reserved_len();
        self.messages.truncate(reserved);
    }

    /// Render the transcript as `role: content` lines, oldest first.
    /// This is the form the summarizer feeds back to the model.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|msg| format!("{}: {}", msg.role, msg.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn reserved_len(&self) -> usize {
        match self.messages.first() {
            Some(msg) if msg.role == Role::System => 1,
            _ => 0,
        }
    }

    fn enforce_budget(&mut self, counter: &impl CountToken) {
        let reserved = self.reserved_len();
        while self.token_count(counter) > self.max_tokens && self.messages.len() > reserved {
            self.messages.remove(reserved);
        }
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TOKEN_BUDGET)
    }
}

#[cfg(test)]
mod test_conversation {
    use crate::utils::token::count_tokens_by_len;
    use super::{Conversation, Message, Role};

    #[test]
    fn test_order_is_chronological() {
        let mut conversation = Conversation::with_system("sys", 1000);
        conversation.push_user("first", &count_tokens_by_len);
        conversation.push_assistant("second", &count_tokens_by_len);
        conversation.push_user("third", &count_tokens_by_len);
        let contents: Vec<&str> = conversation.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(vec!["sys", "first", "second", "third"], contents);
    }

    #[test]
    fn test_eviction_skips_reserved_system() {
        // budget of 16 chars, system takes 3
        let mut conversation = Conversation::with_system("sys", 16);
        conversation.push_user("aaaa", &count_tokens_by_len);
        conversation.push_assistant("bbbb", &count_tokens_by_len);
        conversation.push_user("cccc", &count_tokens_by_len);
        assert_eq!(4, conversation.len());
        // 3 + 12 = 15 <= 16, one more message tips it over and evicts "aaaa"
        conversation.push_assistant("dddd", &count_tokens_by_len);
        assert_eq!(Some("sys"), conversation.system_prompt());
        let contents: Vec<&str> = conversation.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(vec!["sys", "bbbb", "cccc", "dddd"], contents);
    }

    #[test]
    fn test_oversized_message_is_evicted() {
        let mut conversation = Conversation::with_system("sys", 10);
        conversation.push_user("a".repeat(50), &count_tokens_by_len);
        // only the reserved system message survives
        assert_eq!(1, conversation.len());
        assert_eq!(Some("sys"), conversation.system_prompt());
    }

    #[test]
    fn test_oversized_system_is_kept() {
        let mut conversation = Conversation::with_system("s".repeat(50), 10);
        conversation.push_user("hello", &count_tokens_by_len);
        assert_eq!(1, conversation.len());
        assert_eq!(Role::System, conversation.messages()[0].role);
    }

    #[test]
    fn test_no_system_evicts_from_front() {
        let mut conversation = Conversation::new(10);
        conversation.push_user("aaaaaa", &count_tokens_by_len);
        conversation.push_assistant("bbbbbb", &count_tokens_by_len);
        let contents: Vec<&str> = conversation.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(vec!["bbbbbb"], contents);
    }

    #[test]
    fn test_zero_budget() {
        let mut conversation = Conversation::with_system("sys", 0);
        conversation.push_user("hello", &count_tokens_by_len);
        assert_eq!(1, conversation.len());
        let mut bare = Conversation::new(0);
        bare.push_user("hello", &count_tokens_by_len);
        assert!(bare.is_empty());
    }

    #[test]
    fn test_clear_keeps_system() {
        let mut conversation = Conversation::with_system("sys", 1000);
        conversation.push_user("hello", &count_tokens_by_len);
        conversation.clear();
        assert_eq!(1, conversation.len());
        assert_eq!(Some("sys"), conversation.system_prompt());
    }

    #[test]
    fn test_transcript() {
        let mut conversation = Conversation::with_system("be brief", 1000);
        conversation.push_user("hi", &count_tokens_by_len);
        conversation.push_assistant("hello", &count_tokens_by_len);
        assert_eq!("system: be brief\nuser: hi\nassistant: hello", conversation.transcript());
    }

    #[test]
    fn test_message_serde_roundtrip() {
        let msg = Message::user("hi");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(r#"{"role":"user","content":"hi"}"#, json);
        assert_eq!(msg, serde_json::from_str(&json).unwrap());
    }
}
