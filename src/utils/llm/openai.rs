//! Thin wrapper over the OpenAI chat endpoint.
//!
//! [ChatClient] converts this crate's [Message](crate::conversation::Message) records
//! into request messages at the boundary and hands back the reply content, optional
//! token log-probabilities and usage. Failures are the API's own error responses
//! surfaced through [anyhow]; there is deliberately no retry or backoff layer here.

use anyhow::{anyhow, bail, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionResponseStream, CompletionUsage, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_openai::Client;
use serde::{Deserialize, Serialize};

use crate::conversation::{Message, Role};

/// Generation settings shared by every request a [ChatClient] sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model name, e.g. `gpt-4` or `gpt-3.5-turbo`.
    pub model: String,
    /// Sampling temperature. Left to the API default when unset.
    pub temperature: Option<f32>,
    /// Completion length cap. Left to the API default when unset.
    pub max_tokens: Option<u16>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ChatConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u16) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The log-probability of one sampled token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLogprob {
    pub token: String,
    pub logprob: f32,
}

/// One chat completion: the reply text plus whatever bookkeeping came with it.
#[derive(Debug, Clone)]
pub struct ChatOutput {
    pub content: String,
    /// Per-token log-probabilities; empty unless requested.
    pub logprobs: Vec<TokenLogprob>,
    pub usage: Option<CompletionUsage>,
}

/// Chat endpoint client: an `async-openai` client plus a [ChatConfig].
#[derive(Debug, Clone)]
pub struct ChatClient {
    pub client: Client<OpenAIConfig>,
    pub config: ChatConfig,
}

impl ChatClient {
    /// Create a client reading the API key from the `OPENAI_API_KEY` environment variable.
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_api_key(api_key: impl Into<String>, config: ChatConfig) -> Self {
        let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key));
        Self { client, config }
    }

    fn to_request_message(message: &Message) -> Result<ChatCompletionRequestMessage> {
        let request_message = match message.role {
            Role::System => {
                let mut args = ChatCompletionRequestSystemMessageArgs::default();
                args.content(message.content.as_str());
                if let Some(name) = &message.name {
                    args.name(name.as_str());
                }
                args.build()?.into()
            }
            Role::User => {
                let mut args = ChatCompletionRequestUserMessageArgs::default();
                args.content(message.content.as_str());
                if let Some(name) = &message.name {
                    args.name(name.as_str());
                }
                args.build()?.into()
            }
            Role::Assistant => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                args.content(message.content.as_str());
                if let Some(name) = &message.name {
                    args.name(name.as_str());
                }
                args.build()?.into()
            }
        };
        Ok(request_message)
    }

    fn build_request(&self, messages: &[Message], top_logprobs: Option<u8>) -> Result<CreateChatCompletionRequest> {
        let messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>>>()?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.config.model.as_str()).messages(messages);
        if let Some(temperature) = self.config.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            args.max_tokens(max_tokens);
        }
        if let Some(top) = top_logprobs {
            args.logprobs(true).top_logprobs(top);
        }
        Ok(args.build()?)
    }

    fn into_output(mut response: CreateChatCompletionResponse) -> Result<ChatOutput> {
        if response.choices.is_empty() {
            bail!("chat completion returned no choices");
        }
        let choice = response.choices.swap_remove(0);
        let content = choice
            .message
            .content
            .ok_or_else(|| anyhow!("chat completion returned no content"))?;
        let logprobs = choice
            .logprobs
            .and_then(|logprobs| logprobs.content)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| TokenLogprob {
                token: entry.token,
                logprob: entry.logprob as f32,
            })
            .collect();
        Ok(ChatOutput {
            content,
            logprobs,
            usage: response.usage,
        })
    }

    /// Send one chat completion request and return the reply.
    pub async fn complete(&self, messages: &[Message]) -> Result<ChatOutput> {
        let request = self.build_request(messages, None)?;
        let response = self.client.chat().create(request).await?;
        Self::into_output(response)
    }

    /// Same as [ChatClient::complete] with per-token log-probabilities enabled,
    /// keeping the top `top_logprobs` alternatives server-side. A response
    /// without log-probabilities is an error.
    pub async fn complete_with_logprobs(&self, messages: &[Message], top_logprobs: u8) -> Result<ChatOutput> {
        let request = self.build_request(messages, Some(top_logprobs))?;
        let response = self.client.chat().create(request).await?;
        let output = Self::into_output(response)?;
        if output.logprobs.is_empty() {
            bail!("model {} did not return log probabilities", self.config.model);
        }
        Ok(output)
    }

    /// Send one chat completion request and return the raw delta stream, for
    /// incremental printing.
    pub async fn complete_streaming(&self, messages: &[Message]) -> Result<ChatCompletionResponseStream> {
        let request = self.build_request(messages, None)?;
        Ok(self.client.chat().create_stream(request).await?)
    }
}

#[cfg(test)]
mod test_openai {
    use crate::conversation::Message;
    use async_openai::types::ChatCompletionRequestMessage;
    use super::{ChatClient, ChatConfig};

    #[test]
    fn test_role_mapping() {
        let msg = ChatClient::to_request_message(&Message::system("be brief")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::System(_)));
        let msg = ChatClient::to_request_message(&Message::user("hi")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::User(_)));
        let msg = ChatClient::to_request_message(&Message::assistant("hello")).unwrap();
        assert!(matches!(msg, ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_build_request() {
        let client = ChatClient::with_api_key("sk-test", ChatConfig::new("gpt-3.5-turbo").with_max_tokens(64));
        let request = client
            .build_request(&[Message::user("hi")], Some(3))
            .unwrap();
        assert_eq!("gpt-3.5-turbo", request.model);
        assert_eq!(Some(true), request.logprobs);
        assert_eq!(Some(3), request.top_logprobs);
        assert_eq!(1, request.messages.len());
    }
}
