//! # promptkit
//!
//! Prompt-engineering toolkit for LLM applications in Rust
//!
//! ## Why `promptkit`
//!
//! Because most "LLM frameworks" bury three string concatenations under five layers of
//! abstraction. Prompt engineering is string engineering with a budget attached, so the
//! APIs here stay flat and explicit: you can always see the exact string that leaves for
//! the endpoint, and the exact record that came back.
//!
//! ## Concepts and Design
//!
//! The crate is data-driven. Cycle speed is NOT a top priority since the model takes
//! trillions of cycles to answer anyway; what matters is that every step that composes a
//! prompt is trackable.
//!
//! ### Prompt Template and Placeholder
//!
//! A template is a string with named slots, like
//!
//! ```text
//! You are a friendly and helpful assistant. Today is {{date}}.
//! ```
//!
//! `{{date}}` is a placeholder with the name `"date"`. Names can be any string without a
//! line break. [`PromptTemplate::construct_prompt`](crate::prompt::PromptTemplate::construct_prompt)
//! gives a [`PartialPrompt`](crate::prompt::PartialPrompt), which records what is filled
//! and what is not; once every slot is filled,
//! [`PartialPrompt::complete`](crate::prompt::PartialPrompt::complete) produces the final
//! string. Fillers ([`crate::filler`]) are anything that fills slots, and they compose
//! across stages.
//!
//! ### Conversation
//!
//! A [`Conversation`](crate::conversation::Conversation) is an ordered list of role-tagged
//! messages under a token budget. Appending past the budget evicts the oldest messages,
//! except a leading system message, which is reserved. Counting is pluggable: the
//! character-count proxy is free, [`Tiktoken`](crate::utils::token::tiktoken::Tiktoken) is
//! exact.
//!
//! ### Running Summary
//!
//! A [`Summarizer`](crate::summary::Summarizer) asks the model to rewrite a small
//! schema-validated record (name, unresolved questions, running summary) from the current
//! transcript. The record is overwritten wholesale on every update; a reply that fails
//! schema validation fails the update and leaves the previous record in place.
//!
//! ### Techniques
//!
//! [`techniques`](crate::techniques) holds the two staples: chain-of-thought (append the
//! step-by-step instruction) and few-shot prompting (instruction plus worked input/output
//! pairs, rendered as chat messages or as one flat prompt).
//!
//! ### Evaluation
//!
//! [`eval`](crate::eval) scores generated answers: mean log-probability and perplexity
//! from the logprobs the endpoint returns, semantic similarity as the cosine of two
//! embeddings, and faithfulness as the fraction of an answer's extracted statements a
//! judge model finds supported by the retrieval context.
//!
//! ### Endpoint
//!
//! The endpoint of every pipeline here is the chat API, wrapped thinly in
//! [`ChatClient`](crate::utils::llm::openai::ChatClient). Replies fail the way the API
//! fails; there is no retry layer hiding that from you.
//!
//! ## Attribution
//! * `async_openai`: all endpoint plumbing goes through this crate.
//! * `tiktoken-rs`: re-exported in [crate::utils::token::tiktoken].

pub mod prompt;
pub mod filler;
pub mod conversation;
pub mod summary;
pub mod techniques;
pub mod eval;
pub mod utils;
