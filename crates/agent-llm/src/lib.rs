//! Client side of the model service.
//!
//! The agent loop only depends on [`LLMProvider`]; [`OpenAIProvider`] speaks
//! the OpenAI chat-completions format, which Gemini also serves.

pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{LLMError, LLMProvider, Result};
pub use providers::OpenAIProvider;
pub use types::LLMReply;
