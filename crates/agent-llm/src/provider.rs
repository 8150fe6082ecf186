use crate::types::LLMReply;
use agent_core::{tools::ToolSchema, Message};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, LLMError>;

#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send the conversation so far and get the model's next turn.
    ///
    /// # Arguments
    /// * `messages` - Conversation history, oldest first
    /// * `tools` - Tool manifest the model may call
    /// * `system_instruction` - Priming text, sent with every request but never stored in history
    async fn send(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        system_instruction: Option<&str>,
    ) -> Result<LLMReply>;

    /// Model identifier used for requests
    fn model(&self) -> &str;
}
