use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::tools::{ToolCall, ToolResult, ToolSchema};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// Dispatches model-requested tool calls.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;
    fn list_tools(&self) -> Vec<ToolSchema>;
}

/// Parses the raw JSON argument string of a tool call. An empty string is an
/// empty argument object.
pub fn parse_tool_args(arguments: &str) -> Result<serde_json::Value> {
    let trimmed = arguments.trim();
    if trimmed.is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(trimmed)
        .map_err(|e| ToolError::InvalidArguments(format!("Invalid JSON arguments: {}", e)))
}

/// Converts an untyped argument object into a tool's typed request.
pub fn deserialize_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Runs one tool call and always yields a result for the conversation:
/// dispatch errors become error-prefixed results instead of aborting the turn.
pub async fn execute_tool_call(tool_call: &ToolCall, tools: &dyn ToolExecutor) -> ToolResult {
    match tools.execute(tool_call).await {
        Ok(result) => result,
        Err(error) => {
            log::warn!(
                "tool call '{}' ({}) failed: {}",
                tool_call.function.name,
                tool_call.id,
                error
            );
            ToolResult::error(error.to_string())
        }
    }
}
