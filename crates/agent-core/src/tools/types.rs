use serde::{Deserialize, Serialize};

/// Prefix every failed tool result starts with.
pub const ERROR_PREFIX: &str = "Error: ";

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "default_tool_type")]
    pub tool_type: String,
    pub function: FunctionCall,
}

fn default_tool_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            tool_type: default_tool_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.to_string(),
            },
        }
    }
}

/// Schema advertised to the model service for one tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub function: FunctionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// What a tool hands back to the conversation.
///
/// `result` is the text the model sees. Failures are plain text too, starting
/// with [`ERROR_PREFIX`]; `success` mirrors that classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResult {
    pub success: bool,
    pub result: String,
}

impl ToolResult {
    pub fn ok(result: impl Into<String>) -> Self {
        Self {
            success: true,
            result: result.into(),
        }
    }

    pub fn error(message: impl AsRef<str>) -> Self {
        let message = message.as_ref();
        let result = if message.starts_with(ERROR_PREFIX) {
            message.to_string()
        } else {
            format!("{ERROR_PREFIX}{message}")
        };
        Self {
            success: false,
            result,
        }
    }

    pub fn is_error(&self) -> bool {
        self.result.starts_with(ERROR_PREFIX)
    }
}
