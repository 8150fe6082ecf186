use agent_core::{TokenUsage, ToolCall};

/// One reply from the model service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LLMReply {
    /// Natural-language text, if the model produced any
    pub text: Option<String>,
    /// Tool invocations the model requested, in the order it listed them
    pub tool_calls: Vec<ToolCall>,
    /// Token counters, when the service reports them
    pub usage: Option<TokenUsage>,
}

impl LLMReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The text, if it is present and not blank
    pub fn final_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.trim().is_empty())
    }
}
