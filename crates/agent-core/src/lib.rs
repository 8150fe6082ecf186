pub mod agent;
pub mod tools;

pub use agent::events::{AgentEvent, TokenUsage};
pub use agent::types::{Message, Role, Session, ToolResponse};
pub use agent::AgentError;
pub use tools::{
    execute_tool_call, parse_tool_args, FunctionCall, FunctionSchema, Tool, ToolCall, ToolError,
    ToolExecutor, ToolRegistry, ToolResult, ToolSchema,
};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
