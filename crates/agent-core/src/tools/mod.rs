pub mod executor;
pub mod registry;
pub mod types;

pub use executor::{deserialize_args, execute_tool_call, parse_tool_args, ToolError, ToolExecutor};
pub use registry::{RegistryError, Tool, ToolRegistry};
pub use types::{FunctionCall, FunctionSchema, ToolCall, ToolResult, ToolSchema, ERROR_PREFIX};
