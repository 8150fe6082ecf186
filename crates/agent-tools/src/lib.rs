//! Sandboxed builtin tools.
//!
//! Every tool is built around a [`WorkingRoot`]: paths coming from the model
//! are resolved and confined to it before any filesystem access or process
//! spawn happens.

pub mod config;
pub mod error;
mod executor;
pub mod sandbox;
pub mod tools;

pub use config::SandboxConfig;
pub use error::ToolFailure;
pub use executor::{BuiltinToolExecutor, BuiltinToolExecutorBuilder};
pub use sandbox::{PathGuardError, WorkingRoot};
pub use tools::{ListDirectoryTool, ReadFileTool, RunScriptTool, WriteFileTool};
