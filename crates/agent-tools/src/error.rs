use std::io;
use std::time::Duration;

use agent_core::tools::ToolResult;
use thiserror::Error;

use crate::sandbox::PathGuardError;

/// Everything a sandboxed tool can fail with.
///
/// None of these abort the agent loop: they are rendered into the tool
/// result and the model decides what to do next. Every message starts with
/// the shared `Error: ` prefix.
#[derive(Debug, Error)]
pub enum ToolFailure {
    #[error("Error: Cannot {action} \"{path}\" as it is outside the permitted working directory")]
    OutOfBounds { action: &'static str, path: String },

    #[error("Error: \"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("Error: File not found or is not a regular file: \"{0}\"")]
    NotAFile(String),

    #[error("Error: \"{0}\" is a directory, not a file")]
    TargetIsDirectory(String),

    #[error("Error: File \"{0}\" not found.")]
    FileNotFound(String),

    #[error("Error: \"{path}\" is not a .{extension} file.")]
    WrongFileType { path: String, extension: String },

    #[error("Error: Execution of \"{path}\" timed out after {} seconds", .timeout.as_secs())]
    Timeout { path: String, timeout: Duration },

    #[error("Error: Process exited with code {code}, STDOUT: {stdout}, STDERR: {stderr}")]
    NonZeroExit {
        code: String,
        stdout: String,
        stderr: String,
    },

    #[error("Error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl ToolFailure {
    /// Maps a path-guard rejection for a tool performing `action`.
    pub fn from_guard(action: &'static str, error: PathGuardError) -> Self {
        match error {
            PathGuardError::OutsideRoot(path) => ToolFailure::OutOfBounds { action, path },
            PathGuardError::Unresolvable { path, source } => ToolFailure::Io {
                context: format!("resolving \"{}\"", path),
                source,
            },
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        ToolFailure::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<ToolFailure> for ToolResult {
    fn from(failure: ToolFailure) -> Self {
        ToolResult::error(failure.to_string())
    }
}
