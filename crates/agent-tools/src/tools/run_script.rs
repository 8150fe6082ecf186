use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use agent_core::tools::{deserialize_args, Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::fs;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::{DEFAULT_INTERPRETER, DEFAULT_SCRIPT_EXTENSION, SCRIPT_TIMEOUT};
use crate::error::ToolFailure;
use crate::sandbox::WorkingRoot;

pub const NO_OUTPUT: &str = "No output produced";

#[derive(Debug, Deserialize)]
struct RunScriptArgs {
    file_path: String,
    #[serde(default)]
    args: Vec<String>,
}

/// Captured result of a script run
#[derive(Debug)]
pub struct ScriptOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ScriptOutput {
    fn format(&self) -> String {
        if self.stdout.is_empty() && self.stderr.is_empty() {
            return NO_OUTPUT.to_string();
        }

        let mut sections = Vec::new();
        if !self.stdout.is_empty() {
            sections.push(format!("STDOUT:\n{}", self.stdout));
        }
        if !self.stderr.is_empty() {
            sections.push(format!("STDERR:\n{}", self.stderr));
        }
        sections.join("\n")
    }
}

/// Tool for running interpreter scripts that live inside the working root.
///
/// The child runs with the working root as its current directory, no stdin,
/// and is killed once the timeout elapses.
pub struct RunScriptTool {
    root: Arc<WorkingRoot>,
    interpreter: String,
    extension: String,
    timeout: Duration,
}

impl RunScriptTool {
    pub fn new(root: Arc<WorkingRoot>) -> Self {
        Self {
            root,
            interpreter: DEFAULT_INTERPRETER.to_string(),
            extension: DEFAULT_SCRIPT_EXTENSION.to_string(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    /// Runs scripts ending in `.{extension}` with `interpreter`.
    pub fn with_interpreter(
        mut self,
        interpreter: impl Into<String>,
        extension: impl Into<String>,
    ) -> Self {
        self.interpreter = interpreter.into();
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn run_script(
        &self,
        file_path: &str,
        args: &[String],
    ) -> Result<ScriptOutput, ToolFailure> {
        let path = self
            .root
            .resolve(file_path)
            .map_err(|e| ToolFailure::from_guard("execute", e))?;

        if !fs::metadata(&path).await.is_ok_and(|meta| meta.is_file()) {
            return Err(ToolFailure::FileNotFound(file_path.to_string()));
        }

        if !has_extension(&path, &self.extension) {
            return Err(ToolFailure::WrongFileType {
                path: file_path.to_string(),
                extension: self.extension.clone(),
            });
        }

        let mut command = Command::new(&self.interpreter);
        command
            .arg(&path)
            .args(args)
            .current_dir(self.root.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        log::debug!(
            "running {} {} {:?} in {}",
            self.interpreter,
            path.display(),
            args,
            self.root.path().display()
        );

        // Dropping the pending `output()` future on timeout drops the child,
        // which kills it.
        let output = timeout(self.timeout, command.output())
            .await
            .map_err(|_| ToolFailure::Timeout {
                path: file_path.to_string(),
                timeout: self.timeout,
            })?
            .map_err(|e| ToolFailure::io("executing script", e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "none (terminated by signal)".to_string());
            return Err(ToolFailure::NonZeroExit {
                code,
                stdout,
                stderr,
            });
        }

        Ok(ScriptOutput { stdout, stderr })
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy() == extension)
}

#[async_trait]
impl Tool for RunScriptTool {
    fn name(&self) -> &str {
        "run_script"
    }

    fn description(&self) -> &str {
        "Executes a script file within the working directory with optional command-line arguments and returns its output. Scripts are killed after a timeout."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": format!(
                        "Path to the .{} file to execute, relative to the working directory.",
                        self.extension
                    )
                },
                "args": {
                    "type": "array",
                    "items": {
                        "type": "string"
                    },
                    "description": "Optional command-line arguments passed to the script."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: RunScriptArgs = deserialize_args(args)?;

        match self.run_script(&args.file_path, &args.args).await {
            Ok(output) => Ok(ToolResult::ok(output.format())),
            Err(failure) => Ok(failure.into()),
        }
    }
}
