use std::sync::Arc;

use agent_core::tools::{deserialize_args, Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::fs;
use tokio::io::AsyncReadExt;

use crate::config::MAX_CHARS;
use crate::error::ToolFailure;
use crate::sandbox::WorkingRoot;

#[derive(Debug, Deserialize)]
struct ReadFileArgs {
    file_path: String,
}

/// Tool for reading file contents inside the working root
pub struct ReadFileTool {
    root: Arc<WorkingRoot>,
    max_chars: usize,
}

impl ReadFileTool {
    pub fn new(root: Arc<WorkingRoot>) -> Self {
        Self {
            root,
            max_chars: MAX_CHARS,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Reads `file_path` as text, replacing invalid UTF-8, and truncates after
    /// `max_chars` characters with a marker naming the file and the limit.
    pub async fn read_file(&self, file_path: &str) -> Result<String, ToolFailure> {
        let path = self
            .root
            .resolve(file_path)
            .map_err(|e| ToolFailure::from_guard("read", e))?;

        if !fs::metadata(&path).await.is_ok_and(|meta| meta.is_file()) {
            return Err(ToolFailure::NotAFile(file_path.to_string()));
        }

        let context = || format!("reading file \"{}\"", file_path);
        let file = fs::File::open(&path)
            .await
            .map_err(|e| ToolFailure::io(context(), e))?;

        // Lossy decoding never yields more chars than bytes, and a UTF-8 char
        // is at most 4 bytes, so this many bytes always decode to more than
        // `max_chars` characters when the file is longer.
        let byte_budget = (self.max_chars as u64).saturating_add(1).saturating_mul(4);
        let mut bytes = Vec::new();
        file.take(byte_budget)
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| ToolFailure::io(context(), e))?;

        let content = String::from_utf8_lossy(&bytes);
        match content.char_indices().nth(self.max_chars) {
            Some((cut, _)) => Ok(format!(
                "{}[...File \"{}\" truncated at {} characters]",
                &content[..cut],
                file_path,
                self.max_chars
            )),
            None => Ok(content.into_owned()),
        }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Reads and returns the content of a specified file, constrained to the working directory. Files are truncated if they exceed the maximum character limit."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "The path to the file to read, relative to the working directory."
                }
            },
            "required": ["file_path"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: ReadFileArgs = deserialize_args(args)?;

        match self.read_file(&args.file_path).await {
            Ok(content) => Ok(ToolResult::ok(content)),
            Err(failure) => Ok(failure.into()),
        }
    }
}
