use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use agent_core::tools::{deserialize_args, Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tempfile::NamedTempFile;
use tokio::fs;

use crate::error::ToolFailure;
use crate::sandbox::WorkingRoot;

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    file_path: String,
    content: String,
}

/// Tool for writing file contents inside the working root
pub struct WriteFileTool {
    root: Arc<WorkingRoot>,
}

impl WriteFileTool {
    pub fn new(root: Arc<WorkingRoot>) -> Self {
        Self { root }
    }

    /// Replaces `file_path` with `content`, creating missing parent
    /// directories. Returns the number of characters written.
    pub async fn write_file(&self, file_path: &str, content: &str) -> Result<usize, ToolFailure> {
        let path = self
            .root
            .resolve(file_path)
            .map_err(|e| ToolFailure::from_guard("write to", e))?;

        if fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
            return Err(ToolFailure::TargetIsDirectory(file_path.to_string()));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ToolFailure::io("creating directory", e))?;
        }

        let content_owned = content.to_string();
        tokio::task::spawn_blocking(move || replace_file(&path, &content_owned))
            .await
            .map_err(|e| {
                ToolFailure::io("writing to file", io::Error::new(io::ErrorKind::Other, e))
            })?
            .map_err(|e| ToolFailure::io("writing to file", e))?;

        Ok(content.chars().count())
    }
}

/// Replaces an existing file through a temp file in the same directory, so
/// readers see either the old content or the new one and the file keeps its
/// permissions. New files are written in place and get the usual umask mode.
fn replace_file(path: &Path, content: &str) -> io::Result<()> {
    let existing = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) => return std::fs::write(path, content),
    };

    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    // temp files start out as 0600
    temp.as_file().set_permissions(existing.permissions())?;

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Writes content to a file within the working directory. Creates the file and any missing parent directories; overwrites an existing file."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path to the file to write, relative to the working directory."
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file."
                }
            },
            "required": ["file_path", "content"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: WriteFileArgs = deserialize_args(args)?;

        match self.write_file(&args.file_path, &args.content).await {
            Ok(written) => Ok(ToolResult::ok(format!(
                "Successfully wrote to \"{}\" ({} characters written)",
                args.file_path, written
            ))),
            Err(failure) => Ok(failure.into()),
        }
    }
}
