use std::sync::Arc;

use agent_core::tools::{deserialize_args, Tool, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::fs;

use crate::error::ToolFailure;
use crate::sandbox::WorkingRoot;

#[derive(Debug, Deserialize)]
struct ListDirectoryArgs {
    #[serde(default = "default_directory")]
    directory: String,
}

fn default_directory() -> String {
    ".".to_string()
}

/// Tool for listing directory contents inside the working root
pub struct ListDirectoryTool {
    root: Arc<WorkingRoot>,
}

impl ListDirectoryTool {
    pub fn new(root: Arc<WorkingRoot>) -> Self {
        Self { root }
    }

    /// Lists the immediate entries of `directory`, one line per entry, sorted
    /// by name. An empty directory yields an empty string.
    pub async fn list_directory(&self, directory: &str) -> Result<String, ToolFailure> {
        let path = self
            .root
            .resolve(directory)
            .map_err(|e| ToolFailure::from_guard("list", e))?;

        if !fs::metadata(&path).await.is_ok_and(|meta| meta.is_dir()) {
            return Err(ToolFailure::NotADirectory(directory.to_string()));
        }

        let mut dir = fs::read_dir(&path)
            .await
            .map_err(|e| ToolFailure::io("listing files", e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| ToolFailure::io("listing files", e))?
        {
            // links are followed only while the target stays inside the root;
            // otherwise the link itself is described
            let target = match fs::canonicalize(entry.path()).await {
                Ok(target) if target.starts_with(self.root.path()) => {
                    fs::metadata(&target).await.ok()
                }
                _ => None,
            };
            let metadata = match target {
                Some(metadata) => metadata,
                None => entry
                    .metadata()
                    .await
                    .map_err(|e| ToolFailure::io("listing files", e))?,
            };
            entries.push((
                entry.file_name().to_string_lossy().to_string(),
                metadata.len(),
                metadata.is_dir(),
            ));
        }
        entries.sort_by(|left, right| left.0.cmp(&right.0));

        Ok(entries
            .iter()
            .map(|(name, size, is_dir)| {
                format!("- {}: file_size={} bytes, is_dir={}", name, size, is_dir)
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "Lists files in the specified directory along with their sizes, constrained to the working directory."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "directory": {
                    "type": "string",
                    "description": "The directory to list files from, relative to the working directory. If not provided, lists files in the working directory itself."
                }
            }
        })
    }

    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
        let args: ListDirectoryArgs = deserialize_args(args)?;

        match self.list_directory(&args.directory).await {
            Ok(listing) => Ok(ToolResult::ok(listing)),
            Err(failure) => Ok(failure.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ListDirectoryTool) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("main.py"), "print('hi')\n").unwrap();
        std::fs::write(dir.path().join("empty.txt"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(dir.path().join("pkg/calc.py"), "x = 1").unwrap();
        let root = Arc::new(WorkingRoot::new(dir.path()).unwrap());
        (dir, ListDirectoryTool::new(root))
    }

    #[tokio::test]
    async fn test_list_directory_defaults_to_root() {
        let (_dir, tool) = setup();
        let result = tool.execute(json!({})).await.unwrap();

        assert!(result.success);
        let lines: HashSet<&str> = result.result.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.contains("- main.py: file_size=12 bytes, is_dir=false"));
        assert!(lines.contains("- empty.txt: file_size=0 bytes, is_dir=false"));
        assert!(lines.iter().any(|l| l.starts_with("- pkg: ") && l.ends_with("is_dir=true")));
    }

    #[tokio::test]
    async fn test_list_directory_subdirectory() {
        let (_dir, tool) = setup();
        let result = tool.execute(json!({"directory": "pkg"})).await.unwrap();

        assert_eq!(result.result, "- calc.py: file_size=5 bytes, is_dir=false");
    }

    #[tokio::test]
    async fn test_list_directory_empty_directory() {
        let (dir, tool) = setup();
        std::fs::create_dir(dir.path().join("void")).unwrap();

        let result = tool.execute(json!({"directory": "void"})).await.unwrap();

        assert!(result.success);
        assert_eq!(result.result, "");
    }

    #[tokio::test]
    async fn test_list_directory_is_deterministic() {
        let (_dir, tool) = setup();
        let first = tool.list_directory(".").await.unwrap();
        let second = tool.list_directory(".").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_list_directory_outside_root() {
        let (_dir, tool) = setup();
        for directory in ["/bin", "../", "../../secret"] {
            let result = tool.execute(json!({ "directory": directory })).await.unwrap();
            assert!(!result.success);
            assert_eq!(
                result.result,
                format!(
                    "Error: Cannot list \"{}\" as it is outside the permitted working directory",
                    directory
                )
            );
        }
    }

    #[tokio::test]
    async fn test_list_directory_on_file() {
        let (_dir, tool) = setup();
        let result = tool.execute(json!({"directory": "main.py"})).await.unwrap();

        assert_eq!(result.result, "Error: \"main.py\" is not a directory");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_directory_does_not_describe_outside_link_targets() {
        let outside = TempDir::new().unwrap();
        std::fs::write(outside.path().join("big.bin"), vec![0u8; 4096]).unwrap();
        let (dir, tool) = setup();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("out_dir")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("big.bin"), dir.path().join("out_file"))
            .unwrap();
        std::os::unix::fs::symlink(dir.path().join("pkg"), dir.path().join("in_dir")).unwrap();

        let listing = tool.list_directory(".").await.unwrap();
        let line = |name: &str| {
            listing
                .lines()
                .find(|l| l.starts_with(&format!("- {}: ", name)))
                .unwrap()
                .to_string()
        };

        assert!(line("out_dir").ends_with("is_dir=false"), "{listing}");
        assert!(!line("out_file").contains("file_size=4096 "), "{listing}");
        assert!(line("in_dir").ends_with("is_dir=true"), "{listing}");
    }

    #[tokio::test]
    async fn test_list_directory_rejects_wrong_argument_type() {
        let (_dir, tool) = setup();
        let result = tool.execute(json!({"directory": 42})).await;

        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }
}
