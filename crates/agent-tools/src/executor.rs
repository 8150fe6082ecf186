use std::sync::Arc;
use std::time::Duration;

use agent_core::tools::{
    parse_tool_args, Tool, ToolCall, ToolError, ToolExecutor, ToolRegistry, ToolResult,
    ToolSchema,
};
use async_trait::async_trait;

use crate::config::SandboxConfig;
use crate::sandbox::WorkingRoot;
use crate::tools::{ListDirectoryTool, ReadFileTool, RunScriptTool, WriteFileTool};

/// Built-in tool executor that dispatches by name through a [`ToolRegistry`].
///
/// The working root is handed to each tool at registration time; the model
/// never supplies it.
pub struct BuiltinToolExecutor {
    registry: ToolRegistry,
}

impl BuiltinToolExecutor {
    /// Creates an executor with all built-in tools using default limits
    pub fn new(root: WorkingRoot) -> Self {
        BuiltinToolExecutorBuilder::new(root).build()
    }

    pub fn builder(root: WorkingRoot) -> BuiltinToolExecutorBuilder {
        BuiltinToolExecutorBuilder::new(root)
    }
}

#[async_trait]
impl ToolExecutor for BuiltinToolExecutor {
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let tool_name = call.function.name.trim();

        let tool = self
            .registry
            .get(tool_name)
            .ok_or_else(|| ToolError::NotFound(tool_name.to_string()))?;

        let args = parse_tool_args(&call.function.arguments)?;
        if !args.is_object() {
            return Err(ToolError::InvalidArguments(format!(
                "arguments for '{}' must be a JSON object",
                tool_name
            )));
        }

        tool.execute(args).await
    }

    fn list_tools(&self) -> Vec<ToolSchema> {
        self.registry.list_tools()
    }
}

/// Builder for a [`BuiltinToolExecutor`] with custom limits
pub struct BuiltinToolExecutorBuilder {
    root: Arc<WorkingRoot>,
    config: SandboxConfig,
}

impl BuiltinToolExecutorBuilder {
    pub fn new(root: WorkingRoot) -> Self {
        Self {
            root: Arc::new(root),
            config: SandboxConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SandboxConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.config.max_chars = max_chars;
        self
    }

    pub fn interpreter(mut self, interpreter: impl Into<String>, extension: impl Into<String>) -> Self {
        self.config.interpreter = interpreter.into();
        self.config.script_extension = extension.into();
        self
    }

    pub fn script_timeout(mut self, timeout: Duration) -> Self {
        self.config.script_timeout = timeout;
        self
    }

    pub fn build(self) -> BuiltinToolExecutor {
        let registry = ToolRegistry::new();
        let root = self.root;
        let config = self.config;

        // names are fixed and distinct, registration cannot collide
        let _ = registry.register(ListDirectoryTool::new(Arc::clone(&root)));
        let _ = registry
            .register(ReadFileTool::new(Arc::clone(&root)).with_max_chars(config.max_chars));
        let _ = registry.register(
            RunScriptTool::new(Arc::clone(&root))
                .with_interpreter(config.interpreter, config.script_extension)
                .with_timeout(config.script_timeout),
        );
        let _ = registry.register(WriteFileTool::new(Arc::clone(&root)));

        log::debug!(
            "registered {} builtin tools rooted at {}",
            registry.len(),
            root.path().display()
        );

        BuiltinToolExecutor { registry }
    }
}
