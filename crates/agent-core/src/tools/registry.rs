use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use thiserror::Error;

use crate::tools::{FunctionSchema, ToolError, ToolResult, ToolSchema};

/// One callable the model can request by name.
///
/// Arguments arrive as the JSON object the model produced. Anything else a
/// tool needs, such as the sandbox root, is captured when it is constructed.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON Schema of the argument object
    fn parameters_schema(&self) -> serde_json::Value;
    async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError>;

    fn to_schema(&self) -> ToolSchema {
        ToolSchema {
            schema_type: "function".to_string(),
            function: FunctionSchema {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),

    #[error("tool name cannot be empty")]
    EmptyName,
}

struct Registered {
    tool: Arc<dyn Tool>,
    schema: ToolSchema,
}

/// Name-to-tool table; the schema advertised for a tool is fixed when it is
/// registered.
#[derive(Default)]
pub struct ToolRegistry {
    tools: DashMap<String, Registered>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<T>(&self, tool: T) -> Result<(), RegistryError>
    where
        T: Tool + 'static,
    {
        let schema = tool.to_schema();
        let name = schema.function.name.clone();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }

        match self.tools.entry(name) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateName(entry.key().clone())),
            Entry::Vacant(entry) => {
                log::debug!("registered tool {}", entry.key());
                entry.insert(Registered {
                    tool: Arc::new(tool),
                    schema,
                });
                Ok(())
            }
        }
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).map(|entry| Arc::clone(&entry.tool))
    }

    /// The tool manifest, sorted by name so requests are stable.
    pub fn list_tools(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self
            .tools
            .iter()
            .map(|entry| entry.schema.clone())
            .collect();
        schemas.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        schemas
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "echoes its arguments"
        }

        fn parameters_schema(&self) -> serde_json::Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: serde_json::Value) -> Result<ToolResult, ToolError> {
            Ok(ToolResult::ok(args["text"].as_str().unwrap_or_default()))
        }
    }

    #[tokio::test]
    async fn registered_tool_is_found_and_runs() {
        let registry = ToolRegistry::new();
        registry.register(Echo("echo")).unwrap();

        let tool = registry.get("echo").unwrap();
        let result = tool.execute(json!({ "text": "hi" })).await.unwrap();

        assert_eq!(result, ToolResult::ok("hi"));
        assert!(registry.get("Echo").is_none());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn second_tool_with_same_name_is_refused() {
        let registry = ToolRegistry::new();
        registry.register(Echo("dup")).unwrap();

        assert_eq!(
            registry.register(Echo("dup")),
            Err(RegistryError::DuplicateName("dup".to_string()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn blank_names_are_refused() {
        let registry = ToolRegistry::new();

        assert_eq!(registry.register(Echo("  ")), Err(RegistryError::EmptyName));
        assert!(registry.is_empty());
    }

    #[test]
    fn manifest_is_sorted_and_carries_parameters() {
        let registry = ToolRegistry::new();
        registry.register(Echo("write")).unwrap();
        registry.register(Echo("list")).unwrap();
        registry.register(Echo("read")).unwrap();

        let manifest = registry.list_tools();
        let names: Vec<&str> = manifest.iter().map(|s| s.function.name.as_str()).collect();

        assert_eq!(names, ["list", "read", "write"]);
        assert_eq!(manifest[0].schema_type, "function");
        assert_eq!(manifest[0].function.parameters["required"], json!(["text"]));
    }
}
