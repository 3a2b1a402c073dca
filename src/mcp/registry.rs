//! Tool capability contract and registry
//!
//! A registry is built once at startup, validated eagerly, and shared
//! read-only across every request.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{RegistryError, ToolError};
use crate::mcp::types::{ToolDescriptor, ToolResult};
use crate::tools::{CreateFolderTool, CwdTool, ListFolderTool, WeatherTool, WriteFileTool};

/// A named unit of work with a declared input schema
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Descriptor advertised through `tools/list`
    fn descriptor(&self) -> ToolDescriptor;

    /// Execute the tool with the caller's `arguments` object
    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError>;
}

/// Ordered, immutable collection of tools
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    descriptors: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Build a registry, rejecting empty or duplicate tool names
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Result<Self, RegistryError> {
        let mut descriptors = Vec::with_capacity(tools.len());
        let mut index = HashMap::with_capacity(tools.len());

        for (position, tool) in tools.iter().enumerate() {
            let descriptor = tool.descriptor();
            if descriptor.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if index.insert(descriptor.name.clone(), position).is_some() {
                return Err(RegistryError::DuplicateTool {
                    name: descriptor.name,
                });
            }
            descriptors.push(descriptor);
        }

        Ok(Self {
            tools,
            descriptors,
            index,
        })
    }

    /// The standard tool set, rooted at `workdir`
    pub fn builtin(workdir: &Path) -> Result<Self, RegistryError> {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WeatherTool::new()),
            Arc::new(CwdTool::new(workdir.to_path_buf())),
            Arc::new(CreateFolderTool::new(workdir.to_path_buf())),
            Arc::new(WriteFileTool::new(workdir.to_path_buf())),
            Arc::new(ListFolderTool::new(workdir.to_path_buf())),
        ];
        Self::new(tools)
    }

    /// Descriptors in registration order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Exact, case-sensitive lookup by name
    pub fn find(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

pub fn json_schema_string(description: &str) -> Value {
    json!({
        "type": "string",
        "description": description,
    })
}

pub fn json_schema_number(description: &str) -> Value {
    json!({
        "type": "number",
        "description": description,
    })
}
