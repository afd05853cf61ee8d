//! Tool registry - name to tool mapping with a stable listing order

use std::collections::HashMap;

use log::debug;

use super::{FINAL_RESPONSE_TOOL, FinalResponseTool, Tool, ToolDefinition, ToolError, ToolInput};
use crate::error::{FuncloopError, Result};

/// Capability table consulted by the dispatcher.
///
/// The `finalResponse` sentinel is registered on construction and can never be
/// replaced. Tools are listed in registration order, sentinel last, which is
/// the order they are presented to the model.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a registry holding only the sentinel
    pub fn new() -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            index: HashMap::new(),
        };
        registry.insert(Box::new(FinalResponseTool));
        registry
    }

    fn insert(&mut self, tool: Box<dyn Tool>) {
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
    }

    /// Add a tool; names must be non-empty and unique
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if name.trim().is_empty() {
            return Err(FuncloopError::Config("tool name must not be empty".to_string()));
        }
        if self.index.contains_key(&name) {
            return Err(FuncloopError::Config(format!("tool '{}' is already registered", name)));
        }

        debug!("Registering tool: {}", name);

        // keep the sentinel at the end of the listing
        let sentinel = self.tools.pop();
        self.insert(tool);
        if let Some(sentinel) = sentinel {
            self.insert(sentinel);
        }
        Ok(())
    }

    /// Builder-style variant of `register`
    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Result<Self> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> std::result::Result<ToolDefinition, ToolError> {
        self.get(name)
            .map(|t| t.definition())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Definitions in presentation order
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn is_sentinel(name: &str) -> bool {
        name == FINAL_RESPONSE_TOOL
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validate `input` against the tool's schema and run it.
    ///
    /// No retries happen here; a failing handler is reported as is.
    pub async fn invoke(&self, name: &str, input: &ToolInput) -> std::result::Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        tool.definition().validate_input(input)?;
        tool.invoke(input).await
    }

    fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
