//! Tool system for prompt-engineered function calling
//!
//! Tools are plain capabilities: a name, a description, a JSON schema for the
//! input, and an async `invoke`. The registry maps names to tools, so adding a
//! tool never touches the agent loop.

mod final_response;
mod registry;
mod weather;

pub use final_response::{FINAL_RESPONSE_TOOL, FinalResponseTool};
pub use registry::ToolRegistry;
pub use weather::{WeatherBackend, WeatherTool};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arguments passed to a tool, as decoded from the model's `tool_input`
pub type ToolInput = Map<String, Value>;

/// A tool that can be called by the model
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the `tool` field the model emits)
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Run the tool, returning the text handed back to the model
    async fn invoke(&self, input: &ToolInput) -> Result<String, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }
}

/// Errors produced while resolving or running a tool.
///
/// None of these end a conversation; the loop reports them to the model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Tool failed: {0}")]
    Failed(String),
}

/// Tool definition as advertised to the model in the system prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "parameters")]
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Check that every field listed under `required` is present
    pub fn validate_input(&self, input: &ToolInput) -> Result<(), ToolError> {
        if let Some(required) = self.input_schema.get("required").and_then(|r| r.as_array()) {
            for field in required.iter().filter_map(Value::as_str) {
                if !input.contains_key(field) {
                    return Err(ToolError::InvalidInput(format!(
                        "tool '{}' missing required field: {}",
                        self.name, field
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Fetch a string field from tool input
pub fn required_str<'a>(input: &'a ToolInput, field: &str) -> Result<&'a str, ToolError> {
    match input.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ToolError::InvalidInput(format!(
            "field '{}' must be a string, got {}",
            field, other
        ))),
        None => Err(ToolError::InvalidInput(format!("missing field '{}'", field))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> ToolInput {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_definition_serializes_schema_as_parameters() {
        let def = ToolDefinition::new("echoTool", "Echo", json!({"type": "object"}));
        let value = serde_json::to_value(&def).unwrap();
        assert_eq!(value["name"], "echoTool");
        assert_eq!(value["description"], "Echo");
        assert_eq!(value["parameters"]["type"], "object");
        assert!(value.get("input_schema").is_none());
    }

    #[test]
    fn test_validate_input_ok() {
        let def = ToolDefinition::new(
            "getCurrentWeather",
            "Weather",
            json!({"type": "object", "required": ["location", "unit"]}),
        );
        assert!(
            def.validate_input(&input(json!({"location": "Paris", "unit": "celsius"})))
                .is_ok()
        );
    }

    #[test]
    fn test_validate_input_missing_required() {
        let def = ToolDefinition::new(
            "getCurrentWeather",
            "Weather",
            json!({"type": "object", "required": ["location", "unit"]}),
        );
        let err = def
            .validate_input(&input(json!({"location": "Paris"})))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidInput("tool 'getCurrentWeather' missing required field: unit".to_string())
        );
    }

    #[test]
    fn test_validate_input_no_required_list() {
        let def = ToolDefinition::new("noop", "Nothing", json!({"type": "object", "properties": {}}));
        assert!(def.validate_input(&ToolInput::new()).is_ok());
    }

    #[test]
    fn test_required_str() {
        let args = input(json!({"location": "Oslo", "days": 3}));
        assert_eq!(required_str(&args, "location").unwrap(), "Oslo");
        assert!(matches!(required_str(&args, "days"), Err(ToolError::InvalidInput(_))));
        assert!(matches!(required_str(&args, "unit"), Err(ToolError::InvalidInput(_))));
    }

    #[test]
    fn test_tool_error_display() {
        assert_eq!(ToolError::UnknownTool("x".to_string()).to_string(), "Unknown tool: x");
        assert_eq!(ToolError::Failed("timeout".to_string()).to_string(), "Tool failed: timeout");
    }
}
