//! Response parser - reads one model reply as a tool call, a final answer, or neither
//!
//! Models driven purely by prompt instructions are unreliable about output
//! shape, so parsing is lenient: code fences and surrounding prose are
//! stripped, unknown fields are ignored, and nothing here ever fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tools::ToolInput;

/// Dedicated final-answer object key: `{"finalResponse": "..."}`
const FINAL_ANSWER_KEY: &str = "finalResponse";

/// A tool invocation requested by the model.
///
/// Serializes to the same wire shape it is parsed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    #[serde(rename = "tool")]
    pub tool_name: String,
    #[serde(rename = "tool_input", default)]
    pub input: ToolInput,
    #[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
    pub raw_direct_response: Option<String>,
}

impl ToolCallRequest {
    pub fn new(tool_name: impl Into<String>, input: ToolInput) -> Self {
        Self {
            tool_name: tool_name.into(),
            input,
            raw_direct_response: None,
        }
    }

    /// Answer text carried by a sentinel call.
    ///
    /// Models put it either at the top level or inside `tool_input`.
    pub fn final_text(&self) -> String {
        self.raw_direct_response
            .clone()
            .or_else(|| {
                self.input
                    .get("response")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_default()
    }
}

/// What a single model reply amounts to
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    ToolCall(ToolCallRequest),
    FinalAnswer(String),
    Unparseable,
}

/// Interpret raw model output
pub fn parse_response(content: &str) -> ParsedResponse {
    match extract_object(content) {
        Some(object) => parse_object(object),
        None => ParsedResponse::Unparseable,
    }
}

fn parse_object(mut object: Map<String, Value>) -> ParsedResponse {
    if let Some(Value::String(answer)) = object.get(FINAL_ANSWER_KEY) {
        return ParsedResponse::FinalAnswer(answer.clone());
    }

    let tool_name = match object.get("tool") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        _ => return ParsedResponse::Unparseable,
    };

    let input = match object.remove("tool_input") {
        Some(Value::Object(map)) => map,
        None | Some(Value::Null) => ToolInput::new(),
        Some(_) => return ParsedResponse::Unparseable,
    };

    let raw_direct_response = match object.remove("response") {
        Some(Value::String(text)) => Some(text),
        _ => None,
    };

    ParsedResponse::ToolCall(ToolCallRequest {
        tool_name,
        input,
        raw_direct_response,
    })
}

/// Find a JSON object in the reply: bare, fenced, or embedded in prose
fn extract_object(content: &str) -> Option<Map<String, Value>> {
    let trimmed = content.trim();

    if let Some(object) = decode_object(trimmed) {
        return Some(object);
    }

    if let Some(rest) = trimmed.strip_prefix("```") {
        // skip the language tag on the opening fence
        let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
        if let Some(end) = body.rfind("```")
            && let Some(object) = decode_object(body[..end].trim())
        {
            return Some(object);
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
    {
        return decode_object(&trimmed[start..=end]);
    }

    None
}

fn decode_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
