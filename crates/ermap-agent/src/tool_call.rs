//! Tool-call detection in model replies and tool descriptions for prompts.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::mcp::McpTool;

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid json fence regex")
});

/// A reply of the form `{"tool": "...", "arguments": {...}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    pub arguments: Value,
}

impl ToolCall {
    /// Reads a tool call from a model reply.
    ///
    /// A ```` ```json ```` fence around the object is tolerated. Anything that
    /// is not a JSON object with both `tool` and `arguments` is a plain answer
    /// and yields `None`.
    #[must_use]
    pub fn parse(reply: &str) -> Option<Self> {
        let body = JSON_FENCE
            .captures(reply)
            .and_then(|caps| caps.get(1))
            .map_or(reply, |m| m.as_str())
            .trim();

        let Value::Object(mut object) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };
        let arguments = object.remove("arguments")?;
        let tool = object.remove("tool")?.as_str()?.to_owned();
        Some(Self { tool, arguments })
    }
}

/// Describes `tool` for the system prompt: name, description, and one line
/// per argument with `(required)` where the schema says so.
#[must_use]
pub fn format_tool_for_llm(tool: &McpTool) -> String {
    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut out = format!(
        "Tool: {}\nDescription: {}\nArguments:",
        tool.name, tool.description
    );
    if let Some(properties) = tool.input_schema.get("properties").and_then(Value::as_object) {
        for (name, info) in properties {
            let description = info
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("No description");
            let _ = write!(out, "\n- {name}: {description}");
            if required.contains(&name.as_str()) {
                out.push_str(" (required)");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_bare_tool_call() {
        let call =
            ToolCall::parse(r#"{"tool": "maps_geo", "arguments": {"address": "文化宫"}}"#).unwrap();
        assert_eq!(call.tool, "maps_geo");
        assert_eq!(call.arguments, json!({"address": "文化宫"}));
    }

    #[test]
    fn strips_json_fence() {
        let reply = "```json\n{\"tool\": \"maps_geo\", \"arguments\": {}}\n```";
        assert_eq!(ToolCall::parse(reply).unwrap().tool, "maps_geo");
    }

    #[test]
    fn plain_text_is_not_a_call() {
        assert!(ToolCall::parse("驾车距离约12公里，需要25分钟").is_none());
    }

    #[test]
    fn json_without_arguments_is_not_a_call() {
        assert!(ToolCall::parse(r#"{"tool": "maps_geo"}"#).is_none());
        assert!(ToolCall::parse(r#"{"distance": 12}"#).is_none());
        assert!(ToolCall::parse(r#"["maps_geo"]"#).is_none());
    }

    #[test]
    fn formats_tool_with_required_marker() {
        let tool = McpTool {
            name: "maps_direction_driving".to_string(),
            description: "驾车路径规划".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "origin": {"description": "出发点经纬度"},
                    "waypoints": {}
                },
                "required": ["origin"]
            }),
        };
        let text = format_tool_for_llm(&tool);
        assert!(text.starts_with("Tool: maps_direction_driving\nDescription: 驾车路径规划"));
        assert!(text.contains("- origin: 出发点经纬度 (required)"));
        assert!(text.contains("- waypoints: No description"));
        assert!(!text.contains("waypoints: No description (required)"));
    }
}
