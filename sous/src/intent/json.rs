//! JSON stages of the cascade.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::{IntentMatcher, ToolInvocation};

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid regex"));

static EMBEDDED_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)\{.*?"tool_name".*?\}"#).expect("valid regex"));

/// Build an invocation from a parsed JSON object with a `tool_name` key.
///
/// A non-string name is kept as its JSON text, so it reaches dispatch as an
/// unknown tool. A missing or non-object `parameters` field becomes an empty map.
fn invocation_from_json(text: &str) -> Option<ToolInvocation> {
    let Value::Object(mut object) = serde_json::from_str::<Value>(text).ok()? else {
        return None;
    };
    let name = match object.get("tool_name")? {
        Value::String(name) => name.trim().to_string(),
        other => other.to_string(),
    };
    let parameters = match object.remove("parameters") {
        Some(Value::Object(parameters)) => parameters,
        _ => Map::new(),
    };
    Some(ToolInvocation { name, parameters })
}

/// The whole text, with code fences stripped, is one JSON tool call.
pub struct StrictJson;

impl IntentMatcher for StrictJson {
    fn name(&self) -> &'static str {
        "strict_json"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        let unfenced = CODE_FENCE.replace_all(text, "$1");
        invocation_from_json(unfenced.trim())
    }
}

/// The shortest `{ ... "tool_name" ... }` substring parses as a tool call.
pub struct EmbeddedJson;

impl IntentMatcher for EmbeddedJson {
    fn name(&self) -> &'static str {
        "embedded_json"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        invocation_from_json(EMBEDDED_CALL.find(text)?.as_str())
    }
}

/// The first line starting with `{` and mentioning `"tool_name"` that parses.
pub struct JsonLine;

impl IntentMatcher for JsonLine {
    fn name(&self) -> &'static str {
        "json_line"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        text.lines()
            .map(str::trim)
            .filter(|line| line.starts_with('{') && line.contains("\"tool_name\""))
            .find_map(invocation_from_json)
    }
}
