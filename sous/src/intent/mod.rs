//! Tool-call extraction from free-text model output.
//!
//! The model is asked to answer with a bare JSON tool call, but it often
//! wraps the JSON in prose or fences, or answers in plain language even when
//! a tool was clearly wanted. [`Extractor`] runs an ordered list of
//! [`IntentMatcher`]s over the text and returns the first hit:
//!
//! 1. the whole text as JSON, after stripping code fences
//! 2. the shortest `{ ... "tool_name" ... }` substring
//! 3. the first line that looks like a JSON tool call
//! 4. phrase heuristics: delete timer, unit conversion, play video, date, time
//!
//! No hit means the text is a conversational reply.

mod heuristics;
mod json;
mod vocab;

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

pub use heuristics::{DateQuery, DeleteTimer, PlayVideo, TimeQuery, UnitConversion};
pub use json::{EmbeddedJson, JsonLine, StrictJson};

/// A structured request to run one named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Map::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.to_string(), value.into());
        self
    }
}

/// One stage of the extraction cascade.
pub trait IntentMatcher: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Recognize a tool call in `text`. Must not panic on any input.
    fn try_match(&self, text: &str) -> Option<ToolInvocation>;
}

/// Ordered cascade of matchers; the first hit wins.
pub struct Extractor {
    matchers: Vec<Box<dyn IntentMatcher>>,
}

impl Extractor {
    pub fn new(matchers: Vec<Box<dyn IntentMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn extract(&self, raw: &str) -> Option<ToolInvocation> {
        if raw.trim().is_empty() {
            return None;
        }
        self.matchers.iter().find_map(|matcher| {
            let hit = matcher.try_match(raw)?;
            debug!(stage = matcher.name(), tool = %hit.name, "tool call extracted");
            Some(hit)
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(StrictJson),
            Box::new(EmbeddedJson),
            Box::new(JsonLine),
            Box::new(DeleteTimer),
            Box::new(UnitConversion),
            Box::new(PlayVideo),
            Box::new(DateQuery),
            Box::new(TimeQuery),
        ])
    }
}

static DEFAULT_EXTRACTOR: LazyLock<Extractor> = LazyLock::new(Extractor::default);

/// Run the default cascade over `raw`.
pub fn extract(raw: &str) -> Option<ToolInvocation> {
    DEFAULT_EXTRACTOR.extract(raw)
}
