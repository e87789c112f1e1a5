//! The fixed set of tools the assistant can run.
//!
//! [`Tool`] is the typed form of a [`ToolInvocation`]: parameters are read,
//! coerced and defaulted once here so handlers never touch raw JSON.

pub mod clock;
pub mod substitutions;
pub mod units;

use serde_json::{Map, Value};

use crate::intent::ToolInvocation;
use crate::timers::TimerIdentifier;

/// Minutes used when `set_timer` names no duration.
pub const DEFAULT_TIMER_MINUTES: f64 = 5.0;

/// Every recognized tool with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Tool {
    GetCurrentTime,
    GetTodayDate,
    SearchWikipedia {
        query: String,
    },
    SearchYoutube {
        query: String,
    },
    SetTimer {
        duration_minutes: f64,
        timer_name: Option<String>,
    },
    DeleteTimer {
        identifier: TimerIdentifier,
    },
    ListTimers,
    ConvertUnits {
        amount: f64,
        from_unit: String,
        to_unit: String,
    },
    RecipeSubstitution {
        ingredient: String,
        quantity: Option<String>,
    },
    PlayYoutubeVideo {
        /// `None` when the parameter is missing or not a whole number.
        result_number: Option<i64>,
    },
    SearchRecipes {
        query: String,
        diet: Option<String>,
        cuisine: Option<String>,
    },
    GetRecipeDetails {
        recipe_id: String,
    },
    RecipeByIngredients {
        /// Comma-separated.
        ingredients: String,
    },
}

impl Tool {
    /// Wire name, as the model spells it.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GetCurrentTime => "get_current_time",
            Self::GetTodayDate => "get_today_date",
            Self::SearchWikipedia { .. } => "search_wikipedia",
            Self::SearchYoutube { .. } => "search_youtube",
            Self::SetTimer { .. } => "set_timer",
            Self::DeleteTimer { .. } => "delete_timer",
            Self::ListTimers => "list_timers",
            Self::ConvertUnits { .. } => "convert_units",
            Self::RecipeSubstitution { .. } => "recipe_substitution",
            Self::PlayYoutubeVideo { .. } => "play_youtube_video",
            Self::SearchRecipes { .. } => "search_recipes",
            Self::GetRecipeDetails { .. } => "get_recipe_details",
            Self::RecipeByIngredients { .. } => "recipe_by_ingredients",
        }
    }

    /// Type an invocation. Unknown tool names give `None`.
    pub fn from_invocation(invocation: &ToolInvocation) -> Option<Self> {
        let p = &invocation.parameters;
        let tool = match invocation.name.as_str() {
            "get_current_time" => Self::GetCurrentTime,
            "get_today_date" => Self::GetTodayDate,
            "search_wikipedia" => Self::SearchWikipedia {
                query: text(p, "query").unwrap_or_default(),
            },
            "search_youtube" => Self::SearchYoutube {
                query: text(p, "query").unwrap_or_default(),
            },
            "set_timer" => Self::SetTimer {
                duration_minutes: number(p, "duration_minutes").unwrap_or(DEFAULT_TIMER_MINUTES),
                timer_name: non_blank(p, "timer_name"),
            },
            "delete_timer" => Self::DeleteTimer {
                identifier: timer_identifier(p.get("timer_identifier")),
            },
            "list_timers" => Self::ListTimers,
            "convert_units" => Self::ConvertUnits {
                amount: number(p, "amount").unwrap_or(1.0),
                from_unit: text(p, "from_unit").unwrap_or_default(),
                to_unit: text(p, "to_unit").unwrap_or_default(),
            },
            "recipe_substitution" => Self::RecipeSubstitution {
                ingredient: text(p, "ingredient").unwrap_or_default(),
                quantity: non_blank(p, "quantity"),
            },
            "play_youtube_video" => Self::PlayYoutubeVideo {
                result_number: whole_number(p, "result_number"),
            },
            "search_recipes" => Self::SearchRecipes {
                query: text(p, "query").unwrap_or_default(),
                diet: non_blank(p, "diet"),
                cuisine: non_blank(p, "cuisine"),
            },
            "get_recipe_details" => Self::GetRecipeDetails {
                recipe_id: text(p, "recipe_id").unwrap_or_default(),
            },
            "recipe_by_ingredients" => Self::RecipeByIngredients {
                ingredients: text(p, "ingredients").unwrap_or_default(),
            },
            _ => return None,
        };
        Some(tool)
    }
}

/// A string parameter; numbers and booleans are rendered as text.
fn text(params: &Map<String, Value>, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn non_blank(params: &Map<String, Value>, key: &str) -> Option<String> {
    text(params, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// A numeric parameter; numeric strings such as `"2.5"` are accepted.
fn number(params: &Map<String, Value>, key: &str) -> Option<f64> {
    match params.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_number(params: &Map<String, Value>, key: &str) -> Option<i64> {
    match params.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// JSON integers address a timer by id; anything else is a name.
fn timer_identifier(value: Option<&Value>) -> TimerIdentifier {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .map_or_else(|| TimerIdentifier::Name(n.to_string()), TimerIdentifier::Id),
        Some(Value::String(s)) => TimerIdentifier::Name(s.clone()),
        Some(Value::Null) | None => TimerIdentifier::Name(String::new()),
        Some(other) => TimerIdentifier::Name(other.to_string()),
    }
}
