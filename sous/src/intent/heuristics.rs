//! Phrase heuristics for requests the model answered in prose.
//!
//! Each matcher lower-cases its input and looks for one family of phrasings.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use super::vocab::{parse_amount, word_to_number, NUMBER, NUMBER_WORD, UNIT};
use super::{IntentMatcher, ToolInvocation};
use crate::tools::units::canonical_unit;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static DELETE_TIMER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(?:delete|remove|cancel|stop|clear)\s+timer\s+([0-9]+|\w+)"));

/// `(delete|remove|cancel|stop|clear) timer <id-or-name>`
pub struct DeleteTimer;

impl IntentMatcher for DeleteTimer {
    fn name(&self) -> &'static str {
        "delete_timer_phrase"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        let text = text.to_lowercase();
        let token = DELETE_TIMER.captures(&text)?.get(1)?.as_str();
        let identifier = token
            .parse::<u64>()
            .map_or_else(|_| Value::from(token), Value::from);
        Some(ToolInvocation::new("delete_timer").with("timer_identifier", identifier))
    }
}

/// Which capture groups of a conversion pattern hold what.
struct ConversionPattern {
    regex: Regex,
    amount: usize,
    from: usize,
    to: usize,
}

impl ConversionPattern {
    fn read(&self, caps: &Captures<'_>) -> Option<ToolInvocation> {
        let amount = parse_amount(caps.get(self.amount)?.as_str())?;
        let from = canonical_unit(caps.get(self.from)?.as_str());
        let to = canonical_unit(caps.get(self.to)?.as_str());
        Some(
            ToolInvocation::new("convert_units")
                .with("amount", amount)
                .with("from_unit", from)
                .with("to_unit", to),
        )
    }
}

static CONVERSIONS: LazyLock<Vec<ConversionPattern>> = LazyLock::new(|| {
    vec![
        // "convert 2 cups to tablespoons", "2 cup in ml"
        ConversionPattern {
            regex: compile(&format!(
                r"\b(?:convert\s+)?({NUMBER})\s+({UNIT})\s+(?:to|in|into)\s+({UNIT})"
            )),
            amount: 1,
            from: 2,
            to: 3,
        },
        // "three cups to ml"
        ConversionPattern {
            regex: compile(&format!(
                r"\b({NUMBER_WORD})\s+({UNIT})\s+(?:to|in|into)\s+({UNIT})"
            )),
            amount: 1,
            from: 2,
            to: 3,
        },
        // "how many ml in 1 cup", "how many teaspoons are in two tablespoons"
        ConversionPattern {
            regex: compile(&format!(
                r"\bhow\s+many\s+({UNIT})\s+(?:in|are\s+in)\s+({NUMBER}|{NUMBER_WORD})\s+({UNIT})"
            )),
            amount: 2,
            from: 3,
            to: 1,
        },
        // "how many is it if I convert about 2 cups = ml"
        ConversionPattern {
            regex: compile(&format!(
                r"\b(?:how\s+many|convert)\s+.*?({NUMBER}|{NUMBER_WORD})\s+({UNIT})\s+(?:to|in|into|=|equals?)\s+({UNIT})"
            )),
            amount: 1,
            from: 2,
            to: 3,
        },
    ]
});

/// Amount-unit-to-unit phrasings, with digits or spelled-out numbers.
pub struct UnitConversion;

impl IntentMatcher for UnitConversion {
    fn name(&self) -> &'static str {
        "conversion_phrase"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        let text = text.to_lowercase();
        CONVERSIONS.iter().find_map(|pattern| {
            let caps = pattern.regex.captures(&text)?;
            pattern.read(&caps)
        })
    }
}

static PLAY_VIDEO: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        compile(r"\b(?:play|start)\s+(?:a\s+)?(?:result|video)\s*([0-9]+)"),
        compile(&format!(
            r"\b(?:play|start)\s+(?:a\s+)?(?:result|video)\s+({NUMBER_WORD})"
        )),
        compile(&format!(
            r"\b(?:play|start).*?(?:result|video)\s*([0-9]+|{NUMBER_WORD})"
        )),
    ]
});

/// `play result 2`, `play video three`, `start the second result 2 of ...`
pub struct PlayVideo;

impl IntentMatcher for PlayVideo {
    fn name(&self) -> &'static str {
        "play_video_phrase"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        let text = text.to_lowercase();
        PLAY_VIDEO.iter().find_map(|regex| {
            let token = regex.captures(&text)?.get(1)?.as_str();
            let result_number = if token.starts_with(|c: char| c.is_ascii_digit()) {
                token.parse::<i64>().ok()?
            } else {
                i64::from(word_to_number(token).unwrap_or(1))
            };
            Some(ToolInvocation::new("play_youtube_video").with("result_number", result_number))
        })
    }
}

static DATE_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:what['’]?s?\s+(?:the\s+)?(?:current\s+)?(?:date|today)|today\s+is|current\s+date)")
});

static TIME_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"\b(?:what['’]?s?\s+(?:the\s+)?(?:current\s+)?time|current\s+time|time\s+is)")
});

/// "what's the date", "what's today", "current date"
pub struct DateQuery;

impl IntentMatcher for DateQuery {
    fn name(&self) -> &'static str {
        "date_phrase"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        DATE_QUESTION
            .is_match(&text.to_lowercase())
            .then(|| ToolInvocation::new("get_today_date"))
    }
}

/// "what's the time", "what time is it", "current time"
pub struct TimeQuery;

impl IntentMatcher for TimeQuery {
    fn name(&self) -> &'static str {
        "time_phrase"
    }

    fn try_match(&self, text: &str) -> Option<ToolInvocation> {
        TIME_QUESTION
            .is_match(&text.to_lowercase())
            .then(|| ToolInvocation::new("get_current_time"))
    }
}
