//! Named countdown timers.
//!
//! The [`TimerRegistry`] owns every live timer. A single [`scheduler`] loop
//! drains a min-heap of wake-ups to emit `timer_update` ticks once per second
//! and `timer_finished` at expiry.

mod registry;
pub mod scheduler;

use std::time::Duration;

use serde::Serialize;

pub use registry::{DeleteOutcome, TimerIdentifier, TimerNotice, TimerRegistry};

/// Timer as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub id: u64,
    pub name: String,
    pub duration_minutes: f64,
    pub remaining: String,
    /// Wall-clock `HH:MM:SS`.
    pub end_time: String,
    /// Wall-clock `HH:MM:SS`.
    pub created_at: String,
}

/// Payload of a `timer_update` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerTick {
    pub timer_id: u64,
    pub name: String,
    pub remaining_minutes: u64,
    pub remaining_seconds: u64,
    /// `M:SS`
    pub remaining_time: String,
}

/// Payload of a `timer_finished` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerFinished {
    pub timer_id: u64,
    pub name: String,
    pub message: String,
}

/// Whole seconds left, rounding any fraction up.
pub fn whole_seconds(remaining: Duration) -> u64 {
    remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
}

/// `"4m 5s"`
pub fn format_remaining_words(remaining: Duration) -> String {
    let secs = whole_seconds(remaining);
    format!("{}m {}s", secs / 60, secs % 60)
}

/// `"04:05"`
pub fn format_remaining_clock(remaining: Duration) -> String {
    let secs = whole_seconds(remaining);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
