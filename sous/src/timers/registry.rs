//! Process-wide timer registry with lazy expiry.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, info};

use super::{format_remaining_words, whole_seconds, TimerFinished, TimerTick, TimerView};

/// Interval between `timer_update` ticks.
pub const TICK: Duration = Duration::from_secs(1);

/// Longest timer accepted, one week.
const MAX_TIMER_MINUTES: f64 = 7.0 * 24.0 * 60.0;

#[derive(Debug, Error, PartialEq)]
pub enum TimerError {
    #[error("timer duration must be more than 0 and at most 10080 minutes, got {0}")]
    InvalidDuration(f64),
}

/// A registered countdown.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Monotonic, starts at 1, never reused.
    pub id: u64,
    pub name: String,
    pub duration_minutes: f64,
    pub created_at: DateTime<Local>,
    pub ends_at: DateTime<Local>,
    deadline: Instant,
}

impl Timer {
    /// Time left at `now`, zero once expired.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline <= now
    }

    /// Client view, with `remaining` rendered by the caller.
    pub fn view(&self, remaining: String) -> TimerView {
        TimerView {
            id: self.id,
            name: self.name.clone(),
            duration_minutes: self.duration_minutes,
            remaining,
            end_time: self.ends_at.format("%H:%M:%S").to_string(),
            created_at: self.created_at.format("%H:%M:%S").to_string(),
        }
    }

    fn tick(&self, now: Instant) -> TimerTick {
        let secs = whole_seconds(self.remaining(now));
        let (minutes, seconds) = (secs / 60, secs % 60);
        TimerTick {
            timer_id: self.id,
            name: self.name.clone(),
            remaining_minutes: minutes,
            remaining_seconds: seconds,
            remaining_time: format!("{minutes}:{seconds:02}"),
        }
    }

    fn finished(&self) -> TimerFinished {
        TimerFinished {
            timer_id: self.id,
            name: self.name.clone(),
            message: format!("Timer '{}' has finished!", self.name),
        }
    }
}

/// How a delete request names its timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerIdentifier {
    Id(u64),
    Name(String),
}

impl fmt::Display for TimerIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { id: u64, name: String },
    NotFound,
}

/// Something the scheduler should announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerNotice {
    Tick(TimerTick),
    Finished(TimerFinished),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Wakeup {
    at: Instant,
    timer_id: u64,
}

#[derive(Debug, Default)]
struct RegistryState {
    /// Keyed by id, so iteration order is insertion order.
    timers: BTreeMap<u64, Timer>,
    last_id: u64,
    /// Min-heap of pending wake-ups. Entries for deleted timers are skipped on pop.
    schedule: BinaryHeap<Reverse<Wakeup>>,
    /// Purged by a read before the scheduler announced them.
    unannounced: Vec<Timer>,
}

impl RegistryState {
    /// Drop every timer whose deadline has passed. They are still owed a
    /// `timer_finished` from the scheduler.
    fn purge_expired(&mut self, now: Instant) {
        let unannounced = &mut self.unannounced;
        self.timers.retain(|id, timer| {
            let keep = !timer.is_expired(now);
            if !keep {
                debug!(timer_id = id, name = %timer.name, "expired timer removed");
                unannounced.push(timer.clone());
            }
            keep
        });
    }
}

/// Owner of all live timers.
///
/// Every read purges expired timers first, so an expired timer is never
/// reported as active.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    state: Mutex<RegistryState>,
    wake: Notify,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a timer and schedule its first tick.
    pub async fn set(&self, duration_minutes: f64, name: Option<&str>) -> Result<Timer, TimerError> {
        if !duration_minutes.is_finite() || duration_minutes <= 0.0 || duration_minutes > MAX_TIMER_MINUTES {
            return Err(TimerError::InvalidDuration(duration_minutes));
        }
        let length = Duration::from_secs_f64(duration_minutes * 60.0);
        if length.is_zero() {
            return Err(TimerError::InvalidDuration(duration_minutes));
        }

        let now = Instant::now();
        let created_at = Local::now();
        let ends_at = chrono::Duration::from_std(length).map_or(created_at, |d| created_at + d);

        let mut state = self.state.lock().await;
        state.last_id += 1;
        let id = state.last_id;
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("Timer {id}"), String::from);

        let timer = Timer {
            id,
            name,
            duration_minutes,
            created_at,
            ends_at,
            deadline: now + length,
        };
        state.timers.insert(id, timer.clone());
        state.schedule.push(Reverse(Wakeup {
            at: (now + TICK).min(timer.deadline),
            timer_id: id,
        }));
        drop(state);

        self.wake.notify_one();
        info!(timer_id = id, name = %timer.name, duration_minutes, "timer set");
        Ok(timer)
    }

    /// Delete by id, or by case-insensitive exact name.
    ///
    /// A name that matches no timer but is all digits is retried as an id.
    pub async fn delete(&self, identifier: &TimerIdentifier) -> DeleteOutcome {
        let mut state = self.state.lock().await;
        state.purge_expired(Instant::now());

        let found = match identifier {
            TimerIdentifier::Id(id) => state.timers.contains_key(id).then_some(*id),
            TimerIdentifier::Name(name) => {
                let wanted = name.trim().to_lowercase();
                state
                    .timers
                    .values()
                    .find(|t| t.name.to_lowercase() == wanted)
                    .map(|t| t.id)
                    .or_else(|| {
                        wanted
                            .parse::<u64>()
                            .ok()
                            .filter(|id| state.timers.contains_key(id))
                    })
            }
        };

        match found.and_then(|id| state.timers.remove(&id)) {
            Some(timer) => {
                info!(timer_id = timer.id, name = %timer.name, "timer deleted");
                DeleteOutcome::Deleted {
                    id: timer.id,
                    name: timer.name,
                }
            }
            None => DeleteOutcome::NotFound,
        }
    }

    /// Active timers in insertion order.
    pub async fn list(&self) -> Vec<Timer> {
        let mut state = self.state.lock().await;
        state.purge_expired(Instant::now());
        state.timers.values().cloned().collect()
    }

    /// Active timers rendered for clients with `"Xm Ys"` remaining.
    pub async fn views(&self) -> Vec<TimerView> {
        let now = Instant::now();
        self.list()
            .await
            .iter()
            .map(|t| t.view(format_remaining_words(t.remaining(now))))
            .collect()
    }

    /// Earliest pending wake-up, if any.
    pub async fn next_wakeup(&self) -> Option<Instant> {
        let state = self.state.lock().await;
        state.schedule.peek().map(|Reverse(w)| w.at)
    }

    /// Resolves when a new timer has been scheduled.
    pub async fn schedule_changed(&self) {
        self.wake.notified().await;
    }

    /// Pop every wake-up due at `now` and return what to announce.
    ///
    /// Deleted timers are skipped. A timer past its deadline is removed and
    /// reported as finished, as is one a read already purged; any other
    /// timer ticks and is rescheduled.
    pub async fn fire_due(&self, now: Instant) -> Vec<TimerNotice> {
        let mut state = self.state.lock().await;
        let mut notices: Vec<TimerNotice> = std::mem::take(&mut state.unannounced)
            .iter()
            .map(|timer| {
                info!(timer_id = timer.id, name = %timer.name, "timer finished");
                TimerNotice::Finished(timer.finished())
            })
            .collect();

        while let Some(Reverse(wakeup)) = state.schedule.peek().copied() {
            if wakeup.at > now {
                break;
            }
            state.schedule.pop();

            let Some(timer) = state.timers.get(&wakeup.timer_id) else {
                continue;
            };

            if timer.is_expired(now) {
                if let Some(timer) = state.timers.remove(&wakeup.timer_id) {
                    info!(timer_id = timer.id, name = %timer.name, "timer finished");
                    notices.push(TimerNotice::Finished(timer.finished()));
                }
                continue;
            }

            notices.push(TimerNotice::Tick(timer.tick(now)));
            let mut next = wakeup.at + TICK;
            if next <= now {
                next = now + TICK;
            }
            let next = next.min(timer.deadline);
            state.schedule.push(Reverse(Wakeup {
                at: next,
                timer_id: wakeup.timer_id,
            }));
        }

        notices
    }
}
