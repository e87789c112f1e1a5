//! Notifications sent from the core to connected clients.
//!
//! Every notification is wrapped in an [`Envelope`] naming its audience and
//! published on a broadcast channel. Sockets subscribe and forward only the
//! envelopes addressed to the sessions they carry.

use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{Recipe, RecipeListing, Video};
use crate::timers::{TimerFinished, TimerTick, TimerView};

/// Capacity of the notification channel.
const CHANNEL_CAPACITY: usize = 1000;

/// A named event with a JSON payload, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    SessionId {
        session_id: String,
    },
    YoutubeResults {
        videos: Vec<Video>,
    },
    TimerSet {
        timer: TimerView,
        message: String,
    },
    TimersList {
        timers: Vec<TimerView>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    TimerDeleted {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    TimerUpdate(TimerTick),
    TimerFinished(TimerFinished),
    ConversionResult {
        result: String,
        /// Full precision; `result` shows two decimals.
        #[serde(skip_serializing_if = "Option::is_none")]
        converted_amount: Option<f64>,
        amount: f64,
        from_unit: String,
        to_unit: String,
        error: Option<String>,
    },
    SubstitutionResult {
        #[serde(skip_serializing_if = "Option::is_none")]
        ingredient: Option<String>,
        substitutions: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        quantity: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    RecipeResults {
        recipes: RecipeListing,
    },
    RecipeDetails {
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        recipe: Option<Box<Recipe>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    PlayVideo {
        video_id: String,
        title: String,
        result_number: usize,
    },
    FinalText {
        text: String,
    },
    AiAudio {
        audio_b64: String,
        mime: String,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SessionId { .. } => "session_id",
            Self::YoutubeResults { .. } => "youtube_results",
            Self::TimerSet { .. } => "timer_set",
            Self::TimersList { .. } => "timers_list",
            Self::TimerDeleted { .. } => "timer_deleted",
            Self::TimerUpdate(_) => "timer_update",
            Self::TimerFinished(_) => "timer_finished",
            Self::ConversionResult { .. } => "conversion_result",
            Self::SubstitutionResult { .. } => "substitution_result",
            Self::RecipeResults { .. } => "recipe_results",
            Self::RecipeDetails { .. } => "recipe_details",
            Self::PlayVideo { .. } => "play_video",
            Self::FinalText { .. } => "final_text",
            Self::AiAudio { .. } => "ai_audio",
            Self::Error { .. } => "error",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Who should receive an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// Every connected client.
    All,
    /// Only sockets carrying this session.
    Session(String),
}

/// An event together with its audience.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl Envelope {
    /// Whether a socket carrying `sessions` should forward this envelope.
    pub fn is_for(&self, sessions: &HashSet<String>) -> bool {
        match &self.audience {
            Audience::All => true,
            Audience::Session(id) => sessions.contains(id),
        }
    }
}

/// Publishing side of the notification channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Envelope>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn publish(&self, audience: Audience, event: ServerEvent) {
        tracing::trace!(event = event.name(), ?audience, "publish");
        let _ = self.tx.send(Envelope { audience, event });
    }

    pub fn to_session(&self, session_id: &str, event: ServerEvent) {
        self.publish(Audience::Session(session_id.to_string()), event);
    }

    pub fn broadcast(&self, event: ServerEvent) {
        self.publish(Audience::All, event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = ServerEvent::FinalText {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "final_text", "data": {"text": "hello"}})
        );
        assert_eq!(event.name(), "final_text");
    }

    #[test]
    fn test_envelope_addressing() {
        let sessions: HashSet<String> = ["a".to_string()].into_iter().collect();
        let mine = Envelope {
            audience: Audience::Session("a".to_string()),
            event: ServerEvent::error("x"),
        };
        let theirs = Envelope {
            audience: Audience::Session("b".to_string()),
            event: ServerEvent::error("x"),
        };
        let everyone = Envelope {
            audience: Audience::All,
            event: ServerEvent::error("x"),
        };

        assert!(mine.is_for(&sessions));
        assert!(!theirs.is_for(&sessions));
        assert!(everyone.is_for(&sessions));
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscribers() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.to_session("s1", ServerEvent::error("boom"));

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.audience, Audience::Session("s1".to_string()));
        assert_eq!(envelope.event.name(), "error");
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::new();
        bus.broadcast(ServerEvent::error("nobody listening"));
    }
}
