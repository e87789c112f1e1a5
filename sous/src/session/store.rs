//! In-memory session store.
//!
//! Sessions are created lazily on first reference and pruned by
//! [`spawn_idle_sweep`] once they have been idle for too long.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::models::{ChatMessage, Session, Video};

/// All live sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the session if it does not exist yet and mark it active.
    pub async fn ensure(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, "session created");
                Session::new(session_id.to_string())
            })
            .last_active = Instant::now();
    }

    /// Conversation so far, oldest first.
    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|s| s.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append a command and its reply, keeping the history bounded.
    pub async fn record_exchange(&self, session_id: &str, command: &str, reply: &str) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id.to_string()))
            .record_exchange(command, reply);
    }

    /// Replace the session's last video search results.
    pub async fn set_results(&self, session_id: &str, videos: Vec<Video>) {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Session::new(session_id.to_string()))
            .last_search_results = videos;
    }

    /// Video `result_number` (1-based) of the session's latest search.
    pub async fn search_result(&self, session_id: &str, result_number: i64) -> Option<Video> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)?
            .search_result(result_number)
            .cloned()
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many went.
    pub async fn prune_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| now.saturating_duration_since(s.last_active) <= max_idle);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }
}

/// Prune idle sessions every `max_idle / 4`, at least once a minute.
pub fn spawn_idle_sweep(store: Arc<SessionStore>, max_idle: Duration) -> JoinHandle<()> {
    let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(60));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let pruned = store.prune_idle(max_idle).await;
            if pruned > 0 {
                info!(pruned, "pruned idle sessions");
            }
        }
    })
}
