//! Session model representing one ongoing conversation.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use super::{ChatMessage, Video};

/// Maximum number of history entries kept per session.
pub const HISTORY_LIMIT: usize = 20;

/// A conversation: bounded history plus the most recent video search.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque identifier chosen by the client or assigned on connect.
    pub id: String,
    /// Oldest first, never longer than [`HISTORY_LIMIT`].
    pub history: VecDeque<ChatMessage>,
    /// Results of the latest video search, numbered from 1.
    pub last_search_results: Vec<Video>,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Last time a command touched this session.
    pub last_active: Instant,
}

impl Session {
    /// Create an empty session.
    pub fn new(id: String) -> Self {
        Self {
            id,
            history: VecDeque::new(),
            last_search_results: Vec::new(),
            created_at: Utc::now(),
            last_active: Instant::now(),
        }
    }

    /// Append one user/assistant exchange, dropping the oldest entries past the limit.
    pub fn record_exchange(&mut self, command: &str, reply: &str) {
        self.history.push_back(ChatMessage::user(command));
        self.history.push_back(ChatMessage::assistant(reply));
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
        self.last_active = Instant::now();
    }

    /// Look up a video of the latest search by its 1-based number.
    pub fn search_result(&self, result_number: i64) -> Option<&Video> {
        let index = usize::try_from(result_number).ok()?.checked_sub(1)?;
        self.last_search_results.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn video(n: usize) -> Video {
        Video {
            result_number: n,
            title: format!("Video {n}"),
            video_id: format!("id{n}"),
            thumbnail: String::new(),
            search_url: None,
        }
    }

    #[test]
    fn test_history_keeps_last_twenty_entries() {
        let mut session = Session::new("abc".to_string());
        for i in 0..15 {
            session.record_exchange(&format!("q{i}"), &format!("a{i}"));
        }

        assert_eq!(session.history.len(), HISTORY_LIMIT);
        let first = session.history.front().unwrap();
        assert_eq!(first.role, MessageRole::User);
        assert_eq!(first.content, "q5");
        assert_eq!(session.history.back().unwrap().content, "a14");
    }

    #[test]
    fn test_search_result_is_one_based_and_bounded() {
        let mut session = Session::new("abc".to_string());
        session.last_search_results = vec![video(1), video(2)];

        assert_eq!(session.search_result(1).unwrap().video_id, "id1");
        assert_eq!(session.search_result(2).unwrap().video_id, "id2");
        assert!(session.search_result(3).is_none());
        assert!(session.search_result(0).is_none());
        assert!(session.search_result(-4).is_none());
    }
}
