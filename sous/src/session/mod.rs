//! Conversation state per session.

mod store;

pub use store::{spawn_idle_sweep, SessionStore};
