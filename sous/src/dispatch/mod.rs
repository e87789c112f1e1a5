//! Command dispatch.
//!
//! Each command walks the same stages:
//!
//! `Received -> OracleQueried -> (ToolExecuted | Conversational) -> Replied
//! -> HistoryUpdated -> SpeechEmitted`
//!
//! A failing step degrades to a polite reply; every stage still runs.

mod handlers;
mod prompt;
#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use base64::Engine;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::events::{EventBus, ServerEvent};
use crate::intent::Extractor;
use crate::services::Collaborators;
use crate::session::SessionStore;
use crate::timers::{format_remaining_clock, TimerRegistry};
use crate::tools::Tool;

pub use handlers::Outcome;
pub use prompt::SYSTEM_PROMPT;

/// Reply used when the model could not be reached.
pub const ORACLE_APOLOGY: &str = "Sorry, I'm having trouble thinking right now.";

/// Reply for a tool name outside the known set.
pub const UNKNOWN_TOOL_REPLY: &str = "Sorry, I'm not sure how to help with that";

const SPEECH_FAILURE: &str = "Failed to generate speech";
const AUDIO_MIME: &str = "audio/mpeg";

/// Progress of one command through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    OracleQueried,
    ToolExecuted,
    Conversational,
    Replied,
    HistoryUpdated,
    SpeechEmitted,
}

/// What happened to one command.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub reply: String,
    /// Wire name of the tool that ran, if any.
    pub tool: Option<String>,
    pub stages: Vec<Stage>,
}

impl CommandReport {
    fn enter(&mut self, session_id: &str, stage: Stage) {
        debug!(session_id, ?stage, "dispatch stage");
        self.stages.push(stage);
    }
}

/// Options for building a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherOptions {
    /// Voice passed to the speech synthesizer.
    pub voice: String,
    /// Commands processed at the same time.
    pub max_concurrent_commands: usize,
    /// Synthesize speech for every reply.
    pub speech: bool,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            voice: "nova".to_string(),
            max_concurrent_commands: 8,
            speech: true,
        }
    }
}

/// Turns user commands into tool runs, replies and events.
pub struct Dispatcher {
    collaborators: Collaborators,
    timers: Arc<TimerRegistry>,
    sessions: Arc<SessionStore>,
    events: EventBus,
    extractor: Extractor,
    voice: String,
    speech: bool,
    permits: Semaphore,
}

impl Dispatcher {
    pub fn new(
        collaborators: Collaborators,
        timers: Arc<TimerRegistry>,
        sessions: Arc<SessionStore>,
        events: EventBus,
        options: DispatcherOptions,
    ) -> Self {
        Self {
            collaborators,
            timers,
            sessions,
            events,
            extractor: Extractor::default(),
            voice: options.voice,
            speech: options.speech,
            permits: Semaphore::new(options.max_concurrent_commands.max(1)),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn timers(&self) -> &Arc<TimerRegistry> {
        &self.timers
    }

    /// Run one command for `session_id` through every stage.
    ///
    /// Events go to the session's sockets; the reply is also returned.
    pub async fn handle_command(&self, session_id: &str, command: &str) -> CommandReport {
        let _permit = self.permits.acquire().await.ok();
        let mut report = CommandReport {
            reply: String::new(),
            tool: None,
            stages: Vec::new(),
        };

        report.enter(session_id, Stage::Received);
        info!(session_id, command, "command received");
        self.sessions.ensure(session_id).await;
        let history = self.sessions.history(session_id).await;

        let raw = match self
            .collaborators
            .oracle
            .complete(SYSTEM_PROMPT, &history, command)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                error!(session_id, error = %e, "oracle failed");
                self.events.to_session(session_id, ServerEvent::error(e.to_string()));
                ORACLE_APOLOGY.to_string()
            }
        };
        report.enter(session_id, Stage::OracleQueried);
        debug!(session_id, raw = %raw, "oracle reply");

        let reply = match self.extractor.extract(&raw) {
            Some(invocation) => {
                let outcome = match Tool::from_invocation(&invocation) {
                    Some(tool) => {
                        info!(session_id, tool = tool.name(), params = ?invocation.parameters, "tool call");
                        report.tool = Some(tool.name().to_string());
                        self.execute(session_id, tool).await
                    }
                    None => {
                        warn!(session_id, tool = %invocation.name, "unknown tool");
                        Outcome::reply(UNKNOWN_TOOL_REPLY)
                    }
                };
                report.enter(session_id, Stage::ToolExecuted);
                for event in outcome.events {
                    self.events.to_session(session_id, event);
                }
                outcome.reply
            }
            None => {
                report.enter(session_id, Stage::Conversational);
                raw
            }
        };

        self.events.to_session(
            session_id,
            ServerEvent::FinalText {
                text: reply.clone(),
            },
        );
        report.enter(session_id, Stage::Replied);

        self.sessions.record_exchange(session_id, command, &reply).await;
        report.enter(session_id, Stage::HistoryUpdated);

        if self.speech && !reply.trim().is_empty() {
            self.speak(session_id, &reply).await;
        }
        report.enter(session_id, Stage::SpeechEmitted);

        report.reply = reply;
        report
    }

    async fn speak(&self, session_id: &str, reply: &str) {
        let text = speakable(reply);
        match self.collaborators.speech.synthesize(&text, &self.voice).await {
            Ok(audio) => {
                let audio_b64 = base64::engine::general_purpose::STANDARD.encode(audio);
                self.events.to_session(
                    session_id,
                    ServerEvent::AiAudio {
                        audio_b64,
                        mime: AUDIO_MIME.to_string(),
                    },
                );
            }
            Err(e) => {
                warn!(session_id, error = %e, "speech synthesis failed");
                self.events
                    .to_session(session_id, ServerEvent::error(SPEECH_FAILURE));
            }
        }
    }

    /// Active timers with `MM:SS` remaining, for a `get_timers` request.
    pub async fn timers_snapshot(&self) -> ServerEvent {
        let now = tokio::time::Instant::now();
        let timers = self
            .timers
            .list()
            .await
            .iter()
            .map(|t| t.view(format_remaining_clock(t.remaining(now))))
            .collect();
        ServerEvent::TimersList {
            timers,
            message: None,
        }
    }

    /// Full recipe for a `get_recipe_details` request.
    pub async fn recipe_details(&self, recipe_id: &str) -> ServerEvent {
        let recipe_id = recipe_id.trim();
        if recipe_id.is_empty() {
            return ServerEvent::RecipeDetails {
                success: false,
                recipe: None,
                message: Some("No recipe ID provided".to_string()),
            };
        }
        match self.collaborators.recipes.lookup(recipe_id).await {
            Ok(Some(recipe)) => ServerEvent::RecipeDetails {
                success: true,
                recipe: Some(Box::new(recipe)),
                message: None,
            },
            Ok(None) => ServerEvent::RecipeDetails {
                success: false,
                recipe: None,
                message: Some(handlers::RECIPE_NOT_FOUND.to_string()),
            },
            Err(e) => {
                error!(recipe_id, error = %e, "recipe lookup failed");
                ServerEvent::RecipeDetails {
                    success: false,
                    recipe: None,
                    message: Some(e.to_string()),
                }
            }
        }
    }
}

/// Reply text with markdown emphasis removed, for speech.
fn speakable(reply: &str) -> String {
    reply.replace("**", "")
}
