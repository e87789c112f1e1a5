//! Sous server - HTTP + WebSocket front end for the dispatcher.
//!
//! Endpoints:
//! - GET / - Kitchen assistant UI
//! - GET /api/health - Liveness probe
//! - WS /ws - Commands in, events out
//!
//! Each socket is assigned a session id on connect. Events addressed to a
//! session reach every socket carrying it; timer ticks reach everyone.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::ws::{Message, WebSocket},
    extract::{State, WebSocketUpgrade},
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::dispatch::{Dispatcher, DispatcherOptions};
use crate::events::{EventBus, ServerEvent};
use crate::services::Collaborators;
use crate::session::{spawn_idle_sweep, SessionStore};
use crate::timers::{scheduler, TimerRegistry};

/// Where to listen.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub host: String,
    pub port: u16,
    /// Open the UI in a browser once listening.
    pub open_browser: bool,
}

/// Shared server state.
pub struct ServerState {
    pub dispatcher: Arc<Dispatcher>,
    /// Notification channel every socket subscribes to.
    pub events: EventBus,
}

/// Frames a client may send, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    UserCommand {
        command: String,
        /// Defaults to the id assigned to the socket.
        #[serde(default)]
        session_id: Option<String>,
    },
    GetTimers,
    GetRecipeDetails {
        #[serde(default)]
        recipe_id: String,
    },
}

// === Server Lifecycle ===

/// Build the dispatcher and its background tasks, then serve until Ctrl-C.
pub async fn start_server(options: ServerOptions, config: &ServiceConfig) -> Result<()> {
    let collaborators =
        Collaborators::from_config(config).context("Failed to build HTTP client")?;
    let events = EventBus::new();
    let timers = Arc::new(TimerRegistry::new());
    let sessions = Arc::new(SessionStore::new());

    let dispatcher = Arc::new(Dispatcher::new(
        collaborators,
        Arc::clone(&timers),
        Arc::clone(&sessions),
        events.clone(),
        DispatcherOptions {
            voice: config.voice.clone(),
            max_concurrent_commands: config.max_concurrent_commands,
            speech: true,
        },
    ));

    let scheduler = scheduler::spawn(timers, events.clone());
    let sweep = spawn_idle_sweep(sessions, config.session_idle());

    let app = router(Arc::new(ServerState { dispatcher, events }));

    let listener = tokio::net::TcpListener::bind((options.host.as_str(), options.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", options.host, options.port))?;
    let addr = listener.local_addr()?;
    info!(%addr, "sous server listening");
    println!("Sous server starting on http://{addr}");

    if options.open_browser {
        if let Err(e) = open::that(format!("http://{addr}")) {
            warn!(error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    scheduler.abort();
    sweep.abort();
    info!("sous server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Routes with permissive CORS.
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/ws", get(websocket_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Handlers ===

async fn index_handler() -> Html<&'static str> {
    Html(include_str!("ui.html"))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(event = event.name(), error = %e, "failed to serialize event");
            true
        }
    }
}

async fn handle_websocket(mut socket: WebSocket, state: Arc<ServerState>) {
    let connection_id = Uuid::now_v7().to_string();
    let mut sessions: HashSet<String> = HashSet::from([connection_id.clone()]);
    let mut rx = state.events.subscribe();

    state.dispatcher.sessions().ensure(&connection_id).await;
    info!(session_id = %connection_id, "client connected");

    let hello = ServerEvent::SessionId {
        session_id: connection_id.clone(),
    };
    if !send_event(&mut socket, &hello).await {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientMessage>(text.as_str()) {
                        Ok(message) => {
                            let reply = handle_client_message(&state, &connection_id, &mut sessions, message).await;
                            if let Some(event) = reply {
                                if !send_event(&mut socket, &event).await {
                                    break;
                                }
                            }
                        }
                        Err(e) => debug!(session_id = %connection_id, error = %e, "ignoring malformed frame"),
                    }
                }
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            envelope = rx.recv() => match envelope {
                Ok(envelope) if envelope.is_for(&sessions) => {
                    if !send_event(&mut socket, &envelope.event).await {
                        break;
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(session_id = %connection_id, skipped, "client lagging, events dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Session state is kept until the idle sweep removes it.
    info!(session_id = %connection_id, "client disconnected");
}

/// Act on one client frame. Returns an event to send straight back, if any.
async fn handle_client_message(
    state: &Arc<ServerState>,
    connection_id: &str,
    sessions: &mut HashSet<String>,
    message: ClientMessage,
) -> Option<ServerEvent> {
    match message {
        ClientMessage::UserCommand {
            command,
            session_id,
        } => {
            let session_id = session_id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| connection_id.to_string());
            sessions.insert(session_id.clone());

            let dispatcher = Arc::clone(&state.dispatcher);
            tokio::spawn(async move {
                dispatcher.handle_command(&session_id, &command).await;
            });
            None
        }
        ClientMessage::GetTimers => Some(state.dispatcher.timers_snapshot().await),
        ClientMessage::GetRecipeDetails { recipe_id } => {
            let dispatcher = Arc::clone(&state.dispatcher);
            let events = state.events.clone();
            let session_id = connection_id.to_string();
            tokio::spawn(async move {
                let event = dispatcher.recipe_details(&recipe_id).await;
                events.to_session(&session_id, event);
            });
            None
        }
    }
}
