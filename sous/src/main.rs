//! Sous - a conversational kitchen assistant.
//!
//! A user's command goes to a language model; the reply is either spoken
//! back as-is or turned into a tool call (timers, conversions,
//! substitutions, recipe and video lookups). Results reach the browser UI
//! as named events over a WebSocket.
//!
//! Architecture:
//! - `intent` turns free-form model output into a tool invocation
//! - `dispatch` runs each command through oracle, tool, history and speech
//! - `timers` owns countdowns and a scheduler that reports ticks and expiry
//! - `server` routes events to the sockets of the session they belong to

mod cli;
mod config;
mod dispatch;
mod error;
mod events;
mod intent;
mod models;
mod server;
mod services;
mod session;
mod timers;
mod tools;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
