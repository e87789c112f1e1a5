//! CLI command execution.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast::error::TryRecvError;

use crate::config::ServiceConfig;
use crate::dispatch::{Dispatcher, DispatcherOptions};
use crate::events::EventBus;
use crate::intent;
use crate::server::{self, ServerOptions};
use crate::services::Collaborators;
use crate::session::SessionStore;
use crate::timers::TimerRegistry;

use super::args::{Cli, Commands};

pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            host,
            port,
            open,
            config,
        } => {
            let options = ServerOptions {
                host,
                port,
                open_browser: open,
            };
            server::start_server(options, &config).await
        }
        Commands::Ask {
            message,
            session,
            no_speech,
            config,
        } => ask(&message.join(" "), &session, !no_speech, &config).await,
        Commands::Extract { text } => extract(&text.join(" ")),
    }
}

/// Run one command without a socket and print the reply and its events.
async fn ask(message: &str, session_id: &str, speech: bool, config: &ServiceConfig) -> Result<()> {
    let collaborators =
        Collaborators::from_config(config).context("Failed to build HTTP client")?;
    let events = EventBus::new();
    let mut rx = events.subscribe();

    let dispatcher = Dispatcher::new(
        collaborators,
        Arc::new(TimerRegistry::new()),
        Arc::new(SessionStore::new()),
        events,
        DispatcherOptions {
            voice: config.voice.clone(),
            max_concurrent_commands: 1,
            speech,
        },
    );

    let report = dispatcher.handle_command(session_id, message).await;
    println!("{}", report.reply);
    if let Some(tool) = &report.tool {
        println!("(tool: {tool})");
    }

    loop {
        match rx.try_recv() {
            Ok(envelope) => {
                let json = serde_json::to_string(&envelope.event)
                    .context("Failed to serialize event")?;
                println!("{json}");
            }
            Err(TryRecvError::Lagged(skipped)) => {
                eprintln!("({skipped} events dropped)");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    Ok(())
}

fn extract(text: &str) -> Result<()> {
    let invocation = intent::extract(text);
    let json = serde_json::to_string_pretty(&invocation).context("Failed to serialize invocation")?;
    println!("{json}");
    Ok(())
}
