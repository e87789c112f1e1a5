//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::config::ServiceConfig;

/// Sous - a conversational kitchen assistant
#[derive(Parser, Debug)]
#[command(name = "sous")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the web server and kitchen UI
    Serve {
        /// Address to bind
        #[arg(long, env = "SOUS_HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "5000")]
        port: u16,

        /// Open the UI in a browser
        #[arg(long)]
        open: bool,

        #[command(flatten)]
        config: ServiceConfig,
    },

    /// Run one command through the assistant and print what it produced
    Ask {
        /// What to ask
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,

        /// Session to keep history under
        #[arg(long, default_value = "cli")]
        session: String,

        /// Skip speech synthesis
        #[arg(long)]
        no_speech: bool,

        #[command(flatten)]
        config: ServiceConfig,
    },

    /// Show the tool invocation a reply would trigger, without any network access
    Extract {
        /// Reply text to inspect
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
}
