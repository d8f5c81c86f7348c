//! CLI command definitions for the `prat` binary.

pub mod ask;
pub mod chat;
pub mod history;
pub mod pdf;
pub mod reset;
pub mod session;
pub mod status;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use indicatif::{ProgressBar, ProgressStyle};
use pratai_types::delivery::DeliveryMode;

/// Chat with a Prat.AI backend from the terminal.
#[derive(Parser)]
#[command(name = "prat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base URL (overrides config and PRATAI_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive chat.
    Chat {
        /// Attach a PDF whose text is sent with every prompt.
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Delivery mode: streaming, single_shot, or simulated.
        #[arg(long)]
        mode: Option<DeliveryMode>,
    },

    /// Send one prompt and print the reply.
    Ask {
        /// The prompt text.
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Attach a PDF whose text is sent with the prompt.
        #[arg(long, value_name = "FILE")]
        pdf: Option<PathBuf>,

        /// Delivery mode: streaming, single_shot, or simulated.
        #[arg(long)]
        mode: Option<DeliveryMode>,
    },

    /// Show the conversation history of the current session.
    History {
        /// Maximum number of turns to fetch.
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Delete the current session's history.
    Reset {
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Extract text from a PDF, or index it on the backend.
    Pdf {
        /// Path to the PDF file (max 10MB).
        file: PathBuf,

        /// Index the document server-side instead of extracting text.
        #[arg(long)]
        index: bool,
    },

    /// Show backend statistics.
    Stats,

    /// Trigger model training on the backend.
    Train,

    /// Show the session id and local data location.
    Session,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Steady-ticking spinner with a message, cleared by the caller.
pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
