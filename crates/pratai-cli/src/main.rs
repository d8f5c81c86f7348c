//! Prat.AI terminal client entry point.
//!
//! Binary name: `prat`
//!
//! Parses CLI arguments, sets up logging, loads configuration and the local
//! database, then dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,pratai=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "prat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.api_url.clone()).await?;

    match cli.command {
        Commands::Chat { pdf, mode } => {
            cli::chat::loop_runner::run_chat_loop(&state, pdf.as_deref(), mode).await?;
        }

        Commands::Ask { prompt, pdf, mode } => {
            cli::ask::ask(&state, &prompt.join(" "), pdf.as_deref(), mode, cli.json, cli.quiet)
                .await?;
        }

        Commands::History { limit } => {
            cli::history::show_history(&state, limit, cli.json).await?;
        }

        Commands::Reset { yes } => {
            cli::reset::reset(&state, yes, cli.json).await?;
        }

        Commands::Pdf { file, index } => {
            cli::pdf::pdf(&state, &file, index, cli.json).await?;
        }

        Commands::Stats => {
            cli::status::stats(&state, cli.json).await?;
        }

        Commands::Train => {
            cli::status::train(&state, cli.json).await?;
        }

        Commands::Session => {
            cli::session::show_session(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
