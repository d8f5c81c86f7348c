//! Session history command.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use pratai_core::backend::client::ChatBackend;

use crate::cli::chat::loop_runner::preview;
use crate::state::AppState;

/// Fetch and print the current session's history.
///
/// Unlike the chat loop, a backend failure here is an error.
pub async fn show_history(state: &AppState, limit: Option<u32>, json: bool) -> Result<()> {
    let store = state.open_store(None).await?;
    let session_id = store.state().session_id.clone();
    let limit = limit.unwrap_or(state.config.history_limit);

    let turns = store.backend().fetch_history(&session_id, limit).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No history for this session. Start with: {}",
            style("i").blue().bold(),
            style("prat chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("When").fg(Color::White),
        Cell::new("You").fg(Color::White),
        Cell::new("Prat.AI").fg(Color::White),
        Cell::new("Intent").fg(Color::White),
    ]);

    for (i, turn) in turns.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1).fg(Color::DarkGrey),
            Cell::new(&turn.timestamp).fg(Color::DarkGrey),
            Cell::new(preview(&turn.user_message, 40)).fg(Color::Green),
            Cell::new(preview(&turn.bot_response, 60)),
            Cell::new(turn.metadata.intent.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} turns in session {}",
        style(turns.len()).bold(),
        style(session_id.as_str()).dim()
    );
    println!();

    Ok(())
}
