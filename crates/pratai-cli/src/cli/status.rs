//! Backend statistics and training commands.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use crate::cli::spinner;
use crate::state::AppState;

/// Show backend statistics.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = state.backend()?.stats().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("  {} Prat.AI backend", style("*").cyan().bold());
    println!("  {}", style(&state.config.api_base_url).dim());
    println!();
    print_value_table(&stats);
    println!();
    Ok(())
}

/// Ask the backend to retrain its model.
pub async fn train(state: &AppState, json: bool) -> Result<()> {
    let working = (!json).then(|| spinner("training..."));
    let result = state.backend()?.train().await;
    if let Some(bar) = working {
        bar.finish_and_clear();
    }
    let outcome = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("  {} Training finished", style("*").green().bold());
    print_value_table(&outcome);
    println!();
    Ok(())
}

/// Print a JSON object as a key/value table. Other values print as JSON.
fn print_value_table(value: &serde_json::Value) {
    let Some(object) = value.as_object() else {
        println!("  {value}");
        return;
    };
    if object.is_empty() {
        println!("  {}", style("(no data)").dim());
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);
    for (key, value) in object {
        table.add_row(vec![
            Cell::new(key).fg(Color::Cyan),
            Cell::new(display_value(value)),
        ]);
    }
    println!("{table}");
}

fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}
