//! Session info command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Print the session id and where local state lives. Makes no network calls.
pub async fn show_session(state: &AppState, json: bool) -> Result<()> {
    let store = state.open_store(None).await?;
    let current = store.state();

    if json {
        let info = serde_json::json!({
            "session_id": current.session_id.as_str(),
            "data_dir": state.data_dir.display().to_string(),
            "api_base_url": state.config.api_base_url,
            "delivery_mode": store.strategy().mode,
            "snapshot": store.snapshot(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("  {}  {}", style("Session:").bold(), current.session_id);
    println!("  {}  {}", style("Backend:").bold(), style(&state.config.api_base_url).dim());
    println!("  {}     {}", style("Mode:").bold(), style(store.strategy().mode).dim());
    println!("  {} {}", style("Data dir:").bold(), style(state.data_dir.display()).dim());
    if current.show_result && !current.recent_prompt.is_empty() {
        println!(
            "  {}   {}",
            style("Last:").bold(),
            style(&current.recent_prompt).dim()
        );
    }
    println!();
    Ok(())
}
