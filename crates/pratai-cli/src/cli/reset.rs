//! Session reset command.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;

use crate::state::AppState;

/// Delete the current session's history on the backend and locally.
pub async fn reset(state: &AppState, yes: bool, json: bool) -> Result<()> {
    let mut store = state.open_store(None).await?;
    let session_id = store.state().session_id.clone();

    if !yes && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all history for session {}?",
                style(session_id.as_str()).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let result = store.reset_session().await;

    if json {
        let output = match &result {
            Ok(receipt) => serde_json::json!({
                "session_id": session_id.as_str(),
                "reset": true,
                "receipt": receipt,
            }),
            Err(e) => serde_json::json!({
                "session_id": session_id.as_str(),
                "reset": false,
                "local_cleared": true,
                "error": e.to_string(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match result {
        Ok(receipt) => {
            let message = receipt
                .message
                .unwrap_or_else(|| "Session history deleted".to_string());
            println!("\n  {} {message}\n", style("*").green().bold());
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "\n  {} Local history was cleared, but the backend reset failed.\n",
                style("!").yellow().bold()
            );
            Err(e.into())
        }
    }
}
