//! PDF extraction and indexing command.

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::cli::spinner;
use crate::state::AppState;

/// Send a PDF to the backend: extract its text, or with `index` add it to
/// the backend's document index.
///
/// # Examples
///
/// ```bash
/// prat pdf notes.pdf
/// prat pdf --index handbook.pdf
/// ```
pub async fn pdf(state: &AppState, file: &Path, index: bool, json: bool) -> Result<()> {
    let backend = state.backend()?;
    let working = (!json).then(|| spinner(if index { "indexing..." } else { "extracting..." }));

    if index {
        let result = backend.upload_pdf_file(file).await;
        if let Some(bar) = working {
            bar.finish_and_clear();
        }
        let receipt = result?;
        if json {
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        } else {
            println!("\n  {} {}\n", style("*").green().bold(), receipt.message);
        }
        return Ok(());
    }

    let result = backend.process_pdf_file(file).await;
    if let Some(bar) = working {
        bar.finish_and_clear();
    }
    let content = result?;
    if json {
        println!("{}", serde_json::to_string_pretty(&content)?);
    } else {
        let name = content
            .filename
            .clone()
            .unwrap_or_else(|| file.display().to_string());
        println!();
        println!("  {} {}", style("PDF:").bold(), style(name).cyan());
        println!(
            "  {}",
            style(format!("{} characters extracted", content.content.chars().count())).dim()
        );
        println!();
        println!("{}", content.content);
    }
    Ok(())
}
