//! One-shot prompt command.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};

use pratai_types::delivery::DeliveryMode;

use crate::cli::chat::renderer::{ChatRenderer, LivePrinter, print_reply_footer};
use crate::state::AppState;

/// Send one prompt in the current session and print the reply.
///
/// With `--json` the final conversation state is printed instead. A failed
/// delivery exits with an error after the fallback message is shown.
///
/// # Examples
///
/// ```bash
/// prat ask "What is WAL mode?"
/// prat ask --pdf report.pdf --mode single-shot "Summarize this"
/// ```
pub async fn ask(
    state: &AppState,
    prompt: &str,
    pdf: Option<&Path>,
    mode: Option<DeliveryMode>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut store = state.open_store(mode).await?;

    let attachment = match pdf {
        Some(path) => {
            let content = store
                .backend()
                .process_pdf_file(path)
                .await
                .with_context(|| format!("Could not read PDF '{}'", path.display()))?;
            Some(content.content)
        }
        None => None,
    };

    let interactive = !json && !quiet;
    let live = interactive && store.strategy().mode != DeliveryMode::SingleShot;
    let mut printer = LivePrinter::new(live, interactive);
    let started = Instant::now();

    store
        .submit(prompt, attachment.as_deref(), |s| printer.observe(s))
        .await?;

    let result = store.state();
    let failed = result.last_failed;

    if json {
        drop(printer);
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if quiet {
        drop(printer);
        if !failed {
            println!("{}", result.raw_response);
        }
    } else {
        printer.finish(result, &ChatRenderer::new());
        if !failed {
            print_reply_footer(result, started.elapsed());
        }
        println!();
    }

    if failed {
        anyhow::bail!("the backend did not deliver a reply");
    }
    Ok(())
}
