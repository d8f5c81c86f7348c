//! Main chat loop orchestration.
//!
//! Opens the conversation store, loads history, prints the banner, then
//! reads prompts and slash commands until the user exits.

use std::path::Path;
use std::time::Instant;

use console::style;
use tracing::{debug, info};

use pratai_infra::http::HttpBackend;
use pratai_types::chat::Turn;
use pratai_types::delivery::DeliveryMode;
use pratai_types::error::SubmitError;

use crate::cli::spinner;
use crate::state::{AppState, ConcreteStore};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::{BOT_LABEL, ChatRenderer, LivePrinter, print_reply_footer};

/// Extracted PDF text sent along with every prompt.
struct AttachedPdf {
    name: String,
    content: String,
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(
    state: &AppState,
    pdf: Option<&Path>,
    mode: Option<DeliveryMode>,
) -> anyhow::Result<()> {
    let mut store = state.open_store(mode).await?;

    let loading = spinner("loading history...");
    store.load_history().await;
    loading.finish_and_clear();

    let mut attached = match pdf {
        Some(path) => attach_pdf(store.backend(), path).await,
        None => None,
    };

    print_welcome_banner(
        &store.state().session_id,
        store.strategy().mode,
        &state.config.api_base_url,
        store.state().history.len(),
        attached.as_ref().map(|p| p.name.as_str()),
    );

    let renderer = ChatRenderer::new();
    print_restored(&store, &renderer);

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => {
                    println!("\n  {}", style("Session ended.").dim());
                    break;
                }
                ChatCommand::New => {
                    store.start_new_turn().await;
                    println!("\n  {} New turn. History is kept.\n", style("*").cyan().bold());
                }
                ChatCommand::NewSession => {
                    store.begin_new_session().await;
                    println!(
                        "\n  {} New session {}\n",
                        style("*").cyan().bold(),
                        style(store.state().session_id.as_str()).dim()
                    );
                }
                ChatCommand::History => print_history(&store.state().history),
                ChatCommand::Show(n) => show_turn(&mut store, n, &renderer),
                ChatCommand::Reset => {
                    if chat_input
                        .confirm("Delete this session's history?", &prompt)
                        .await
                    {
                        match store.reset_session().await {
                            Ok(_) => println!(
                                "\n  {} Session history deleted.\n",
                                style("*").cyan().bold()
                            ),
                            Err(e) => eprintln!(
                                "\n  {} Backend reset failed: {e}. Local history was cleared.\n",
                                style("!").yellow().bold()
                            ),
                        }
                    } else {
                        println!("  {}", style("Cancelled.").dim());
                    }
                }
                ChatCommand::Mode(mode) => {
                    store.set_delivery_mode(mode);
                    println!("\n  {} Delivery mode: {mode}\n", style("*").cyan().bold());
                }
                ChatCommand::Pdf(path) => {
                    if let Some(pdf) = attach_pdf(store.backend(), Path::new(&path)).await {
                        println!(
                            "\n  {} Attached {} ({} chars)\n",
                            style("*").cyan().bold(),
                            style(&pdf.name).bold(),
                            pdf.content.chars().count()
                        );
                        attached = Some(pdf);
                    }
                }
                ChatCommand::Detach => {
                    if attached.take().is_some() {
                        println!("\n  {} PDF detached.\n", style("*").cyan().bold());
                    } else {
                        println!("\n  {}\n", style("No PDF attached.").dim());
                    }
                }
                ChatCommand::Unknown(message) => {
                    println!(
                        "\n  {} Unknown command: {}. Type /help for available commands.\n",
                        style("?").yellow().bold(),
                        style(message).dim()
                    );
                }
            }
            continue;
        }

        if text.is_empty() {
            continue;
        }

        send_turn(
            &mut store,
            &text,
            attached.as_ref().map(|p| p.content.as_str()),
            &renderer,
        )
        .await;
    }

    info!(session_id = %store.state().session_id, "Chat ended");
    Ok(())
}

async fn send_turn(
    store: &mut ConcreteStore,
    text: &str,
    attachment: Option<&str>,
    renderer: &ChatRenderer,
) {
    let live = store.strategy().mode != DeliveryMode::SingleShot;
    let mut printer = LivePrinter::new(live, true);
    let started = Instant::now();

    match store
        .submit(text, attachment, |state| printer.observe(state))
        .await
    {
        Ok(()) => {
            let state = store.state();
            printer.finish(state, renderer);
            if !state.last_failed {
                print_reply_footer(state, started.elapsed());
            }
            println!();
        }
        Err(SubmitError::Busy) => {
            debug!("Prompt rejected while a reply is in progress");
        }
        Err(e) => {
            println!("\n  {} {e}\n", style("!").yellow().bold());
        }
    }
}

/// Extract the PDF's text through the backend, reporting failures inline.
async fn attach_pdf(backend: &HttpBackend, path: &Path) -> Option<AttachedPdf> {
    let working = spinner("reading PDF...");
    let result = backend.process_pdf_file(path).await;
    working.finish_and_clear();

    match result {
        Ok(pdf) => {
            let name = pdf.filename.unwrap_or_else(|| {
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            });
            Some(AttachedPdf {
                name,
                content: pdf.content,
            })
        }
        Err(e) => {
            eprintln!("\n  {} {e}\n", style("!").red().bold());
            None
        }
    }
}

fn print_restored(store: &ConcreteStore, renderer: &ChatRenderer) {
    let state = store.state();
    if let Some(index) = state.displayed_turn {
        if let Some(turn) = state.history.get(index) {
            print_turn(index + 1, turn, renderer);
        }
    } else if state.show_result && !state.recent_prompt.is_empty() {
        println!(
            "  {} {}\n",
            style("Last prompt:").dim(),
            style(&state.recent_prompt).dim()
        );
    }
}

fn show_turn(store: &mut ConcreteStore, n: usize, renderer: &ChatRenderer) {
    let Some(prompt) = store
        .state()
        .history
        .get(n - 1)
        .map(|turn| turn.user_message.clone())
    else {
        println!("\n  {} No turn {n}.\n", style("?").yellow().bold());
        return;
    };

    // Turns are matched by prompt text, so a repeated prompt shows its first turn.
    if store.select_turn(&prompt) {
        let state = store.state();
        if let Some(index) = state.displayed_turn {
            if let Some(turn) = state.history.get(index) {
                print_turn(index + 1, turn, renderer);
            }
        }
    }
}

fn print_turn(position: usize, turn: &Turn, renderer: &ChatRenderer) {
    println!(
        "  {} {}",
        style(format!("#{position} You")).green().bold(),
        turn.user_message
    );
    println!("\n  {}", style(BOT_LABEL).cyan().bold());
    println!("{}", renderer.render_final(&turn.bot_response).trim_end());
    println!();
}

fn print_history(history: &[Turn]) {
    println!();
    if history.is_empty() {
        println!("  {}", style("No turns yet.").dim());
    }
    for (i, turn) in history.iter().enumerate() {
        println!(
            "  {} {}",
            style(format!("{:>3}.", i + 1)).dim(),
            preview(&turn.user_message, 80)
        );
    }
    println!();
}

/// First `max` characters of `text` on one line.
pub(crate) fn preview(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > max {
        let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        flat
    }
}
