//! Slash commands for the chat loop.
//!
//! Commands start with `/` and control the displayed turn, the session,
//! the delivery mode, and the attached PDF.

use console::style;
use pratai_types::delivery::DeliveryMode;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Clear the displayed turn, keeping history.
    New,
    /// Rotate to a fresh session id.
    NewSession,
    History,
    /// Redisplay a stored turn by its 1-based position.
    Show(usize),
    /// Delete this session's history on the backend.
    Reset,
    Mode(DeliveryMode),
    /// Attach the PDF at this path.
    Pdf(String),
    Detach,
    /// Unknown command or bad argument, with a message for the user.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (cmd, arg) = match trimmed.split_once(' ') {
        Some((cmd, arg)) => (cmd.to_lowercase(), arg.trim()),
        None => (trimmed.to_lowercase(), ""),
    };

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/new" => ChatCommand::New,
        "/session" | "/ns" => ChatCommand::NewSession,
        "/history" => ChatCommand::History,
        "/reset" => ChatCommand::Reset,
        "/detach" => ChatCommand::Detach,
        "/show" => match arg.parse::<usize>() {
            Ok(n) if n > 0 => ChatCommand::Show(n),
            _ => ChatCommand::Unknown("/show requires a turn number".to_string()),
        },
        "/mode" => match arg.parse::<DeliveryMode>() {
            Ok(mode) => ChatCommand::Mode(mode),
            Err(_) => ChatCommand::Unknown(
                "/mode requires streaming, single_shot, or simulated".to_string(),
            ),
        },
        "/pdf" => {
            if arg.is_empty() {
                ChatCommand::Unknown("/pdf requires a file path".to_string())
            } else {
                ChatCommand::Pdf(arg.to_string())
            }
        }
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
        ("/new", "Start a new turn (history is kept)"),
        ("/session", "Start a fresh session"),
        ("/history", "List this session's turns"),
        ("/show <n>", "Show turn n again"),
        ("/reset", "Delete this session's history"),
        ("/mode <mode>", "Switch delivery mode"),
        ("/pdf <path>", "Attach a PDF to every prompt"),
        ("/detach", "Drop the attached PDF"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (command, description) in rows {
        println!("  {:<14} {}", style(command).cyan(), description);
    }
    println!();
    println!("  {}", style("Ctrl+D to exit").dim());
    println!();
}
