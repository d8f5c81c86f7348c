//! Welcome banner for chat sessions.

use console::style;
use pratai_types::chat::SessionId;
use pratai_types::delivery::DeliveryMode;

/// Print the banner shown when the chat starts.
pub fn print_welcome_banner(
    session_id: &SessionId,
    mode: DeliveryMode,
    api_url: &str,
    history_len: usize,
    pdf_name: Option<&str>,
) {
    let id = session_id.as_str();

    println!();
    println!("  {} {}", style("*").cyan(), style("Prat.AI").cyan().bold());
    println!("  {}", style("Ask anything. Attach a PDF for document questions.").dim());
    println!();
    println!("  {}  {}", style("Backend:").bold(), style(api_url).dim());
    println!("  {}     {}", style("Mode:").bold(), style(mode).dim());
    println!(
        "  {}  {}",
        style("Session:").bold(),
        style(&id[..8.min(id.len())]).dim()
    );
    if history_len > 0 {
        println!(
            "  {}  {}",
            style("History:").bold(),
            style(format!("{history_len} previous turns")).dim()
        );
    }
    if let Some(name) = pdf_name {
        println!("  {}      {}", style("PDF:").bold(), style(name).dim());
    }
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
