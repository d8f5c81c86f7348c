//! Terminal rendering of replies.
//!
//! `ChatRenderer` combines `termimad` for prose and `syntect` for fenced
//! code. `LivePrinter` follows a turn in progress: it spins while the reply
//! is pending, prints streamed text as it grows, and swaps in the rendered
//! reply once the turn completes.

use std::io::Write;
use std::time::Duration;

use console::{Term, measure_text_width, style};
use indicatif::ProgressBar;
use pratai_core::store::ConversationState;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;
use termimad::MadSkin;

/// Label printed before each reply.
pub const BOT_LABEL: &str = "Prat.AI";

/// Terminal markdown renderer with syntax highlighting.
pub struct ChatRenderer {
    skin: MadSkin,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl ChatRenderer {
    pub fn new() -> Self {
        let mut skin = MadSkin::default_dark();
        skin.bold.set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[0].set_fg(termimad::crossterm::style::Color::Cyan);
        skin.headers[1].set_fg(termimad::crossterm::style::Color::Cyan);
        skin.inline_code
            .set_fg(termimad::crossterm::style::Color::Yellow);

        Self {
            skin,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    /// Render a complete markdown reply. Fenced code goes through syntect,
    /// everything else through termimad.
    pub fn render_final(&self, markdown: &str) -> String {
        let mut output = String::new();
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buf = String::new();

        for line in markdown.lines() {
            if line.starts_with("```") {
                if in_code_block {
                    in_code_block = false;
                    output.push_str(&self.highlight_code(&code_buf, &code_lang));
                    output.push('\n');
                } else {
                    in_code_block = true;
                    code_lang = line.trim_start_matches('`').trim().to_string();
                    code_buf.clear();
                }
            } else if in_code_block {
                code_buf.push_str(line);
                code_buf.push('\n');
            } else {
                output.push_str(&self.skin.term_text(line).to_string());
            }
        }

        if in_code_block && !code_buf.is_empty() {
            output.push_str(&self.highlight_code(&code_buf, &code_lang));
        }

        output
    }

    fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = if lang.is_empty() {
            self.syntax_set.find_syntax_plain_text()
        } else {
            self.syntax_set
                .find_syntax_by_token(lang)
                .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
        };

        let mut output = String::new();
        output.push_str(&format!("  {}\n", style(format!("--- {lang} ---")).dim()));

        let Some(theme) = self.theme_set.themes.get("base16-ocean.dark") else {
            for line in code.lines() {
                output.push_str(&format!("  {line}\n"));
            }
            return output;
        };
        let mut h = HighlightLines::new(syntax, theme);

        for line in code.lines() {
            let ranges: Vec<(Style, &str)> = h
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_default();
            let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
            output.push_str(&format!("  {escaped}\x1b[0m\n"));
        }

        output
    }
}

impl Default for ChatRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal rows taken by `text` at `columns` width, one row minimum per line.
pub fn rows_used(text: &str, columns: usize) -> usize {
    let columns = columns.max(1);
    text.split('\n')
        .map(|line| measure_text_width(line).div_ceil(columns).max(1))
        .sum()
}

/// How newly accumulated text relates to what is already on screen.
#[derive(Debug, PartialEq, Eq)]
pub enum Delta<'a> {
    Unchanged,
    /// Print this suffix after the existing text.
    Append(&'a str),
    /// The text no longer extends what was printed; print it afresh.
    Restart(&'a str),
}

pub fn delta<'a>(printed: &str, accumulated: &'a str) -> Delta<'a> {
    match accumulated.strip_prefix(printed) {
        Some("") => Delta::Unchanged,
        Some(suffix) => Delta::Append(suffix),
        None => Delta::Restart(accumulated),
    }
}

/// Follows one turn on the terminal.
///
/// Live text is printed raw as it grows. When the turn completes on a
/// terminal, the raw text is erased and the reply rendered as markdown.
pub struct LivePrinter {
    spinner: Option<ProgressBar>,
    printed: String,
    /// Everything written since the label, for erasing the live text.
    shown: String,
    live: bool,
    started: bool,
}

impl LivePrinter {
    /// `live` prints increments as they arrive. Without it the reply is only
    /// shown once finished. `spinner` shows a progress spinner until the
    /// first output.
    pub fn new(live: bool, spinner: bool) -> Self {
        let spinner = spinner.then(|| crate::cli::spinner("thinking..."));
        Self {
            spinner,
            printed: String::new(),
            shown: String::new(),
            live,
            started: false,
        }
    }

    /// Store observer: print growth of the in-flight reply.
    pub fn observe(&mut self, state: &ConversationState) {
        if !self.live || !state.loading || state.raw_response.is_empty() {
            return;
        }
        self.print_growth(&state.raw_response);
    }

    /// Print the outcome of the finished turn.
    pub fn finish(&mut self, state: &ConversationState, renderer: &ChatRenderer) {
        self.stop_spinner();
        let reply = state.raw_response.as_str();

        if state.last_failed {
            if self.started {
                println!();
            }
            eprintln!("\n  {} {}", style("!").red().bold(), style(reply).red());
            return;
        }

        if !self.printed.is_empty() {
            self.print_growth(reply);
            println!();
            if !self.erase_live_text() {
                return;
            }
            println!("  {}", style(BOT_LABEL).cyan().bold());
        } else {
            self.print_label();
        }
        println!("{}", renderer.render_final(reply).trim_end());
    }

    /// Clear the raw live text. Returns `false` when output is not a
    /// terminal and the text has to stay.
    fn erase_live_text(&mut self) -> bool {
        let term = Term::stdout();
        if !term.is_term() {
            return false;
        }
        let (_, columns) = term.size();
        let rows = rows_used(&self.shown, usize::from(columns));
        self.shown.clear();
        term.clear_last_lines(rows).is_ok()
    }

    fn print_growth(&mut self, accumulated: &str) {
        match delta(&self.printed, accumulated) {
            Delta::Unchanged => return,
            Delta::Append(suffix) => {
                self.print_label();
                print!("{suffix}");
                self.shown.push_str(suffix);
            }
            Delta::Restart(text) => {
                if self.started {
                    let marker = format!("  {}", style("(retrying without streaming)").dim());
                    println!();
                    println!("{marker}");
                    self.shown.push('\n');
                    self.shown.push_str(&marker);
                    self.shown.push('\n');
                }
                self.print_label();
                print!("{text}");
                self.shown.push_str(text);
            }
        }
        let _ = std::io::stdout().flush();
        self.printed = accumulated.to_string();
    }

    fn print_label(&mut self) {
        if self.started {
            return;
        }
        self.stop_spinner();
        let label = format!("  {} ", style(BOT_LABEL).cyan().bold());
        print!("\n{label}");
        self.shown.push_str(&label);
        self.started = true;
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

impl Drop for LivePrinter {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

/// Print mode, fallback, and metadata details after a reply.
pub fn print_reply_footer(state: &ConversationState, elapsed: Duration) {
    let mut parts = vec![format!("{:.1}s", elapsed.as_secs_f64())];
    if let Some(mode) = state.last_mode {
        parts.push(mode.to_string());
    }
    if let Some(response_type) = &state.metadata.response_type {
        parts.push(response_type.clone());
    }
    if let Some(intent) = &state.metadata.intent {
        match state.metadata.confidence {
            Some(confidence) => parts.push(format!("{intent} ({confidence:.2})")),
            None => parts.push(intent.clone()),
        }
    }
    if let Some(sentiment) = &state.metadata.sentiment {
        parts.push(sentiment.clone());
    }
    println!(
        "  {} {}",
        style("|").dim(),
        style(parts.join(" \u{00b7} ")).dim()
    );
}
