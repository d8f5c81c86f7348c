//! Markdown-to-HTML transform for bot replies.
//!
//! A small, fixed grammar rather than a full markdown parser. Inline rules
//! are an ordered table of (pattern, replacement) pairs; block layout then
//! splits the text into paragraphs, headings, and lists.
//!
//! The transform is applied to every streamed prefix of a reply, so a marker
//! that has not been closed yet (`**`, `*`, or a backtick) must stay literal
//! text. Every inline pattern therefore requires its closing delimiter.
//!
//! Backtick spans are lifted out before the table runs and restored as
//! `<code>` afterwards, so `*` inside code never pairs with emphasis outside.

use std::sync::LazyLock;

use regex::Regex;

/// One entry of the inline grammar.
struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: &'static str,
    /// Reapply until the text stops changing. Needed when adjacent matches
    /// share a boundary character.
    repeat: bool,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid format rule '{name}': {e}")),
            replacement,
            repeat: false,
        }
    }

    fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    fn apply(&self, text: String) -> String {
        let mut current = text;
        loop {
            let next = self
                .pattern
                .replace_all(&current, self.replacement)
                .into_owned();
            if !self.repeat || next == current {
                return next;
            }
            current = next;
        }
    }
}

/// Inline grammar, applied in order.
static GRAMMAR: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule::new("bold", r"\*\*(.+?)\*\*", "<b>$1</b>"),
        // A lone `*` touching another `*` is part of an unfinished `**`.
        Rule::new("italic", r"(^|[^*])\*([^*\n]+?)\*([^*]|$)", "$1<i>$2</i>$3").repeated(),
        Rule::new("heading3", r"(?m)^### (.*)$", "<h3>$1</h3>"),
        Rule::new("heading2", r"(?m)^## (.*)$", "<h2>$1</h2>"),
        Rule::new("heading1", r"(?m)^# (.*)$", "<h1>$1</h1>"),
        Rule::new("list_item", r"(?m)^- (.*)$", "<li>$1</li>"),
    ]
});

/// Delimits a lifted code span: `OPEN index CLOSE`. Private-use code points,
/// so no grammar rule can match them.
const CODE_OPEN: char = '\u{E000}';
const CODE_CLOSE: char = '\u{E001}';

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`\n]+)`").unwrap_or_else(|e| panic!("invalid code span pattern: {e}"))
});

static CODE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{E000}([0-9]+)\u{E001}")
        .unwrap_or_else(|e| panic!("invalid code placeholder pattern: {e}"))
});

/// Replace each closed backtick span with a numbered placeholder.
fn lift_code_spans(text: &str) -> (String, Vec<String>) {
    let mut spans = Vec::new();
    let lifted = CODE_SPAN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            spans.push(caps[1].to_string());
            format!("{CODE_OPEN}{}{CODE_CLOSE}", spans.len() - 1)
        })
        .into_owned();
    (lifted, spans)
}

fn restore_code_spans(text: &str, spans: &[String]) -> String {
    CODE_PLACEHOLDER
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|i| spans.get(i))
                .map(|code| format!("<code>{code}</code>"))
                .unwrap_or_default()
        })
        .into_owned()
}

/// Line prefixes that already form a block element.
const BLOCK_TAGS: [&str; 5] = ["<h1>", "<h2>", "<h3>", "<p>", "<ul>"];

/// Render raw reply text as HTML.
pub fn format_reply(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    let (lifted, code_spans) = lift_code_spans(&normalized);
    let inline = GRAMMAR.iter().fold(lifted, |text, rule| {
        let out = rule.apply(text);
        tracing::trace!(rule = rule.name, "format rule applied");
        out
    });
    render_blocks(&restore_code_spans(&inline, &code_spans))
}

fn render_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim_matches('\n');
        if paragraph.trim().is_empty() {
            continue;
        }
        render_paragraph(paragraph, &mut out);
    }
    out
}

fn render_paragraph(paragraph: &str, out: &mut String) {
    let mut inline: Vec<&str> = Vec::new();
    let mut items: Vec<&str> = Vec::new();

    for line in paragraph.lines() {
        if line.starts_with("<li>") {
            flush_inline(&mut inline, out);
            items.push(line);
        } else if BLOCK_TAGS.iter().any(|tag| line.starts_with(tag)) {
            flush_inline(&mut inline, out);
            flush_items(&mut items, out);
            out.push_str(line);
        } else {
            flush_items(&mut items, out);
            inline.push(line);
        }
    }

    flush_inline(&mut inline, out);
    flush_items(&mut items, out);
}

fn flush_inline(lines: &mut Vec<&str>, out: &mut String) {
    if lines.is_empty() {
        return;
    }
    out.push_str("<p>");
    out.push_str(&lines.join("<br/>"));
    out.push_str("</p>");
    lines.clear();
}

fn flush_items(items: &mut Vec<&str>, out: &mut String) {
    if items.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for item in items.iter() {
        out.push_str(item);
    }
    out.push_str("</ul>");
    items.clear();
}
