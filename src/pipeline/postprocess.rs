//! Post-processing: deterministic cleanup of model-generated brand copy.
//!
//! The copy ends up in a plain-text file and on a PDF page drawn with a
//! standard font, so Markdown decoration and model quirks have to go:
//!
//! - Completion models sometimes echo the prompt before answering
//! - Chat models wrap answers in ```` ``` ```` fences or use `**bold**`
//! - Windows line endings, trailing spaces and runs of blank lines
//! - Zero-width characters that render as boxes in the PDF
//!
//! Each rule is a small pure function so it can be tested on its own.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF → LF)
/// 2. Strip an echoed copy of the prompt
/// 3. Strip outer code fences
/// 4. Drop heading markers and emphasis, normalise bullets to `- `
/// 5. Trim trailing whitespace per line
/// 6. Collapse runs of blank lines to one
/// 7. Strip invisible Unicode
/// 8. Trim the whole text
pub fn clean_copy(raw: &str, prompt: &str) -> String {
    let s = normalise_line_endings(raw);
    let s = strip_prompt_echo(&s, prompt);
    let s = strip_code_fences(&s);
    let s = strip_markdown(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Strip prompt echo ────────────────────────────────────────────────

fn strip_prompt_echo(input: &str, prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return input.to_string();
    }
    match input.trim_start().strip_prefix(prompt) {
        Some(rest) => rest.to_string(),
        None => input.to_string(),
    }
}

// ── Rule 3: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[a-zA-Z]*\n(.*?)\n?```$").unwrap());

fn strip_code_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 4: Markdown decoration ──────────────────────────────────────────────

static RE_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]+").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*|__(.+?)__").unwrap());
static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[*•+][ \t]+").unwrap());

fn strip_markdown(input: &str) -> String {
    let s = RE_HEADING.replace_all(input, "");
    let s = RE_BOLD.replace_all(&s, |caps: &regex::Captures<'_>| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map_or(String::new(), |m| m.as_str().to_string())
    });
    RE_BULLET.replace_all(&s, "$1- ").into_owned()
}

// ── Rule 5: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 6: Collapse blank lines ─────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 7: Invisible characters ─────────────────────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'))
        .collect()
}
