use crate::types::Role;
use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet/quote prefixed headers with a colon or dash separator:
/// `User: ...`, `> Claude - ...`, `• You said： ...`, `Q: ...`
static BULLET_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*[>\-*•\[(]*\s*(?P<label>you said|chatgpt said|user|human|assistant|chatgpt|claude|q|a|question|answer)\s*(?::|：|-\s|–\s|—\s)\s*",
    )
    .expect("bullet header regex")
});

/// Markdown headers: `**User:**`, `### Assistant:`, `_Human:_`
static MARKDOWN_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*[#\s*_\-]*(?P<label>user|assistant|claude|you said|chatgpt said|human|q|a)\s*(?::|：)\s*",
    )
    .expect("markdown header regex")
});

/// Result of checking one line for a role header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLine<'a> {
    /// Canonical role, `None` when the line carries no header
    pub role: Option<Role>,
    /// Header-stripped remainder, or the untouched line when `role` is `None`
    pub text: &'a str,
}

/// Recognize a speaker-role header at the start of `line`.
///
/// Matching is line-local. On a match the remainder is taken from the trimmed
/// line, after the header and any whitespace that follows it.
#[must_use]
pub fn normalize_header(line: &str) -> HeaderLine<'_> {
    let candidate = line.trim();
    let captures = BULLET_HEADER
        .captures(candidate)
        .or_else(|| MARKDOWN_HEADER.captures(candidate));

    let Some(captures) = captures else {
        return HeaderLine {
            role: None,
            text: line,
        };
    };

    let (Some(whole), Some(label)) = (captures.get(0), captures.name("label")) else {
        return HeaderLine {
            role: None,
            text: line,
        };
    };

    match canonical_role(label.as_str()) {
        Some(role) => HeaderLine {
            role: Some(role),
            text: &candidate[whole.end()..],
        },
        None => HeaderLine {
            role: None,
            text: line,
        },
    }
}

fn canonical_role(label: &str) -> Option<Role> {
    match label.to_lowercase().as_str() {
        "you said" | "user" | "human" | "q" | "question" => Some(Role::User),
        "assistant" | "chatgpt" | "chatgpt said" | "claude" | "a" | "answer" => {
            Some(Role::Assistant)
        }
        _ => None,
    }
}
