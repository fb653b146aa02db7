use crate::header::normalize_header;
use crate::pairs::build_pairs;
use crate::types::{Pair, Role, Segmentation, SegmentationStrategy, Turn};
use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n+").expect("blank line regex"));

/// Split a transcript into turns.
///
/// Header-based segmentation is attempted first. If no turn ends up carrying
/// a `User` or `Assistant` role, that result is discarded entirely and the text
/// is re-split into blank-line separated blocks with alternating roles,
/// starting with `User`.
#[must_use]
pub fn segment(text: &str) -> Segmentation {
    let normalized = text.replace("\r\n", "\n");

    let turns = segment_by_headers(&normalized);
    if turns.iter().any(|turn| turn.role.is_labeled()) {
        log::debug!("Header-labeled segmentation: {} turns", turns.len());
        return Segmentation {
            strategy: SegmentationStrategy::HeaderLabeled,
            turns,
        };
    }

    let turns = segment_by_alternation(&normalized);
    log::debug!(
        "No role headers recognized, falling back to blank-line alternation: {} blocks",
        turns.len()
    );
    Segmentation {
        strategy: SegmentationStrategy::Alternation,
        turns,
    }
}

/// Segment and pair in one step.
#[must_use]
pub fn segment_pairs(text: &str) -> (SegmentationStrategy, Vec<Pair>) {
    let segmentation = segment(text);
    let pairs = build_pairs(&segmentation.turns);
    (segmentation.strategy, pairs)
}

fn segment_by_headers(text: &str) -> Vec<Turn> {
    let mut builder = TurnBuilder::default();
    for raw in text.split('\n') {
        let header = normalize_header(raw);
        match header.role {
            Some(role) => builder.start(role, header.text),
            None => builder.push_line(raw),
        }
    }
    builder.finish()
}

fn segment_by_alternation(text: &str) -> Vec<Turn> {
    BLANK_LINE_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .enumerate()
        .map(|(position, block)| {
            let role = if position % 2 == 0 {
                Role::User
            } else {
                Role::Assistant
            };
            Turn::new(role, block)
        })
        .collect()
}

/// Accumulates lines of the current turn until the next header.
struct TurnBuilder {
    role: Role,
    lines: Vec<String>,
    turns: Vec<Turn>,
}

impl Default for TurnBuilder {
    fn default() -> Self {
        Self {
            role: Role::Unlabeled,
            lines: Vec::new(),
            turns: Vec::new(),
        }
    }
}

impl TurnBuilder {
    fn start(&mut self, role: Role, first_line: &str) {
        self.flush();
        self.role = role;
        self.lines.push(first_line.to_string());
    }

    fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn flush(&mut self) {
        let joined = self.lines.join("\n");
        let text = joined.trim();
        if !text.is_empty() {
            self.turns.push(Turn::new(self.role, text));
        }
        self.lines.clear();
    }

    fn finish(mut self) -> Vec<Turn> {
        self.flush();
        self.turns
    }
}
