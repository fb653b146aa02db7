use crate::features::FeatureExtractor;
use emergence_transcript::Pair;
use std::collections::{HashMap, HashSet, VecDeque};

/// Motif usage observed in one assistant turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MotifUsage {
    pub latency: Option<usize>,
    pub used: usize,
}

/// Cross-turn memory of a single conversation.
///
/// Created empty for each conversation and dropped with it; pairs must be fed
/// in index order.
#[derive(Debug)]
pub(crate) struct ConversationSession {
    glyphs: HashSet<String>,
    motif_last_seen: HashMap<String, usize>,
    recent_assistant: VecDeque<String>,
    window: usize,
}

impl ConversationSession {
    pub(crate) fn new(window: usize) -> Self {
        Self {
            glyphs: HashSet::new(),
            motif_last_seen: HashMap::new(),
            recent_assistant: VecDeque::with_capacity(window),
            window,
        }
    }

    pub(crate) fn recent_assistant(&self) -> impl Iterator<Item = &str> {
        self.recent_assistant.iter().map(String::as_str)
    }

    /// Previous pair's user and assistant text followed by the recent window
    pub(crate) fn history_text(&self, previous: Option<&Pair>) -> String {
        let mut history = String::new();
        if let Some(previous) = previous {
            history.push_str(&previous.user);
            history.push(' ');
            history.push_str(&previous.assistant);
        }
        history.push(' ');
        history.push_str(&self.recent_assistant().collect::<Vec<_>>().join(" "));
        history
    }

    /// Add unseen symbol characters and exact-case motif tokens of `text` to
    /// the glyph memory, returning how many were new.
    pub(crate) fn record_glyphs(&mut self, fx: &FeatureExtractor, text: &str) -> usize {
        let mut new = 0;
        for ch in text.chars().filter(|ch| fx.lexicon().is_symbol(*ch)) {
            if self.glyphs.insert(ch.to_string()) {
                new += 1;
            }
        }
        for motif in fx.lexicon().motifs() {
            if text.contains(motif.token.as_str()) && self.glyphs.insert(motif.token.clone()) {
                new += 1;
            }
        }
        new
    }

    /// Update last-seen turns for every motif in `text`; the latency is the
    /// smallest gap among motifs seen before.
    pub(crate) fn record_motifs(
        &mut self,
        fx: &FeatureExtractor,
        text: &str,
        index: usize,
    ) -> MotifUsage {
        let used = fx.motifs_present(text);
        let mut latency: Option<usize> = None;
        for motif in &used {
            if let Some(last) = self.motif_last_seen.insert((*motif).to_string(), index) {
                let gap = index.saturating_sub(last);
                latency = Some(latency.map_or(gap, |best| best.min(gap)));
            }
        }
        MotifUsage {
            latency,
            used: used.len(),
        }
    }

    pub(crate) fn remember_assistant(&mut self, text: &str) {
        if self.recent_assistant.len() == self.window {
            self.recent_assistant.pop_front();
        }
        self.recent_assistant.push_back(text.to_string());
    }
}
