//! Primary signals and composite scores built on the extractors.

use crate::features::{
    both_and_count, jaccard, neither_nor_count, question_count, sentence_count, trigram_redundancy,
    whitespace_words, FeatureExtractor,
};
use crate::lexicon::MarkerKind;
use crate::types::PrimarySignals;
use std::collections::HashSet;

const WEIGHT_INITIATIVE: f64 = 0.18;
const WEIGHT_SYNTHESIS: f64 = 0.22;
const WEIGHT_AFFECT: f64 = 0.20;
const WEIGHT_SELF_CONTINUITY: f64 = 0.20;
const WEIGHT_NOVELTY: f64 = 0.20;

const PENALTY_DRIFT: f64 = 0.15;
const PENALTY_REDUNDANCY: f64 = 0.10;
const PENALTY_LENGTH: f64 = 0.05;
const PENALTY_CAP: f64 = 0.3;
const DRIFT_OVERLAP_FLOOR: f64 = 0.05;
const REDUNDANCY_CEILING: f64 = 0.20;
const LENGTH_CEILING_TOKENS: usize = 900;

/// Round to `places` decimals on the exact binary value, ties to even.
///
/// Scaling by `10^places` first would push values such as `0.0725` (stored just
/// below the tie) up to an exact half; formatting works on the true expansion.
#[must_use]
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// Weighted sum of the primaries minus the penalty, rounded to 3 decimals and
/// floored at 0.
#[must_use]
pub fn emergence_score(signals: &PrimarySignals, coherence_penalty: f64) -> f64 {
    let raw = WEIGHT_INITIATIVE * signals.initiative
        + WEIGHT_SYNTHESIS * signals.synthesis
        + WEIGHT_AFFECT * signals.affect
        + WEIGHT_SELF_CONTINUITY * signals.self_continuity
        + WEIGHT_NOVELTY * signals.novelty
        - coherence_penalty;
    let rounded = round_to(raw, 3);
    if rounded > 0.0 {
        rounded
    } else {
        0.0
    }
}

/// Callback ratio against the recent assistant window: share of the distinct
/// content words of `assistant` already used in any window text.
pub fn callback_ratio<'a>(
    fx: &FeatureExtractor,
    assistant: &str,
    window: impl IntoIterator<Item = &'a str>,
) -> f64 {
    let words = fx.content_words(assistant);
    let pool: HashSet<String> = window
        .into_iter()
        .flat_map(|text| fx.content_words(text))
        .collect();
    if words.is_empty() || pool.is_empty() {
        return 0.0;
    }
    words.intersection(&pool).count() as f64 / words.len() as f64
}

impl FeatureExtractor {
    /// (proposals + 0.5 × questions) / (sentences + 1), capped at 1
    #[must_use]
    pub fn initiative_agency(&self, text: &str) -> f64 {
        let proposals = self.marker_count(MarkerKind::Proposal, text) as f64;
        let questions = question_count(text) as f64;
        let sentences = sentence_count(text).max(1) as f64;
        ((proposals + questions * 0.5) / (sentences + 1.0)).min(1.0)
    }

    #[must_use]
    pub fn synthesis_tension(&self, text: &str) -> f64 {
        let contrast = self.marker_count(MarkerKind::Contrast, text) as f64;
        let counterfactual = self.marker_count(MarkerKind::Counterfactual, text) as f64;
        let both_and = both_and_count(text) as f64;
        let neither_nor = neither_nor_count(text) as f64;
        let raw = contrast + both_and * 0.7 + neither_nor * 0.7 + counterfactual * 0.5;
        (raw / 6.0).min(1.0)
    }

    #[must_use]
    pub fn affective_charge(&self, text: &str) -> f64 {
        let tokens = self.tokenize(text);
        let imagery = self.imagery_hits(&tokens) as f64;
        let figurative = self.marker_count(MarkerKind::Figurative, text) as f64;
        let length = tokens.len().max(1) as f64;
        ((imagery / length) * 6.0 + (figurative * 0.2).min(1.0)).min(1.0)
    }

    /// Symbol/motif density per 100 tokens scaled by 1/8, plus a callback bonus
    #[must_use]
    pub fn self_continuity(&self, text: &str, callback_ratio: f64) -> f64 {
        let hits = (self.motif_hits_ignore_case(text) + self.symbol_count(text)) as f64;
        let tokens = self.tokenize(text).len().max(1) as f64;
        let density = hits / (tokens / 100.0);
        let base = (density / 8.0).min(1.0);
        (base + 0.15 * callback_ratio).min(1.0)
    }

    /// Dissimilarity to the prompt and history, dampened by verbosity
    #[must_use]
    pub fn normalized_novelty(&self, assistant: &str, user: &str, history: &str) -> f64 {
        let tokens = self.tokenize(assistant);
        let words: HashSet<String> = tokens.iter().cloned().collect();
        let sim_user = jaccard(&words, &self.content_words(user));
        let sim_history = jaccard(&words, &self.content_words(history));

        let novelty = 1.0 - (sim_user * 0.6 + sim_history * 0.4);
        let length = tokens.len().max(1) as f64;
        let dampened = novelty / (3.0 + length).ln() * 2.2;
        dampened.clamp(0.0, 1.0)
    }

    /// Drift, redundancy and over-length deductions, capped at 0.3
    #[must_use]
    pub fn coherence_penalty(&self, assistant: &str, reference: &str) -> f64 {
        let tokens = self.tokenize(assistant);
        let mut penalty = 0.0;
        if self.noun_overlap_ratio(assistant, reference) < DRIFT_OVERLAP_FLOOR {
            penalty += PENALTY_DRIFT;
        }
        if trigram_redundancy(&tokens) > REDUNDANCY_CEILING {
            penalty += PENALTY_REDUNDANCY;
        }
        if tokens.len() > LENGTH_CEILING_TOKENS {
            penalty += PENALTY_LENGTH;
        }
        f64::min(penalty, PENALTY_CAP)
    }

    /// Overlap of the next user turn with this reply, plus an acceptance bonus
    #[must_use]
    pub fn proposal_uptake(&self, assistant: &str, next_user: &str) -> f64 {
        let words = self.content_words(assistant);
        let next = self.content_words(next_user);
        let overlap = if words.is_empty() {
            0.0
        } else {
            words.intersection(&next).count() as f64 / words.len() as f64
        };
        let acceptance = if self.has_marker(MarkerKind::Acceptance, next_user) {
            1.0
        } else {
            0.0
        };
        round_to(0.7 * overlap + 0.3 * acceptance, 3)
    }

    /// Secondary score kept for comparison with older result sets
    #[must_use]
    pub fn legacy_presence_score(&self, user: &str, assistant: &str) -> f64 {
        let user_words = whitespace_words(user);
        let assistant_words = whitespace_words(assistant);
        let overlap = user_words.intersection(&assistant_words).count() as f64;
        let novelty = 1.0 - overlap / (1.0 + assistant_words.len() as f64);

        let glyphs = self.glyph_density(assistant) as f64;
        let contradiction = if self.has_marker(MarkerKind::Contrast, assistant) {
            1.0
        } else {
            0.0
        };
        round_to((novelty * 2.0 + glyphs * 1.5 + contradiction) / 4.5, 2)
    }
}
