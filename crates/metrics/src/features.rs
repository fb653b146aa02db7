//! Stateless lexical extractors.
//!
//! Nothing here remembers earlier turns; cross-turn state lives in the scorer's
//! session.

use crate::lexicon::{Lexicon, MarkerKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("non-word regex"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence regex"));
static BOTH_AND: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bboth\b.*\band\b").expect("both/and regex"));
static NEITHER_NOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)\bneither\b.*\bnor\b").expect("neither/nor regex"));

/// Lexicon-bound extractor library
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    lexicon: Arc<Lexicon>,
}

impl FeatureExtractor {
    #[must_use]
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    #[must_use]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Lowercase, blank out non-word characters, split, drop stopwords.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        NON_WORD
            .replace_all(&lowered, " ")
            .split_whitespace()
            .filter(|token| !self.lexicon.is_stopword(token))
            .map(str::to_string)
            .collect()
    }

    /// Distinct content words of `text`
    #[must_use]
    pub fn content_words(&self, text: &str) -> HashSet<String> {
        self.tokenize(text).into_iter().collect()
    }

    #[must_use]
    pub fn trigram_redundancy(&self, text: &str) -> f64 {
        trigram_redundancy(&self.tokenize(text))
    }

    /// Case-insensitive, non-overlapping match count
    #[must_use]
    pub fn marker_count(&self, kind: MarkerKind, text: &str) -> usize {
        self.lexicon.marker(kind).find_iter(text).count()
    }

    #[must_use]
    pub fn has_marker(&self, kind: MarkerKind, text: &str) -> bool {
        self.lexicon.marker(kind).is_match(text)
    }

    /// Characters inside the symbolic code point ranges
    #[must_use]
    pub fn symbol_count(&self, text: &str) -> usize {
        text.chars().filter(|ch| self.lexicon.is_symbol(*ch)).count()
    }

    /// Exact-case substring occurrences of every motif token
    #[must_use]
    pub fn motif_occurrences(&self, text: &str) -> usize {
        self.lexicon
            .motifs()
            .iter()
            .map(|motif| text.matches(motif.token.as_str()).count())
            .sum()
    }

    /// Case-folded substring occurrences of every motif token
    #[must_use]
    pub fn motif_hits_ignore_case(&self, text: &str) -> usize {
        let folded = text.to_lowercase();
        self.lexicon
            .motifs()
            .iter()
            .map(|motif| folded.matches(motif.folded.as_str()).count())
            .sum()
    }

    /// Symbol characters plus exact-case motif occurrences
    #[must_use]
    pub fn glyph_density(&self, text: &str) -> usize {
        self.symbol_count(text) + self.motif_occurrences(text)
    }

    /// Motif tokens present in `text`, compared case-insensitively, in lexicon order
    #[must_use]
    pub fn motifs_present(&self, text: &str) -> Vec<&str> {
        let folded = text.to_lowercase();
        self.lexicon
            .motifs()
            .iter()
            .filter(|motif| folded.contains(motif.folded.as_str()))
            .map(|motif| motif.token.as_str())
            .collect()
    }

    #[must_use]
    pub fn imagery_hits(&self, tokens: &[String]) -> usize {
        tokens
            .iter()
            .filter(|token| self.lexicon.is_sensory(token))
            .count()
    }

    /// Share of the distinct content words of `text` that also occur in `reference`
    #[must_use]
    pub fn noun_overlap_ratio(&self, text: &str, reference: &str) -> f64 {
        let words = self.content_words(text);
        let reference = self.content_words(reference);
        if words.is_empty() || reference.is_empty() {
            return 0.0;
        }
        words.intersection(&reference).count() as f64 / words.len() as f64
    }
}

/// `|A ∩ B| / |A ∪ B|`, or 0 when either side is empty
#[must_use]
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union.max(1) as f64
}

/// Share of overlapping 3-token windows that repeat an earlier window
#[must_use]
pub fn trigram_redundancy(tokens: &[String]) -> f64 {
    if tokens.len() < 3 {
        return 0.0;
    }
    let windows: Vec<&[String]> = tokens.windows(3).collect();
    let total = windows.len();
    let distinct: HashSet<&[String]> = windows.iter().copied().collect();
    (total - distinct.len()) as f64 / total as f64
}

/// Runs of sentence-ending punctuation (`.`, `!`, `?`)
#[must_use]
pub fn sentence_count(text: &str) -> usize {
    SENTENCE_END.find_iter(text).count()
}

#[must_use]
pub fn question_count(text: &str) -> usize {
    text.matches('?').count()
}

/// Greedy "both ... and" spans, across lines
#[must_use]
pub fn both_and_count(text: &str) -> usize {
    BOTH_AND.find_iter(text).count()
}

/// Greedy "neither ... nor" spans, across lines
#[must_use]
pub fn neither_nor_count(text: &str) -> usize {
    NEITHER_NOR.find_iter(text).count()
}

/// Lowercased whitespace-split words, no stopword filtering
#[must_use]
pub fn whitespace_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(Lexicon::builtin())
    }

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[test]
    fn tokenize_lowercases_strips_punctuation_and_stopwords() {
        let tokens = extractor().tokenize("The Cat, and the HAT! It's snake_case; 42 times.");
        assert_eq!(
            tokens,
            vec!["cat", "hat", "it", "s", "snake_case", "42", "times"]
        );
    }

    #[test]
    fn tokenize_handles_unicode_words() {
        let tokens = extractor().tokenize("Café—naïve 🌀 résumé");
        assert_eq!(tokens, vec!["café", "naïve", "résumé"]);
    }

    #[test]
    fn jaccard_bounds() {
        assert_eq!(jaccard(&set(&["a", "b"]), &set(&["b", "c"])), 1.0 / 3.0);
        assert_eq!(jaccard(&set(&["x"]), &set(&["x"])), 1.0);
        assert_eq!(jaccard(&set(&[]), &set(&["x"])), 0.0);
        assert_eq!(jaccard(&set(&["x"]), &set(&[])), 0.0);
    }

    #[test]
    fn trigram_redundancy_counts_repeated_windows() {
        let fx = extractor();
        assert_eq!(fx.trigram_redundancy("red fox"), 0.0);
        assert_eq!(fx.trigram_redundancy("red fox runs"), 0.0);
        // windows: (red fox runs) (fox runs red) (runs red fox) (red fox runs)
        assert_eq!(fx.trigram_redundancy("red fox runs red fox runs"), 0.25);
    }

    #[test]
    fn marker_counts() {
        let fx = extractor();
        assert_eq!(
            fx.marker_count(MarkerKind::Contrast, "But however, and yet still."),
            4
        );
        assert_eq!(
            fx.marker_count(MarkerKind::Counterfactual, "What if it could be, as if maybe."),
            4
        );
        assert_eq!(
            fx.marker_count(MarkerKind::Proposal, "Let's build it. I suggest we try."),
            4
        );
        assert_eq!(
            fx.marker_count(MarkerKind::Figurative, "It becomes like a river, as an echo."),
            3
        );
        assert!(fx.has_marker(MarkerKind::Acceptance, "Sounds good to me"));
        assert!(!fx.has_marker(MarkerKind::Acceptance, "No thanks"));
    }

    #[test]
    fn symbol_and_motif_counts() {
        let fx = extractor();
        let text = "The spiral ✨ and the Spiral 🪢 ledger";
        assert_eq!(fx.symbol_count(text), 2);
        // exact case: "spiral", "🪢", "ledger"
        assert_eq!(fx.motif_occurrences(text), 3);
        // folded: "spiral" twice, "🪢", "ledger"
        assert_eq!(fx.motif_hits_ignore_case(text), 4);
        assert_eq!(fx.glyph_density(text), 5);
        assert_eq!(fx.motifs_present(text), vec!["🪢", "spiral", "ledger"]);
    }

    #[test]
    fn imagery_and_overlap() {
        let fx = extractor();
        let tokens = fx.tokenize("A warm hum in the dark room");
        assert_eq!(fx.imagery_hits(&tokens), 3);

        assert_eq!(fx.noun_overlap_ratio("red fox", "the fox"), 0.5);
        assert_eq!(fx.noun_overlap_ratio("", "the fox"), 0.0);
        assert_eq!(fx.noun_overlap_ratio("fox", "the"), 0.0);
    }

    #[test]
    fn structural_counts() {
        assert_eq!(sentence_count("One. Two!! Three?! four"), 3);
        assert_eq!(sentence_count("no terminator"), 0);
        assert_eq!(question_count("Why? How??"), 3);
        assert_eq!(both_and_count("Both light and\ndark, both sides and more"), 1);
        assert_eq!(neither_nor_count("neither here nor there"), 1);
        assert_eq!(neither_nor_count("nor neither"), 0);
    }

    #[test]
    fn whitespace_words_keep_punctuation() {
        assert_eq!(whitespace_words("Hi there, hi"), set(&["hi", "there,"]));
    }
}
