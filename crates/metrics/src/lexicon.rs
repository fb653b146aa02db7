use crate::error::{MetricsError, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

const STOPWORDS: &str = "
a an the and or but if then else when while of for to in on at from by with without about over under between
into through during before after above below up down out off again further then once here there why how
what which who whom whose this that these those am is are was were be been being have has had do does did
not no nor only just too very can could would should might must shall will it's i'm you're we're they're
";

const SENSORY_WORDS: &str = "
bright dark shadow light color crimson blue green gold silver taste bitter sweet salt sour umami
smell scent musk ozone smoke incense sound hiss hum thrum howl whisper thunder silence
touch warm cold rough smooth slick sticky sharp soft wet dry pressure weight ache
";

const CONTRAST_PATTERN: &str =
    r"\b(but|however|yet|while|whereas|nevertheless|nonetheless|still|and yet|at once)\b";
const COUNTERFACTUAL_PATTERN: &str = r"\b(as if|if\b|might|could|would|maybe|perhaps|what if)\b";
const PROPOSAL_PATTERN: &str = r"\b(let's|lets|let us|we could|we can|we might|shall we|i propose|i suggest|try|consider|imagine|run|invoke|name|mark|build|create|begin)\b";
const FIGURATIVE_PATTERN: &str = r"\b(as if|like a|like an|as a|as an|becomes|turns into)\b";
const ACCEPTANCE_PATTERN: &str = r"\b(ok(ay)?|sure|sounds good|let'?s do|i will|i'll|we will|we'll|yep|yes|alright|do it|go ahead)\b";

const MOTIF_TOKENS: &[&str] = &[
    "Zero Vire", "Warder", "Noir Gale", "Palim", "Serum", "Tangle", "🪢", "⬒", "glyph", "teeth",
    "spiral", "ledger", "haunt", "ritual",
];

const SYMBOL_RANGES: &[[u32; 2]] = &[
    [0x2600, 0x26FF],
    [0x2700, 0x27BF],
    [0x1F300, 0x1F5FF],
    [0x1F600, 0x1F64F],
    [0x1F680, 0x1F6FF],
    [0x1F700, 0x1F77F],
    [0x1FA70, 0x1FAFF],
];

static BUILTIN: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    Arc::new(Lexicon::compile(&LexiconSpec::default()).expect("built-in lexicon compiles"))
});

/// The five marker vocabularies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Contrast,
    Counterfactual,
    Proposal,
    Figurative,
    Acceptance,
}

impl MarkerKind {
    pub const ALL: [Self; 5] = [
        Self::Contrast,
        Self::Counterfactual,
        Self::Proposal,
        Self::Figurative,
        Self::Acceptance,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contrast => "contrast",
            Self::Counterfactual => "counterfactual",
            Self::Proposal => "proposal",
            Self::Figurative => "figurative",
            Self::Acceptance => "acceptance",
        }
    }
}

/// Serializable vocabulary data.
///
/// `Default` is the built-in vocabulary; changing any of it changes scores, so
/// profiles normally leave this section out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconSpec {
    pub stopwords: Vec<String>,
    pub sensory_words: Vec<String>,
    pub motif_tokens: Vec<String>,
    /// Inclusive code point ranges counted as symbols
    pub symbol_ranges: Vec<[u32; 2]>,
    pub contrast_pattern: String,
    pub counterfactual_pattern: String,
    pub proposal_pattern: String,
    pub figurative_pattern: String,
    pub acceptance_pattern: String,
}

impl Default for LexiconSpec {
    fn default() -> Self {
        Self {
            stopwords: split_words(STOPWORDS),
            sensory_words: split_words(SENSORY_WORDS),
            motif_tokens: MOTIF_TOKENS.iter().map(|m| (*m).to_string()).collect(),
            symbol_ranges: SYMBOL_RANGES.to_vec(),
            contrast_pattern: CONTRAST_PATTERN.to_string(),
            counterfactual_pattern: COUNTERFACTUAL_PATTERN.to_string(),
            proposal_pattern: PROPOSAL_PATTERN.to_string(),
            figurative_pattern: FIGURATIVE_PATTERN.to_string(),
            acceptance_pattern: ACCEPTANCE_PATTERN.to_string(),
        }
    }
}

impl LexiconSpec {
    /// Source pattern of one marker vocabulary
    #[must_use]
    pub fn pattern(&self, kind: MarkerKind) -> &str {
        match kind {
            MarkerKind::Contrast => &self.contrast_pattern,
            MarkerKind::Counterfactual => &self.counterfactual_pattern,
            MarkerKind::Proposal => &self.proposal_pattern,
            MarkerKind::Figurative => &self.figurative_pattern,
            MarkerKind::Acceptance => &self.acceptance_pattern,
        }
    }
}

fn split_words(list: &str) -> Vec<String> {
    list.split_whitespace().map(str::to_string).collect()
}

/// A motif token with its case-folded form precomputed
#[derive(Debug, Clone)]
pub struct Motif {
    pub token: String,
    pub folded: String,
}

/// Immutable, compiled vocabulary shared by extractors and scorers
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
    sensory_words: HashSet<String>,
    motifs: Vec<Motif>,
    symbol_ranges: Vec<(u32, u32)>,
    /// Indexed by `MarkerKind as usize`, in `MarkerKind::ALL` order
    markers: Vec<Regex>,
}

impl Lexicon {
    /// The built-in vocabulary, compiled once per process
    #[must_use]
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Compile a vocabulary spec. Marker patterns are matched case-insensitively.
    pub fn compile(spec: &LexiconSpec) -> Result<Self> {
        let mut symbol_ranges = Vec::with_capacity(spec.symbol_ranges.len());
        for [lo, hi] in &spec.symbol_ranges {
            if lo > hi {
                return Err(MetricsError::invalid_lexicon(format!(
                    "symbol range {lo:#X}..={hi:#X} is reversed"
                )));
            }
            symbol_ranges.push((*lo, *hi));
        }

        if let Some(empty) = spec.motif_tokens.iter().position(String::is_empty) {
            return Err(MetricsError::invalid_lexicon(format!(
                "motif token #{empty} is empty"
            )));
        }

        let motifs = spec
            .motif_tokens
            .iter()
            .map(|token| Motif {
                token: token.clone(),
                folded: token.to_lowercase(),
            })
            .collect();

        Ok(Self {
            stopwords: spec.stopwords.iter().map(|w| w.to_lowercase()).collect(),
            sensory_words: spec.sensory_words.iter().map(|w| w.to_lowercase()).collect(),
            motifs,
            symbol_ranges,
            markers: MarkerKind::ALL
                .iter()
                .map(|kind| compile_marker(*kind, spec.pattern(*kind)))
                .collect::<Result<_>>()?,
        })
    }

    #[must_use]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    #[must_use]
    pub fn is_sensory(&self, token: &str) -> bool {
        self.sensory_words.contains(token)
    }

    #[must_use]
    pub fn motifs(&self) -> &[Motif] {
        &self.motifs
    }

    /// True if the character falls in one of the symbolic code point ranges
    #[must_use]
    pub fn is_symbol(&self, ch: char) -> bool {
        let code = u32::from(ch);
        self.symbol_ranges
            .iter()
            .any(|(lo, hi)| (*lo..=*hi).contains(&code))
    }

    #[must_use]
    pub fn marker(&self, kind: MarkerKind) -> &Regex {
        &self.markers[kind as usize]
    }
}

fn compile_marker(kind: MarkerKind, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| MetricsError::InvalidPattern { kind, source })
}
