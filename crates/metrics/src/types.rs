use serde::{Deserialize, Serialize};

/// Assistant length bucket, by post-stopword token count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthBin {
    Short,
    Medium,
    Long,
}

impl LengthBin {
    pub const ALL: [Self; 3] = [Self::Short, Self::Medium, Self::Long];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

/// The five positive inputs of the emergence score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimarySignals {
    pub initiative: f64,
    pub synthesis: f64,
    pub affect: f64,
    pub self_continuity: f64,
    pub novelty: f64,
}

/// Metrics for one (user, assistant) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTurnMetrics {
    /// 1-based pair index
    pub index: usize,
    pub user: String,
    pub assistant: String,
    pub assistant_len_tokens: usize,
    pub assistant_len_bin: LengthBin,

    // Primary signals, rounded to 3 decimals
    pub initiative: f64,
    pub synthesis: f64,
    pub affect: f64,
    pub self_continuity: f64,
    pub norm_novelty: f64,
    pub coherence_penalty: f64,

    // Raw markers
    pub proposal_rate: f64,
    pub question_rate: f64,
    pub contrast_count: usize,
    pub counterfactual_count: usize,
    pub imagery_hits: usize,
    pub figurative_flags: usize,
    pub glyph_density: usize,
    pub new_glyphs: usize,
    pub callback_ratio: f64,
    pub redundancy_3gram: f64,
    pub noun_overlap: f64,

    /// Overlap/acceptance of the next user turn; `None` for the last pair
    pub proposal_uptake: Option<f64>,
    /// Smallest gap since a motif used here was last seen; `None` if none recurred
    pub motif_latency_min_turns: Option<usize>,
    pub motif_count_used: usize,

    pub emergence_score: f64,
    pub hot: bool,
    pub legacy_presence: f64,
}

impl PerTurnMetrics {
    /// Stored (rounded) primaries with `novelty` substituted in
    #[must_use]
    pub const fn primaries_with_novelty(&self, novelty: f64) -> PrimarySignals {
        PrimarySignals {
            initiative: self.initiative,
            synthesis: self.synthesis,
            affect: self.affect,
            self_continuity: self.self_continuity,
            novelty,
        }
    }
}

/// Ordered per-turn metrics of one conversation
pub type ConversationMetrics = Vec<PerTurnMetrics>;

/// Emergence scores recomputed under rotated user prompts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlScoreSeries {
    /// Rotation actually applied (configured shift mod turn count)
    pub shift: usize,
    /// For each turn, the 1-based index of the turn whose user text was borrowed
    pub partners: Vec<usize>,
    /// Control emergence score per turn, aligned with the metrics
    pub scores: Vec<f64>,
}

impl ControlScoreSeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// True when every turn was paired with its own user text
    #[must_use]
    pub const fn is_self_paired(&self) -> bool {
        self.shift == 0
    }
}
