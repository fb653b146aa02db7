use crate::config::ScoringConfig;
use crate::control::negative_control;
use crate::error::{MetricsError, Result};
use crate::features::{question_count, sentence_count, trigram_redundancy, FeatureExtractor};
use crate::lexicon::{Lexicon, MarkerKind};
use crate::session::ConversationSession;
use crate::signals::{callback_ratio, emergence_score, round_to};
use crate::types::{ControlScoreSeries, ConversationMetrics, PerTurnMetrics, PrimarySignals};
use emergence_transcript::Pair;
use std::sync::Arc;

/// Sequential per-conversation scorer.
///
/// Every call to [`ConversationScorer::score`] starts from a fresh session, so
/// one scorer can serve any number of conversations (including concurrently).
#[derive(Debug, Clone)]
pub struct ConversationScorer {
    config: ScoringConfig,
    extractor: FeatureExtractor,
}

impl ConversationScorer {
    /// Create a scorer; fails if the configuration is invalid
    pub fn new(config: ScoringConfig, lexicon: Arc<Lexicon>) -> Result<Self> {
        config.validate().map_err(MetricsError::InvalidConfig)?;
        Ok(Self {
            config,
            extractor: FeatureExtractor::new(lexicon),
        })
    }

    /// Scorer with default constants and the built-in vocabulary
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            config: ScoringConfig::default(),
            extractor: FeatureExtractor::new(Lexicon::builtin()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    #[must_use]
    pub const fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Score all pairs of one conversation, in order
    #[must_use]
    pub fn score(&self, pairs: &[Pair]) -> ConversationMetrics {
        let mut session = ConversationSession::new(self.config.callback_window);
        let mut metrics = Vec::with_capacity(pairs.len());

        for (position, pair) in pairs.iter().enumerate() {
            let previous = position.checked_sub(1).map(|p| &pairs[p]);
            let next = pairs.get(position + 1);
            metrics.push(self.score_pair(&mut session, pair, previous, next));
        }

        let hot = metrics.iter().filter(|m| m.hot).count();
        log::debug!("Scored {} turns ({} hot)", metrics.len(), hot);
        metrics
    }

    /// Negative control over already computed metrics, using the configured shift
    #[must_use]
    pub fn negative_control(&self, metrics: &[PerTurnMetrics]) -> Option<ControlScoreSeries> {
        negative_control(&self.extractor, metrics, self.config.control_shift)
    }

    fn score_pair(
        &self,
        session: &mut ConversationSession,
        pair: &Pair,
        previous: Option<&Pair>,
        next: Option<&Pair>,
    ) -> PerTurnMetrics {
        let fx = &self.extractor;
        let user = pair.user.as_str();
        let assistant = pair.assistant.as_str();

        let history = session.history_text(previous);
        let reference = format!("{user} {history}");
        let tokens = fx.tokenize(assistant);

        let callback = callback_ratio(fx, assistant, session.recent_assistant());
        let signals = PrimarySignals {
            initiative: fx.initiative_agency(assistant),
            synthesis: fx.synthesis_tension(assistant),
            affect: fx.affective_charge(assistant),
            self_continuity: fx.self_continuity(assistant, callback),
            novelty: fx.normalized_novelty(assistant, user, &history),
        };
        let penalty = fx.coherence_penalty(assistant, &reference);
        let score = emergence_score(&signals, penalty);

        let sentences = sentence_count(assistant).max(1) as f64;
        let proposal_uptake = next.map(|next| fx.proposal_uptake(assistant, &next.user));

        let new_glyphs = session.record_glyphs(fx, assistant);
        let motifs = session.record_motifs(fx, assistant, pair.index);
        session.remember_assistant(assistant);

        PerTurnMetrics {
            index: pair.index,
            user: pair.user.clone(),
            assistant: pair.assistant.clone(),
            assistant_len_tokens: tokens.len(),
            assistant_len_bin: self.config.length_bin(tokens.len()),

            initiative: round_to(signals.initiative, 3),
            synthesis: round_to(signals.synthesis, 3),
            affect: round_to(signals.affect, 3),
            self_continuity: round_to(signals.self_continuity, 3),
            norm_novelty: round_to(signals.novelty, 3),
            coherence_penalty: round_to(penalty, 3),

            proposal_rate: round_to(
                fx.marker_count(MarkerKind::Proposal, assistant) as f64 / sentences,
                3,
            ),
            question_rate: round_to(question_count(assistant) as f64 / sentences, 3),
            contrast_count: fx.marker_count(MarkerKind::Contrast, assistant),
            counterfactual_count: fx.marker_count(MarkerKind::Counterfactual, assistant),
            imagery_hits: fx.imagery_hits(&tokens),
            figurative_flags: fx.marker_count(MarkerKind::Figurative, assistant),
            glyph_density: fx.glyph_density(assistant),
            new_glyphs,
            callback_ratio: round_to(callback, 3),
            redundancy_3gram: round_to(trigram_redundancy(&tokens), 3),
            noun_overlap: round_to(fx.noun_overlap_ratio(assistant, &reference), 3),

            proposal_uptake,
            motif_latency_min_turns: motifs.latency,
            motif_count_used: motifs.used,

            emergence_score: score,
            hot: self.config.is_hot(score),
            legacy_presence: fx.legacy_presence_score(user, assistant),
        }
    }
}
