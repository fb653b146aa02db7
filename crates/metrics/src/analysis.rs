use crate::config::{MetricsProfile, ScoringConfig};
use crate::error::Result;
use crate::lexicon::{Lexicon, LexiconSpec};
use crate::scorer::ConversationScorer;
use crate::summary::ConversationSummary;
use crate::types::{ControlScoreSeries, ConversationMetrics};
use emergence_transcript::{segment_pairs, Pair, SegmentationStrategy};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything computed for one conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub strategy: SegmentationStrategy,
    pub metrics: ConversationMetrics,
    /// `None` when the conversation produced no pairs
    pub control: Option<ControlScoreSeries>,
}

impl ConversationAnalysis {
    #[must_use]
    pub fn summarize(&self, config: &ScoringConfig) -> ConversationSummary {
        ConversationSummary::build(&self.metrics, self.control.as_ref(), config)
    }

    #[must_use]
    pub fn hot_turns(&self) -> usize {
        self.metrics.iter().filter(|m| m.hot).count()
    }
}

/// Full pipeline: segment, pair, score, control.
///
/// Cheap to clone and safe to share between threads; each analysis uses its
/// own session state.
#[derive(Debug, Clone)]
pub struct ConversationAnalyzer {
    scorer: ConversationScorer,
}

impl ConversationAnalyzer {
    /// Build an analyzer from a loaded profile, compiling its lexicon
    pub fn new(profile: &MetricsProfile) -> Result<Self> {
        profile.validate()?;
        let lexicon = if profile.lexicon == LexiconSpec::default() {
            Lexicon::builtin()
        } else {
            Arc::new(Lexicon::compile(&profile.lexicon)?)
        };
        Self::from_parts(profile.scoring.clone(), lexicon)
    }

    pub fn from_parts(config: ScoringConfig, lexicon: Arc<Lexicon>) -> Result<Self> {
        Ok(Self {
            scorer: ConversationScorer::new(config, lexicon)?,
        })
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            scorer: ConversationScorer::with_defaults(),
        }
    }

    #[must_use]
    pub const fn scorer(&self) -> &ConversationScorer {
        &self.scorer
    }

    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        self.scorer.config()
    }

    /// Analyze raw transcript text
    #[must_use]
    pub fn analyze_transcript(&self, text: &str) -> ConversationAnalysis {
        let (strategy, pairs) = segment_pairs(text);
        log::debug!(
            "Segmented transcript with {} strategy into {} pairs",
            strategy.as_str(),
            pairs.len()
        );
        self.analyze_pairs(strategy, &pairs)
    }

    /// Analyze pairs that were segmented elsewhere
    #[must_use]
    pub fn analyze_pairs(
        &self,
        strategy: SegmentationStrategy,
        pairs: &[Pair],
    ) -> ConversationAnalysis {
        let metrics = self.scorer.score(pairs);
        let control = self.scorer.negative_control(&metrics);
        ConversationAnalysis {
            strategy,
            metrics,
            control,
        }
    }

    #[must_use]
    pub fn summarize(&self, analysis: &ConversationAnalysis) -> ConversationSummary {
        analysis.summarize(self.config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricsError;
    use pretty_assertions::assert_eq;

    #[test]
    fn analyzes_header_labeled_transcript() {
        let analyzer = ConversationAnalyzer::with_defaults();
        let analysis = analyzer.analyze_transcript(
            "User: Hello there.\nAssistant: Hi! How can I help?\nUser: Tell me about the weather.\nAssistant: It's sunny today.",
        );

        assert_eq!(analysis.strategy, SegmentationStrategy::HeaderLabeled);
        assert_eq!(analysis.metrics.len(), 2);
        let control = analysis.control.as_ref().unwrap();
        assert_eq!(control.len(), 2);
        // 5 mod 2 = 1
        assert_eq!(control.partners, vec![2, 1]);
    }

    #[test]
    fn empty_transcript_yields_nothing() {
        let analysis = ConversationAnalyzer::with_defaults().analyze_transcript("");
        assert!(analysis.metrics.is_empty());
        assert_eq!(analysis.control, None);
        assert_eq!(analysis.hot_turns(), 0);
    }

    #[test]
    fn custom_lexicon_changes_motifs() {
        let profile = MetricsProfile {
            lexicon: LexiconSpec {
                motif_tokens: vec!["lantern".to_string()],
                ..LexiconSpec::default()
            },
            ..MetricsProfile::default()
        };
        let analyzer = ConversationAnalyzer::new(&profile).unwrap();
        let analysis = analyzer.analyze_transcript(
            "User: a\nAssistant: the lantern\nUser: b\nAssistant: a spiral lantern",
        );

        assert_eq!(analysis.metrics[0].motif_count_used, 1);
        assert_eq!(analysis.metrics[1].motif_count_used, 1);
        assert_eq!(analysis.metrics[1].motif_latency_min_turns, Some(1));
    }

    #[test]
    fn invalid_profile_is_rejected() {
        let mut profile = MetricsProfile::default();
        profile.lexicon.proposal_pattern = "(".to_string();
        assert!(matches!(
            ConversationAnalyzer::new(&profile),
            Err(MetricsError::InvalidPattern { .. })
        ));

        let mut profile = MetricsProfile::default();
        profile.scoring.hot_threshold = 2.0;
        assert!(matches!(
            ConversationAnalyzer::new(&profile),
            Err(MetricsError::InvalidConfig(_))
        ));
    }
}
