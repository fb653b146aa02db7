//! Descriptive statistics over one scored conversation, for QC review.

use crate::config::ScoringConfig;
use crate::signals::round_to;
use crate::types::{ControlScoreSeries, LengthBin, PerTurnMetrics};
use serde::{Deserialize, Serialize};

const TOP_TURNS: usize = 10;

/// Count plus central tendency and range; statistics are `None` when empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Distribution {
    #[must_use]
    pub fn of(values: &[f64]) -> Self {
        let sorted = sorted(values);
        Self {
            count: values.len(),
            mean: mean(values).map(round3),
            median: quantile(&sorted, 0.5).map(round3),
            min: sorted.first().copied().map(round3),
            max: sorted.last().copied().map(round3),
        }
    }
}

/// Emergence distribution with quartiles and hot share
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergenceSummary {
    #[serde(flatten)]
    pub distribution: Distribution,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    pub hot_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthBinSummary {
    pub bin: LengthBin,
    #[serde(flatten)]
    pub emergence: Distribution,
}

/// Turns with even or odd index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParityGroup {
    pub count: usize,
    pub mean: Option<f64>,
    pub hot_share: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSummary {
    pub mean: Option<f64>,
    pub hot_share: Option<f64>,
    /// mean(emergence) − mean(control)
    pub delta_mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTurn {
    pub index: usize,
    pub emergence_score: f64,
    pub hot: bool,
    pub legacy_presence: f64,
    pub assistant_len_bin: LengthBin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub rows: usize,
    pub hot_threshold: f64,
    pub emergence: EmergenceSummary,
    pub legacy: Distribution,
    /// Present bins only, in short/medium/long order
    pub length_bins: Vec<LengthBinSummary>,
    pub even: ParityGroup,
    pub odd: ParityGroup,
    pub control: Option<ControlSummary>,
    /// Highest emergence first; ties keep turn order
    pub top_turns: Vec<TopTurn>,
}

impl ConversationSummary {
    #[must_use]
    pub fn build(
        metrics: &[PerTurnMetrics],
        control: Option<&ControlScoreSeries>,
        config: &ScoringConfig,
    ) -> Self {
        let scores: Vec<f64> = metrics.iter().map(|m| m.emergence_score).collect();
        let legacy: Vec<f64> = metrics.iter().map(|m| m.legacy_presence).collect();
        let sorted_scores = sorted(&scores);

        let emergence = EmergenceSummary {
            distribution: Distribution::of(&scores),
            q1: quantile(&sorted_scores, 0.25).map(round3),
            q3: quantile(&sorted_scores, 0.75).map(round3),
            hot_share: hot_share(&scores, config),
        };

        let length_bins = LengthBin::ALL
            .iter()
            .filter_map(|bin| {
                let values: Vec<f64> = metrics
                    .iter()
                    .filter(|m| m.assistant_len_bin == *bin)
                    .map(|m| m.emergence_score)
                    .collect();
                (!values.is_empty()).then(|| LengthBinSummary {
                    bin: *bin,
                    emergence: Distribution::of(&values),
                })
            })
            .collect();

        let parity = |even: bool| {
            let values: Vec<f64> = metrics
                .iter()
                .filter(|m| (m.index % 2 == 0) == even)
                .map(|m| m.emergence_score)
                .collect();
            ParityGroup {
                count: values.len(),
                mean: mean(&values).map(round3),
                hot_share: hot_share(&values, config),
            }
        };

        let control = control.map(|series| {
            let control_mean = mean(&series.scores);
            ControlSummary {
                mean: control_mean.map(round3),
                hot_share: hot_share(&series.scores, config),
                delta_mean: mean(&scores)
                    .zip(control_mean)
                    .map(|(real, control)| round3(real - control)),
            }
        });

        let mut ranked: Vec<&PerTurnMetrics> = metrics.iter().collect();
        ranked.sort_by(|a, b| b.emergence_score.total_cmp(&a.emergence_score));
        let top_turns = ranked
            .into_iter()
            .take(TOP_TURNS)
            .map(|m| TopTurn {
                index: m.index,
                emergence_score: m.emergence_score,
                hot: m.hot,
                legacy_presence: m.legacy_presence,
                assistant_len_bin: m.assistant_len_bin,
            })
            .collect();

        Self {
            rows: metrics.len(),
            hot_threshold: config.hot_threshold,
            emergence,
            legacy: Distribution::of(&legacy),
            length_bins,
            even: parity(true),
            odd: parity(false),
            control,
            top_turns,
        }
    }
}

fn round3(value: f64) -> f64 {
    round_to(value, 3)
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

/// Quantile of already sorted values, interpolating linearly between ranks
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn hot_share(values: &[f64], config: &ScoringConfig) -> Option<f64> {
    let hot = values.iter().filter(|v| config.is_hot(**v)).count();
    (!values.is_empty()).then(|| round3(hot as f64 / values.len() as f64))
}
