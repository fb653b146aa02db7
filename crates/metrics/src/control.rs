//! Prompt-rotation negative control.
//!
//! Each assistant reply is re-scored against the user prompt of another turn,
//! chosen by a fixed cyclic rotation. Novelty and coherence are recomputed
//! against the borrowed prompt with an empty history; the other primaries are
//! the turn's stored values. A control series that tracks the real scores
//! closely means the novelty/coherence half carries little information.

use crate::features::FeatureExtractor;
use crate::signals::emergence_score;
use crate::types::{ControlScoreSeries, PerTurnMetrics};

/// Recompute emergence scores under a rotation of `shift` turns.
///
/// Returns `None` for an empty conversation. A shift that reduces to 0 modulo
/// the turn count pairs every turn with its own prompt; that is logged and
/// returned as is.
#[must_use]
pub fn negative_control(
    fx: &FeatureExtractor,
    metrics: &[PerTurnMetrics],
    shift: usize,
) -> Option<ControlScoreSeries> {
    let n = metrics.len();
    if n == 0 {
        return None;
    }

    let shift = shift % n;
    if let Some(level) = self_pairing_level(n, shift) {
        log::log!(level, "Control rotation reduces to self-pairing for {n} turns");
    }

    let mut partners = Vec::with_capacity(n);
    let mut scores = Vec::with_capacity(n);
    for (i, turn) in metrics.iter().enumerate() {
        let j = (i + shift) % n;
        let borrowed = metrics[j].user.as_str();

        let novelty = fx.normalized_novelty(&turn.assistant, borrowed, "");
        let penalty = fx.coherence_penalty(&turn.assistant, borrowed);
        partners.push(j + 1);
        scores.push(emergence_score(&turn.primaries_with_novelty(novelty), penalty));
    }

    Some(ControlScoreSeries {
        shift,
        partners,
        scores,
    })
}

/// A single turn can only ever pair with itself, so that case stays at debug.
fn self_pairing_level(turns: usize, shift: usize) -> Option<log::Level> {
    match (turns, shift) {
        (_, s) if s != 0 => None,
        (1, _) => Some(log::Level::Debug),
        _ => Some(log::Level::Warn),
    }
}
