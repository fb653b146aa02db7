//! # Emergence Metrics
//!
//! Per-turn heuristic scoring of (user, assistant) pairs, with a
//! prompt-rotation negative control.
//!
//! ## Architecture
//!
//! ```text
//! Pair[] (from emergence-transcript)
//!     │
//!     ├──> Conversation Scorer (sequential, one session per conversation)
//!     │    ├─> Feature Extractors (stateless, bound to a compiled Lexicon)
//!     │    ├─> session memory: recent assistant window, glyphs, motif last-seen
//!     │    └─> primaries → coherence penalty → emergence score → hot flag
//!     │
//!     ├──> PerTurnMetrics[]
//!     │
//!     └──> Negative Control (cyclic prompt rotation) → ControlScoreSeries
//! ```
//!
//! [`ConversationAnalyzer`] runs the whole chain from raw text, and
//! [`ConversationSummary`] reduces the result to review statistics.
//!
//! ## Example
//!
//! ```rust
//! use emergence_metrics::ConversationAnalyzer;
//!
//! let analyzer = ConversationAnalyzer::with_defaults();
//! let analysis = analyzer.analyze_transcript(
//!     "User: Hello there.\nAssistant: Hi! How can I help?",
//! );
//!
//! assert_eq!(analysis.metrics.len(), 1);
//! let score = analysis.metrics[0].emergence_score;
//! assert!((0.0..=1.0).contains(&score));
//! ```

mod analysis;
mod config;
mod control;
mod error;
pub mod features;
mod lexicon;
mod scorer;
mod session;
pub mod signals;
mod summary;
mod types;

pub use analysis::{ConversationAnalysis, ConversationAnalyzer};
pub use config::{MetricsProfile, ScoringConfig};
pub use control::negative_control;
pub use error::{MetricsError, Result};
pub use features::FeatureExtractor;
pub use lexicon::{Lexicon, LexiconSpec, MarkerKind, Motif};
pub use scorer::ConversationScorer;
pub use signals::{emergence_score, round_to};
pub use summary::{
    ConversationSummary, ControlSummary, Distribution, EmergenceSummary, LengthBinSummary,
    ParityGroup, TopTurn,
};
pub use types::{
    ControlScoreSeries, ConversationMetrics, LengthBin, PerTurnMetrics, PrimarySignals,
};
