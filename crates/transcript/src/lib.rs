//! # Emergence Transcript
//!
//! Turns loosely structured chat exports into ordered (user, assistant) pairs.
//!
//! ## Architecture
//!
//! ```text
//! Raw transcript text
//!     │
//!     ├──> Header Normalizer (per line, two header dialects)
//!     │
//!     ├──> Turn Segmenter
//!     │    ├─> header-labeled turns, when any role header is recognized
//!     │    └─> blank-line alternation otherwise (USER, ASSISTANT, USER, ...)
//!     │
//!     └──> Pair Builder → Pair[] (1-based, conversational order)
//! ```
//!
//! Structured exports (`.json`) and word documents (`.docx`) are first turned
//! into header-labeled text by [`source::read_transcript`], so every input ends
//! up on the same text path.
//!
//! ## Example
//!
//! ```rust
//! use emergence_transcript::{build_pairs, segment, SegmentationStrategy};
//!
//! let text = "User: Hello there.\nAssistant: Hi! How can I help?";
//! let segmentation = segment(text);
//! assert_eq!(segmentation.strategy, SegmentationStrategy::HeaderLabeled);
//!
//! let pairs = build_pairs(&segmentation.turns);
//! assert_eq!(pairs.len(), 1);
//! assert_eq!(pairs[0].user, "Hello there.");
//! ```

mod error;
mod header;
mod pairs;
mod segmenter;
pub mod source;
mod types;

pub use error::{Result, TranscriptError};
pub use header::{normalize_header, HeaderLine};
pub use pairs::build_pairs;
pub use segmenter::{segment, segment_pairs};
pub use source::{read_transcript, ExportFormat};
pub use types::{Pair, Role, Segmentation, SegmentationStrategy, Turn};
