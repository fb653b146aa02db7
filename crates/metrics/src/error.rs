use crate::lexicon::MarkerKind;
use thiserror::Error;

/// Result type for metrics operations
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors raised while building a scorer.
///
/// Scoring itself is infallible: degenerate input produces neutral values.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Invalid scoring configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A lexicon marker pattern failed to compile
    #[error("Invalid {} marker pattern: {source}", .kind.as_str())]
    InvalidPattern {
        kind: MarkerKind,
        #[source]
        source: regex::Error,
    },

    /// Lexicon data is inconsistent
    #[error("Invalid lexicon: {0}")]
    InvalidLexicon(String),

    /// Profile file is not valid TOML or has the wrong shape
    #[error("Profile parse error: {0}")]
    ProfileParse(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MetricsError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid lexicon error
    pub fn invalid_lexicon(msg: impl Into<String>) -> Self {
        Self::InvalidLexicon(msg.into())
    }
}
