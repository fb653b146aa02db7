use thiserror::Error;

/// Result type for transcript operations
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Errors raised while loading transcripts.
///
/// Segmentation itself never fails: text without recognizable structure simply
/// yields no pairs.
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A structured export could not be decoded
    #[error("Invalid JSON export: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A `.docx` file is not a readable zip package
    #[error("Invalid word document archive: {0}")]
    DocxArchive(#[from] zip::result::ZipError),

    /// The document part of a `.docx` file is not well-formed XML
    #[error("Invalid word document XML: {0}")]
    DocxXml(#[from] quick_xml::Error),

    /// File extension has no reader
    #[error("Unsupported transcript format: {0}")]
    UnsupportedFormat(String),
}

impl TranscriptError {
    /// Create an unsupported format error
    pub fn unsupported_format(ext: impl Into<String>) -> Self {
        Self::UnsupportedFormat(ext.into())
    }
}
