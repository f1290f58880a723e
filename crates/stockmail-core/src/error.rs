//! Error types for the stockmail-core library.

use thiserror::Error;

/// Main error type for the stockmail library.
#[derive(Error, Debug)]
pub enum StockmailError {
    /// Report extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a document did not yield a report.
///
/// None of these are fatal to the caller: every variant means "not a
/// parseable report" and the document is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// No "stock as on" date marker in the text.
    #[error("no report date marker found")]
    MissingDate,

    /// The date token matched the pattern but is not a calendar date.
    #[error("report date {0} is not a valid calendar date")]
    InvalidDate(String),

    /// No table with a recognizable header.
    #[error("no stock table found")]
    NoTableFound,

    /// A table was found but no data row survived validation.
    #[error("stock table has no valid rows")]
    EmptyTable,
}

/// Result type for the stockmail library.
pub type Result<T> = std::result::Result<T, StockmailError>;
