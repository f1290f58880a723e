//! Stock report extraction from email bodies.

mod columns;
mod markup;
mod parser;
mod plain;
pub mod rules;

pub use columns::{FooterField, RowField, DATA_ROW_LAYOUT, DATA_ROW_WIDTH, FOOTER_LAYOUT, FOOTER_WIDTH};
pub use markup::{rendered_text, MarkupTableWalker};
pub use parser::{extract_report, ExtractionResult, ReportParser, StockReportParser};
pub use plain::PlainTextWalker;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ExtractionError;
use crate::models::{GrandTotals, StockRow};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Content-type hint supplied with a document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "html", alias = "markup")]
    Html,
    #[serde(rename = "text", alias = "plain")]
    PlainText,
}

impl ContentType {
    /// Infer the hint from a file extension, if it is a known one.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(Self::Html),
            "txt" | "text" => Some(Self::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("html"),
            Self::PlainText => f.write_str("text"),
        }
    }
}

/// Unrecognized content-type string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown content type: {0}")]
pub struct ParseContentTypeError(String);

impl FromStr for ContentType {
    type Err = ParseContentTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "text/html" | "markup" => Ok(Self::Html),
            "text" | "plain" | "text/plain" | "plain-text" => Ok(Self::PlainText),
            _ => Err(ParseContentTypeError(s.to_string())),
        }
    }
}

/// Which walker produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    Markup,
    PlainText,
}

/// Counters for the lenient parts of a table walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionDiagnostics {
    /// Candidate data rows after the header.
    pub rows_seen: usize,
    /// Rows skipped for too few fields, no sequence number or no name.
    pub rows_dropped: usize,
    /// Count cells that were unreadable or missing and became zero.
    pub cells_defaulted: usize,
    /// Grand-total rows that were not used.
    pub footers_ignored: usize,
}

/// Rows and footer collected by one walker.
#[derive(Debug, Clone)]
pub struct TableScan {
    pub source: TableSource,
    pub rows: Vec<StockRow>,
    pub grand_totals: Option<GrandTotals>,
    pub diagnostics: ExtractionDiagnostics,
}

/// A strategy for locating and reading the stock table.
pub trait TableWalker {
    /// Which source this walker reads.
    fn source(&self) -> TableSource;

    /// Locate the table in `text` and read its rows.
    fn walk(&self, text: &str) -> Result<TableScan>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_from_str() {
        assert_eq!("html".parse::<ContentType>(), Ok(ContentType::Html));
        assert_eq!("Text/HTML".parse::<ContentType>(), Ok(ContentType::Html));
        assert_eq!("markup".parse::<ContentType>(), Ok(ContentType::Html));
        assert_eq!("text".parse::<ContentType>(), Ok(ContentType::PlainText));
        assert_eq!("plain-text".parse::<ContentType>(), Ok(ContentType::PlainText));
        assert!("pdf".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(ContentType::from_extension("HTM"), Some(ContentType::Html));
        assert_eq!(ContentType::from_extension("txt"), Some(ContentType::PlainText));
        assert_eq!(ContentType::from_extension("eml"), None);
    }

    #[test]
    fn test_walkers_report_their_source() {
        assert_eq!(MarkupTableWalker::new().source(), TableSource::Markup);
        assert_eq!(PlainTextWalker::new().source(), TableSource::PlainText);
    }
}
