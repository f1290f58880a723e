//! Report parser that picks a table walker and assembles the result.

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::markup::{rendered_text, MarkupTableWalker};
use super::plain::PlainTextWalker;
use super::rules::{extract_report_date, resolve_report_date, TABLE_TAG};
use super::{ContentType, ExtractionDiagnostics, Result, TableScan, TableSource, TableWalker};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::ParsedReport;

/// Result of report extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted report.
    pub report: ParsedReport,
    /// Walker that produced the rows.
    pub source: TableSource,
    /// Dropped rows, defaulted cells and ignored footers.
    pub diagnostics: ExtractionDiagnostics,
}

/// Trait for report parsing.
pub trait ReportParser {
    /// Parse a report from a document body and its content-type hint.
    fn parse(&self, body: &str, content_type: ContentType) -> Result<ExtractionResult>;
}

/// Tries the markup walker on HTML-looking bodies, then falls back to the
/// plain-text walker.
#[derive(Debug, Clone)]
pub struct StockReportParser {
    /// Whether a markup-path failure may fall back to the plain-text walker.
    markup_fallback: bool,
}

impl StockReportParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            markup_fallback: true,
        }
    }

    /// Build a parser from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new().with_markup_fallback(config.markup_fallback)
    }

    /// Set plain-text fallback after a markup-path failure.
    pub fn with_markup_fallback(mut self, fallback: bool) -> Self {
        self.markup_fallback = fallback;
        self
    }

    fn assemble(&self, body: &str, rendered: Option<&str>, scan: TableScan) -> Result<ExtractionResult> {
        let date_str = extract_report_date(body)
            .or_else(|| rendered.and_then(extract_report_date))
            .ok_or(ExtractionError::MissingDate)?;
        let report_date = resolve_report_date(&date_str)?;

        let report = ParsedReport::new(date_str, report_date, scan.rows, scan.grand_totals)?;

        info!(
            "Extracted report {} with {} rows from {:?} table",
            report.report_date_str,
            report.rows.len(),
            scan.source
        );
        if scan.diagnostics.rows_dropped > 0 || scan.diagnostics.cells_defaulted > 0 {
            debug!(
                "Dropped {} rows, defaulted {} cells, ignored {} footers",
                scan.diagnostics.rows_dropped,
                scan.diagnostics.cells_defaulted,
                scan.diagnostics.footers_ignored
            );
        }

        Ok(ExtractionResult {
            report,
            source: scan.source,
            diagnostics: scan.diagnostics,
        })
    }
}

impl Default for StockReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser for StockReportParser {
    fn parse(&self, body: &str, content_type: ContentType) -> Result<ExtractionResult> {
        debug!("Parsing {} characters of {} body", body.len(), content_type);

        let mut markup_failure = None;

        if content_type == ContentType::Html || TABLE_TAG.is_match(body) {
            let document = Html::parse_document(body);
            match MarkupTableWalker::new().walk_document(&document) {
                Ok(scan) => {
                    let rendered = rendered_text(&document);
                    return self.assemble(body, Some(&rendered), scan);
                }
                Err(e) if self.markup_fallback => {
                    debug!("Markup walk failed ({}), trying plain text", e);
                    markup_failure = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match PlainTextWalker::new().walk(body) {
            Ok(scan) => self.assemble(body, None, scan),
            Err(e) if markup_failure == Some(ExtractionError::EmptyTable) => {
                debug!("Plain-text walk failed ({}) after markup table was empty", e);
                Err(ExtractionError::EmptyTable)
            }
            Err(e) => Err(e),
        }
    }
}

/// Extract a report with the default parser.
pub fn extract_report(body: &str, content_type: ContentType) -> Result<ParsedReport> {
    StockReportParser::new()
        .parse(body, content_type)
        .map(|r| r.report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WarehouseId;
    use pretty_assertions::assert_eq;

    const PLAIN: &str = "Major Customer Stock Report as on - 23.02.2026\n\
                         Sl No\tCustomer Name\tWp\n\
                         1\tAcme Co\t5\t10\t0\t0\t0\t0\t0\t0\t0\t10\n\
                         Grand Total\t10\t0\t0\t0\t0\t0\t0\t0\t10\n";

    #[test]
    fn test_parse_plain_text() {
        let result = StockReportParser::new()
            .parse(PLAIN, ContentType::PlainText)
            .unwrap();

        assert_eq!(result.source, TableSource::PlainText);
        assert_eq!(result.report.report_date_str, "23.02.2026");
        assert_eq!(result.report.rows[0].count(WarehouseId::Annaram), 10);
    }

    #[test]
    fn test_html_hint_falls_back_to_plain_text() {
        let result = StockReportParser::new()
            .parse(PLAIN, ContentType::Html)
            .unwrap();
        assert_eq!(result.source, TableSource::PlainText);
    }

    #[test]
    fn test_fallback_disabled() {
        let parser = StockReportParser::new().with_markup_fallback(false);
        assert_eq!(
            parser.parse(PLAIN, ContentType::Html).unwrap_err(),
            ExtractionError::NoTableFound
        );
    }

    #[test]
    fn test_table_tag_overrides_plain_hint() {
        let html = r#"<p>Major Customer Stock as on - 01.03.2026</p>
            <table>
              <tr><td>Sl No</td><td>Customer Name</td></tr>
              <tr><td>1</td><td>A</td><td>1</td><td>2</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>2</td></tr>
            </table>"#;

        let result = StockReportParser::new()
            .parse(html, ContentType::PlainText)
            .unwrap();
        assert_eq!(result.source, TableSource::Markup);
    }

    #[test]
    fn test_date_split_by_tags() {
        let html = r#"<p>Major Customer Stock Report as on -&nbsp;<b>02.03.2026</b></p>
            <table>
              <tr><td>Sl No</td><td>Customer Name</td></tr>
              <tr><td>1</td><td>A</td><td>1</td><td>2</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>2</td></tr>
            </table>"#;

        let report = extract_report(html, ContentType::Html).unwrap();
        assert_eq!(report.report_date_str, "02.03.2026");
    }

    #[test]
    fn test_invalid_calendar_date() {
        let text = PLAIN.replace("23.02.2026", "31.02.2026");
        assert_eq!(
            extract_report(&text, ContentType::PlainText).unwrap_err(),
            ExtractionError::InvalidDate("31.02.2026".to_string())
        );
    }

    #[test]
    fn test_empty_markup_table_reported() {
        let html = r#"<p>Major Customer Stock as on - 01.03.2026</p>
            <table><tr><td>Sl No</td><td>Customer Name</td></tr></table>"#;

        assert_eq!(
            extract_report(html, ContentType::Html).unwrap_err(),
            ExtractionError::EmptyTable
        );
    }

    #[test]
    fn test_missing_everything() {
        assert_eq!(
            extract_report("hello", ContentType::PlainText).unwrap_err(),
            ExtractionError::NoTableFound
        );
    }
}
