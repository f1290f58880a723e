//! Report date recognition and resolution.

use chrono::NaiveDate;

use super::patterns::REPORT_DATE;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Finds the "stock as on" date marker.
///
/// The token is returned as written; calendar validity is checked later by
/// [`resolve_report_date`].
pub struct ReportDateExtractor;

impl ReportDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ReportDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ReportDateExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        REPORT_DATE
            .captures_iter(text)
            .filter_map(|caps| {
                let full = caps.get(0)?;
                let token = caps.get(1)?;
                Some(
                    ExtractionMatch::new(token.as_str().to_string(), full.as_str())
                        .with_position(full.start(), full.end()),
                )
            })
            .collect()
    }
}

/// Extract the first report date token (`DD.MM.YYYY`) from text.
pub fn extract_report_date(text: &str) -> Option<String> {
    ReportDateExtractor::new().extract(text).map(|m| m.value)
}

/// Convert a `DD.MM.YYYY` token to a calendar date.
///
/// Impossible dates such as `31.02.2026` are rejected rather than rolled
/// forward into the next month.
pub fn resolve_report_date(token: &str) -> Result<NaiveDate, ExtractionError> {
    let invalid = || ExtractionError::InvalidDate(token.to_string());

    let mut parts = token.trim().split('.');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}
