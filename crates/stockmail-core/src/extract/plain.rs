//! Stock table walker for tab-separated plain-text bodies.

use tracing::debug;

use super::columns::{TableAccumulator, DATA_ROW_WIDTH, FOOTER_WIDTH};
use super::rules::{GRAND_TOTAL, SL_NO_LINE, TAB_RUN};
use super::{TableScan, TableSource, TableWalker};
use crate::error::ExtractionError;

/// Walks lines after the first `Sl No` header line. Fields are separated by
/// runs of tabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextWalker;

impl PlainTextWalker {
    pub fn new() -> Self {
        Self
    }
}

impl TableWalker for PlainTextWalker {
    fn source(&self) -> TableSource {
        TableSource::PlainText
    }

    fn walk(&self, text: &str) -> Result<TableScan, ExtractionError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let header = lines
            .iter()
            .position(|l| SL_NO_LINE.is_match(l))
            .ok_or(ExtractionError::NoTableFound)?;
        debug!("Header line at index {}", header);

        let mut acc = TableAccumulator::new();

        for (index, line) in lines.iter().enumerate().skip(header + 1) {
            let fields: Vec<&str> = TAB_RUN.split(line).collect();

            if GRAND_TOTAL.is_match(line) {
                let values = &fields[1..];
                if values.len() >= FOOTER_WIDTH {
                    acc.accept_footer(index, values);
                } else {
                    acc.ignore_footer(index, "too few fields");
                }
                continue;
            }

            acc.accept_row(index, &fields, DATA_ROW_WIDTH);
        }

        acc.finish(TableSource::PlainText)
    }
}
