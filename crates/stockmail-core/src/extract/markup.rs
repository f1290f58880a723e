//! Stock table walker for HTML email bodies.

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::columns::{TableAccumulator, DATA_ROW_WIDTH};
use super::rules::{CUSTOMER_NAME, GRAND_TOTAL, SL_NO, WHITESPACE_RUN};
use super::{TableScan, TableSource, TableWalker};
use crate::error::ExtractionError;

lazy_static! {
    static ref TABLE_SELECTOR: Selector = Selector::parse("table").unwrap();
    static ref ROW_SELECTOR: Selector = Selector::parse("tr").unwrap();
    static ref CELL_SELECTOR: Selector = Selector::parse("td, th").unwrap();
}

/// Walks the first `<table>` that carries the "Sl No" / "Customer Name" header.
///
/// Data rows may omit the trailing grand-total cell, so one column fewer
/// than the full layout is accepted here.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupTableWalker;

impl MarkupTableWalker {
    pub fn new() -> Self {
        Self
    }

    /// Walk an already parsed document.
    pub fn walk_document(&self, document: &Html) -> Result<TableScan, ExtractionError> {
        let table = find_stock_table(document).ok_or(ExtractionError::NoTableFound)?;

        let mut acc = TableAccumulator::new();
        let mut header_found = false;

        for (index, tr) in table.select(&ROW_SELECTOR).enumerate() {
            let cells: Vec<String> = tr.select(&CELL_SELECTOR).map(cell_text).collect();
            let first = cells.first().map(String::as_str).unwrap_or("");

            if !header_found {
                if SL_NO.is_match(first) {
                    debug!("Header row at index {}", index);
                    header_found = true;
                }
                continue;
            }

            let marker_at = if GRAND_TOTAL.is_match(first) {
                Some(0)
            } else if cells.get(1).is_some_and(|c| GRAND_TOTAL.is_match(c)) {
                Some(1)
            } else {
                None
            };

            match marker_at {
                Some(marker) => acc.accept_footer(index, &cells[marker + 1..]),
                None => acc.accept_row(index, &cells, DATA_ROW_WIDTH - 1),
            }
        }

        acc.finish(TableSource::Markup)
    }
}

impl TableWalker for MarkupTableWalker {
    fn source(&self) -> TableSource {
        TableSource::Markup
    }

    fn walk(&self, text: &str) -> Result<TableScan, ExtractionError> {
        self.walk_document(&Html::parse_document(text))
    }
}

/// Rendered text of the whole document, tags and entities resolved.
pub fn rendered_text(document: &Html) -> String {
    document.root_element().text().collect::<Vec<_>>().join(" ")
}

fn find_stock_table(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&TABLE_SELECTOR).find(|table| {
        let text = table.text().collect::<Vec<_>>().join(" ");
        SL_NO.is_match(&text) && CUSTOMER_NAME.is_match(&text)
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    let text: String = cell.text().collect();
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}
