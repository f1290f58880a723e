//! Fixed column layout shared by the markup and plain-text walkers.
//!
//! Both walkers hand flat cell lists to [`TableAccumulator`], which maps them
//! through the same layout tables. Warehouse column order comes from
//! [`WarehouseId::ALL`] and is defined nowhere else.

use tracing::debug;

use super::rules::{classify_count, parse_sequence_number, CountCell};
use super::{ExtractionDiagnostics, TableScan, TableSource};
use crate::error::ExtractionError;
use crate::models::{GrandTotals, StockRow, WarehouseCounts, WarehouseId, WAREHOUSE_COUNT};

/// A positional field in a data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowField {
    SlNo,
    CustomerName,
    Wp,
    Warehouse(WarehouseId),
    GrandTotal,
}

/// A positional field in the grand-total row, counted after the marker cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterField {
    Warehouse(WarehouseId),
    Overall,
}

/// Number of columns in a full data row.
pub const DATA_ROW_WIDTH: usize = 3 + WAREHOUSE_COUNT + 1;

/// Number of value columns following the grand-total marker.
pub const FOOTER_WIDTH: usize = WAREHOUSE_COUNT + 1;

/// Data row columns, index → field.
pub const DATA_ROW_LAYOUT: [RowField; DATA_ROW_WIDTH] = [
    RowField::SlNo,
    RowField::CustomerName,
    RowField::Wp,
    RowField::Warehouse(WarehouseId::ALL[0]),
    RowField::Warehouse(WarehouseId::ALL[1]),
    RowField::Warehouse(WarehouseId::ALL[2]),
    RowField::Warehouse(WarehouseId::ALL[3]),
    RowField::Warehouse(WarehouseId::ALL[4]),
    RowField::Warehouse(WarehouseId::ALL[5]),
    RowField::Warehouse(WarehouseId::ALL[6]),
    RowField::Warehouse(WarehouseId::ALL[7]),
    RowField::GrandTotal,
];

/// Grand-total value columns, index → field.
pub const FOOTER_LAYOUT: [FooterField; FOOTER_WIDTH] = [
    FooterField::Warehouse(WarehouseId::ALL[0]),
    FooterField::Warehouse(WarehouseId::ALL[1]),
    FooterField::Warehouse(WarehouseId::ALL[2]),
    FooterField::Warehouse(WarehouseId::ALL[3]),
    FooterField::Warehouse(WarehouseId::ALL[4]),
    FooterField::Warehouse(WarehouseId::ALL[5]),
    FooterField::Warehouse(WarehouseId::ALL[6]),
    FooterField::Warehouse(WarehouseId::ALL[7]),
    FooterField::Overall,
];

/// Collects rows and the footer while a walker iterates a table.
#[derive(Debug, Default)]
pub(crate) struct TableAccumulator {
    rows: Vec<StockRow>,
    grand_totals: Option<GrandTotals>,
    diagnostics: ExtractionDiagnostics,
}

impl TableAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate data row. Rows narrower than `min_width` or without
    /// a sequence number are dropped.
    pub fn accept_row<S: AsRef<str>>(&mut self, index: usize, cells: &[S], min_width: usize) {
        self.diagnostics.rows_seen += 1;

        if cells.len() < min_width {
            self.drop_row(index, format_args!("{} fields, need {}", cells.len(), min_width));
            return;
        }

        match self.build_row(index, cells) {
            Ok(row) => self.rows.push(row),
            Err(reason) => self.drop_row(index, format_args!("{}", reason)),
        }
    }

    /// Offer a footer row. `values` are the cells after the marker cell.
    pub fn accept_footer<S: AsRef<str>>(&mut self, index: usize, values: &[S]) {
        if self.grand_totals.is_some() {
            self.ignore_footer(index, "grand totals already recorded");
            return;
        }

        let mut totals = GrandTotals::default();
        for (i, field) in FOOTER_LAYOUT.iter().enumerate() {
            let count = self.read_count(index, values.get(i).map(|c| c.as_ref()));
            match field {
                FooterField::Warehouse(w) => totals.warehouses.set(*w, count),
                FooterField::Overall => totals.overall = count,
            }
        }
        self.grand_totals = Some(totals);
    }

    /// Record a footer candidate that was not used.
    pub fn ignore_footer(&mut self, index: usize, reason: &str) {
        self.diagnostics.footers_ignored += 1;
        debug!("Ignoring grand total row {}: {}", index, reason);
    }

    pub fn finish(self, source: TableSource) -> Result<TableScan, ExtractionError> {
        if self.rows.is_empty() {
            debug!(
                "{:?} table had no valid rows ({} seen)",
                source, self.diagnostics.rows_seen
            );
            return Err(ExtractionError::EmptyTable);
        }

        Ok(TableScan {
            source,
            rows: self.rows,
            grand_totals: self.grand_totals,
            diagnostics: self.diagnostics,
        })
    }

    fn build_row<S: AsRef<str>>(&mut self, index: usize, cells: &[S]) -> Result<StockRow, &'static str> {
        let mut sl_no = None;
        let mut customer_name = String::new();
        let mut wp = 0;
        let mut warehouses = WarehouseCounts::default();
        let mut grand_total = 0;

        for (i, field) in DATA_ROW_LAYOUT.iter().enumerate() {
            let cell = cells.get(i).map(|c| c.as_ref());
            match field {
                RowField::SlNo => {
                    sl_no = cell.and_then(parse_sequence_number);
                    if sl_no.is_none() {
                        return Err("no sequence number");
                    }
                }
                RowField::CustomerName => {
                    customer_name = cell.unwrap_or("").trim().to_string();
                    if customer_name.is_empty() {
                        return Err("empty customer name");
                    }
                }
                RowField::Wp => wp = self.read_count(index, cell),
                RowField::Warehouse(w) => warehouses.set(*w, self.read_count(index, cell)),
                RowField::GrandTotal => grand_total = self.read_count(index, cell),
            }
        }

        Ok(StockRow {
            sl_no: sl_no.ok_or("no sequence number")?,
            customer_name,
            wp,
            warehouses,
            grand_total,
        })
    }

    /// Missing cells count as defaulted, like unreadable ones.
    fn read_count(&mut self, index: usize, cell: Option<&str>) -> u64 {
        let parsed = cell.map_or(CountCell::Invalid, classify_count);
        if parsed.is_defaulted() {
            self.diagnostics.cells_defaulted += 1;
            debug!("Row {}: cell {:?} defaulted to 0", index, cell.unwrap_or("<missing>"));
        }
        parsed.value()
    }

    fn drop_row(&mut self, index: usize, reason: std::fmt::Arguments<'_>) {
        self.diagnostics.rows_dropped += 1;
        debug!("Dropping row {}: {}", index, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_matches_warehouse_order() {
        let warehouses: Vec<WarehouseId> = DATA_ROW_LAYOUT
            .iter()
            .filter_map(|f| match f {
                RowField::Warehouse(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(warehouses, WarehouseId::ALL.to_vec());
        assert_eq!(DATA_ROW_LAYOUT[3], RowField::Warehouse(WarehouseId::Annaram));
        assert_eq!(FOOTER_LAYOUT[FOOTER_WIDTH - 1], FooterField::Overall);
    }

    #[test]
    fn test_accept_row_maps_positions() {
        let mut acc = TableAccumulator::new();
        let cells = ["1", "Acme Co", "5", "10", "1", "2", "3", "4", "5", "6", "7", "38"];
        acc.accept_row(0, &cells, DATA_ROW_WIDTH);

        let scan = acc.finish(TableSource::PlainText).unwrap();
        let row = &scan.rows[0];
        assert_eq!(row.sl_no, 1);
        assert_eq!(row.customer_name, "Acme Co");
        assert_eq!(row.wp, 5);
        assert_eq!(row.warehouses.as_array(), &[10, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(row.grand_total, 38);
    }

    #[test]
    fn test_short_row_is_dropped() {
        let mut acc = TableAccumulator::new();
        acc.accept_row(0, &["1", "Acme", "5", "10", "0"], DATA_ROW_WIDTH);

        assert!(acc.rows.is_empty());
        assert_eq!(acc.diagnostics.rows_dropped, 1);
        assert_eq!(acc.finish(TableSource::PlainText).unwrap_err(), ExtractionError::EmptyTable);
    }

    #[test]
    fn test_missing_grand_total_cell_defaults() {
        let mut acc = TableAccumulator::new();
        let cells = ["2", "Beta", "1", "x", "0", "0", "0", "0", "0", "0", "0"];
        acc.accept_row(0, &cells, DATA_ROW_WIDTH - 1);

        let scan = acc.finish(TableSource::Markup).unwrap();
        assert_eq!(scan.rows[0].grand_total, 0);
        assert_eq!(scan.diagnostics.cells_defaulted, 2);
    }

    #[test]
    fn test_first_footer_wins() {
        let mut acc = TableAccumulator::new();
        acc.accept_footer(0, &["1", "2", "3", "4", "5", "6", "7", "8", "36"]);
        acc.accept_footer(1, &["9", "9", "9", "9", "9", "9", "9", "9", "72"]);
        acc.accept_row(2, &["1", "A", "0", "0", "0", "0", "0", "0", "0", "0", "0", "0"], DATA_ROW_WIDTH);

        let scan = acc.finish(TableSource::PlainText).unwrap();
        let totals = scan.grand_totals.unwrap();
        assert_eq!(totals.warehouses.get(WarehouseId::Annaram), 1);
        assert_eq!(totals.overall, 36);
        assert_eq!(scan.diagnostics.footers_ignored, 1);
    }
}
