//! Core library for stock report email extraction.
//!
//! This crate provides:
//! - Report date recognition (`Major Customer Stock as on - DD.MM.YYYY`)
//! - Stock table walkers for HTML and tab-separated plain-text bodies
//! - Report data models with one count per warehouse
//! - Summary statistics over several extracted reports

pub mod error;
pub mod extract;
pub mod models;
pub mod summary;

pub use error::{ExtractionError, Result, StockmailError};
pub use extract::{
    extract_report, ContentType, ExtractionDiagnostics, ExtractionResult, ReportParser,
    StockReportParser, TableSource,
};
pub use models::{GrandTotals, ParsedReport, StockRow, StockmailConfig, WarehouseCounts, WarehouseId};
pub use summary::{
    customer_timeseries, warehouse_totals, CustomerSeries, CustomerTotal, ReportSummary, SeriesPoint,
    WarehouseTotals,
};
