//! Data models and configuration.

pub mod config;
pub mod report;

pub use config::StockmailConfig;
pub use report::{
    GrandTotals, ParseWarehouseError, ParsedReport, StockRow, WarehouseCounts, WarehouseId,
    WAREHOUSE_COUNT,
};
