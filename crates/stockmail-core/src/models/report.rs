//! Stock report data models.
//!
//! Field names serialize in camelCase so JSON output has the same shape as
//! the stored report documents (`slNo`, `customerName`, `annaramWarehouse`, ...).

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::error::ExtractionError;

/// Number of warehouse columns in every stock table.
pub const WAREHOUSE_COUNT: usize = 8;

/// Storage locations reported in the stock table, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WarehouseId {
    #[serde(rename = "annaramWarehouse")]
    Annaram,
    #[serde(rename = "kothurWarehouse")]
    Kothur,
    #[serde(rename = "narkudaWarehouse")]
    Narkhuda,
    #[serde(rename = "p2Warehouse")]
    P2,
    #[serde(rename = "p4Warehouse")]
    P4,
    #[serde(rename = "p5Warehouse")]
    P5,
    #[serde(rename = "p6Warehouse")]
    P6,
    #[serde(rename = "primePackWarehouse")]
    PrimePack,
}

impl WarehouseId {
    /// All warehouses in table column order.
    pub const ALL: [WarehouseId; WAREHOUSE_COUNT] = [
        WarehouseId::Annaram,
        WarehouseId::Kothur,
        WarehouseId::Narkhuda,
        WarehouseId::P2,
        WarehouseId::P4,
        WarehouseId::P5,
        WarehouseId::P6,
        WarehouseId::PrimePack,
    ];

    /// Zero-based column position among the warehouse columns.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Serialized field name.
    pub fn key(self) -> &'static str {
        match self {
            Self::Annaram => "annaramWarehouse",
            Self::Kothur => "kothurWarehouse",
            Self::Narkhuda => "narkudaWarehouse",
            Self::P2 => "p2Warehouse",
            Self::P4 => "p4Warehouse",
            Self::P5 => "p5Warehouse",
            Self::P6 => "p6Warehouse",
            Self::PrimePack => "primePackWarehouse",
        }
    }

    /// Human-readable column label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Annaram => "Annaram",
            Self::Kothur => "Kothur",
            Self::Narkhuda => "Narkhuda",
            Self::P2 => "P2",
            Self::P4 => "P4",
            Self::P5 => "P5",
            Self::P6 => "P6",
            Self::PrimePack => "Prime Pack",
        }
    }

    /// Look up a warehouse by its serialized field name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.key() == key)
    }
}

impl fmt::Display for WarehouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognized warehouse name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown warehouse: {0}")]
pub struct ParseWarehouseError(String);

impl FromStr for WarehouseId {
    type Err = ParseWarehouseError;

    /// Accepts a serialized key (`kothurWarehouse`) or a label (`prime pack`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        Self::ALL
            .into_iter()
            .find(|w| {
                w.key().eq_ignore_ascii_case(&wanted)
                    || w.label().replace(' ', "").eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| ParseWarehouseError(s.to_string()))
    }
}

/// One count per warehouse, indexed by [`WarehouseId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarehouseCounts([u64; WAREHOUSE_COUNT]);

impl WarehouseCounts {
    pub fn new(counts: [u64; WAREHOUSE_COUNT]) -> Self {
        Self(counts)
    }

    pub fn get(&self, warehouse: WarehouseId) -> u64 {
        self.0[warehouse.index()]
    }

    pub fn set(&mut self, warehouse: WarehouseId, count: u64) {
        self.0[warehouse.index()] = count;
    }

    /// Iterate `(warehouse, count)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (WarehouseId, u64)> + '_ {
        WarehouseId::ALL.into_iter().map(move |w| (w, self.get(w)))
    }

    /// Sum across all warehouses, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.0.iter().copied().fold(0, u64::saturating_add)
    }

    pub fn as_array(&self) -> &[u64; WAREHOUSE_COUNT] {
        &self.0
    }
}

impl Serialize for WarehouseCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(WAREHOUSE_COUNT))?;
        for (warehouse, count) in self.iter() {
            map.serialize_entry(warehouse.key(), &count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WarehouseCounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountsVisitor;

        impl<'de> Visitor<'de> for CountsVisitor {
            type Value = WarehouseCounts;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of warehouse counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut counts = WarehouseCounts::default();
                while let Some(key) = access.next_key::<String>()? {
                    match WarehouseId::from_key(&key) {
                        Some(warehouse) => counts.set(warehouse, access.next_value()?),
                        None => {
                            access.next_value::<IgnoredAny>()?;
                        }
                    }
                }
                Ok(counts)
            }
        }

        deserializer.deserialize_map(CountsVisitor)
    }
}

/// One customer's stock line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    /// Sequence number from the first column.
    pub sl_no: u32,

    /// Customer name, case preserved.
    pub customer_name: String,

    /// Secondary numeric identifier ("WP" column).
    pub wp: u64,

    /// Per-warehouse stock counts.
    #[serde(flatten)]
    pub warehouses: WarehouseCounts,

    /// Row total as printed in the report.
    pub grand_total: u64,
}

impl StockRow {
    pub fn count(&self, warehouse: WarehouseId) -> u64 {
        self.warehouses.get(warehouse)
    }

    /// Sum of the warehouse columns. Not checked against `grand_total`.
    pub fn warehouse_sum(&self) -> u64 {
        self.warehouses.total()
    }
}

/// The report-wide footer row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotals {
    #[serde(flatten)]
    pub warehouses: WarehouseCounts,

    pub overall: u64,
}

impl GrandTotals {
    /// Warehouses with a non-zero total, in column order.
    pub fn active_warehouses(&self) -> Vec<WarehouseId> {
        self.warehouses
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(warehouse, _)| warehouse)
            .collect()
    }
}

/// A successfully extracted stock report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedReport {
    /// Date token exactly as it appeared, `DD.MM.YYYY`.
    pub report_date_str: String,

    /// Resolved calendar date.
    pub report_date: NaiveDate,

    /// Data rows in table order. Never empty.
    pub rows: Vec<StockRow>,

    /// Footer totals, if the table had a grand-total row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_totals: Option<GrandTotals>,
}

impl ParsedReport {
    /// Assemble a report, rejecting an empty row sequence.
    pub fn new(
        report_date_str: impl Into<String>,
        report_date: NaiveDate,
        rows: Vec<StockRow>,
        grand_totals: Option<GrandTotals>,
    ) -> Result<Self, ExtractionError> {
        if rows.is_empty() {
            return Err(ExtractionError::EmptyTable);
        }

        Ok(Self {
            report_date_str: report_date_str.into(),
            report_date,
            rows,
            grand_totals,
        })
    }

    /// The report date at UTC midnight.
    pub fn report_timestamp(&self) -> DateTime<Utc> {
        self.report_date.and_time(NaiveTime::MIN).and_utc()
    }

    /// Number of distinct customers, compared case-insensitively.
    pub fn customer_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.customer_name.to_lowercase())
            .collect::<HashSet<_>>()
            .len()
    }

    /// First row whose customer name matches, ignoring case.
    pub fn find_customer(&self, name: &str) -> Option<&StockRow> {
        let name = name.trim().to_lowercase();
        self.rows
            .iter()
            .find(|r| r.customer_name.to_lowercase() == name)
    }

    /// Suggested file name for a CSV export of this report.
    pub fn csv_file_name(&self) -> String {
        format!("stock_{}.csv", self.report_date_str)
    }
}
