//! Summary statistics over a set of extracted reports.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{GrandTotals, ParsedReport, WarehouseId};

/// Aggregate view over several reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_reports: usize,
    pub latest_report: Option<String>,
    pub oldest_report: Option<String>,
    /// Distinct customer names across all reports, ignoring case.
    pub unique_customers: usize,
    /// Overall grand total of the latest report, 0 if it had no footer.
    pub latest_grand_total: u64,
    /// Per customer and wp, sorted by total stock descending.
    pub customers: Vec<CustomerTotal>,
}

/// One customer's stock summed over all reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTotal {
    pub customer_name: String,
    pub wp: u64,
    pub total_stock: u64,
    pub latest_date: NaiveDate,
}

impl ReportSummary {
    /// Summarize reports in any order.
    pub fn from_reports(reports: &[ParsedReport]) -> Self {
        let latest = reports.iter().max_by_key(|r| r.report_date);
        let oldest = reports.iter().min_by_key(|r| r.report_date);

        let unique_customers = reports
            .iter()
            .flat_map(|r| r.rows.iter())
            .map(|row| row.customer_name.to_lowercase())
            .collect::<HashSet<_>>()
            .len();

        let mut by_customer: HashMap<(String, u64), CustomerTotal> = HashMap::new();
        for report in reports {
            for row in &report.rows {
                let entry = by_customer
                    .entry((row.customer_name.clone(), row.wp))
                    .or_insert_with(|| CustomerTotal {
                        customer_name: row.customer_name.clone(),
                        wp: row.wp,
                        total_stock: 0,
                        latest_date: report.report_date,
                    });
                entry.total_stock = entry.total_stock.saturating_add(row.grand_total);
                entry.latest_date = entry.latest_date.max(report.report_date);
            }
        }

        let mut customers: Vec<CustomerTotal> = by_customer.into_values().collect();
        customers.sort_by(|a, b| {
            b.total_stock
                .cmp(&a.total_stock)
                .then_with(|| a.customer_name.cmp(&b.customer_name))
                .then_with(|| a.wp.cmp(&b.wp))
        });

        Self {
            total_reports: reports.len(),
            latest_report: latest.map(|r| r.report_date_str.clone()),
            oldest_report: oldest.map(|r| r.report_date_str.clone()),
            unique_customers,
            latest_grand_total: latest
                .and_then(|r| r.grand_totals)
                .map_or(0, |t| t.overall),
            customers,
        }
    }
}

/// One reading in a customer's stock series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: String,
    #[serde(rename = "dateISO")]
    pub date_iso: NaiveDate,
    pub value: u64,
}

/// Stock over time for one customer and wp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSeries {
    pub customer_name: String,
    pub wp: u64,
    pub data: Vec<SeriesPoint>,
}

/// Build per-customer series over reports in date order.
///
/// `customers` filters by name, ignoring case. `warehouse` picks the column;
/// `None` uses the row grand total. Series appear in first-seen order.
pub fn customer_timeseries(
    reports: &[ParsedReport],
    customers: Option<&[String]>,
    warehouse: Option<WarehouseId>,
) -> Vec<CustomerSeries> {
    let filter: Option<HashSet<String>> =
        customers.map(|names| names.iter().map(|n| n.trim().to_lowercase()).collect());

    let mut ordered: Vec<&ParsedReport> = reports.iter().collect();
    ordered.sort_by_key(|r| r.report_date);

    let mut series: Vec<CustomerSeries> = Vec::new();
    let mut index: HashMap<(String, u64), usize> = HashMap::new();

    for report in ordered {
        for row in &report.rows {
            if let Some(filter) = &filter {
                if !filter.contains(&row.customer_name.to_lowercase()) {
                    continue;
                }
            }

            let slot = *index
                .entry((row.customer_name.clone(), row.wp))
                .or_insert_with(|| {
                    series.push(CustomerSeries {
                        customer_name: row.customer_name.clone(),
                        wp: row.wp,
                        data: Vec::new(),
                    });
                    series.len() - 1
                });

            series[slot].data.push(SeriesPoint {
                date: report.report_date_str.clone(),
                date_iso: report.report_date,
                value: warehouse.map_or(row.grand_total, |w| row.count(w)),
            });
        }
    }

    series
}

/// Footer totals of one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseTotals {
    pub report_date_str: String,
    pub report_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grand_totals: Option<GrandTotals>,
}

/// Grand totals of every report, oldest first.
pub fn warehouse_totals(reports: &[ParsedReport]) -> Vec<WarehouseTotals> {
    let mut totals: Vec<WarehouseTotals> = reports
        .iter()
        .map(|r| WarehouseTotals {
            report_date_str: r.report_date_str.clone(),
            report_date: r.report_date,
            grand_totals: r.grand_totals,
        })
        .collect();
    totals.sort_by_key(|t| t.report_date);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StockRow, WarehouseCounts};
    use pretty_assertions::assert_eq;

    fn report(date: (i32, u32, u32), rows: &[(&str, u64, u64)], overall: Option<u64>) -> ParsedReport {
        let (y, m, d) = date;
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (name, wp, total))| StockRow {
                sl_no: i as u32 + 1,
                customer_name: name.to_string(),
                wp: *wp,
                warehouses: WarehouseCounts::default(),
                grand_total: *total,
            })
            .collect();
        ParsedReport::new(
            format!("{:02}.{:02}.{}", d, m, y),
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            rows,
            overall.map(|overall| GrandTotals {
                overall,
                ..Default::default()
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_summary_over_reports() {
        let reports = vec![
            report((2026, 2, 24), &[("Acme", 5, 10), ("Beta", 1, 40)], Some(50)),
            report((2026, 2, 23), &[("ACME", 5, 7), ("Acme", 5, 3)], None),
        ];

        let summary = ReportSummary::from_reports(&reports);

        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.latest_report.as_deref(), Some("24.02.2026"));
        assert_eq!(summary.oldest_report.as_deref(), Some("23.02.2026"));
        assert_eq!(summary.unique_customers, 2);
        assert_eq!(summary.latest_grand_total, 50);

        let names: Vec<(&str, u64)> = summary
            .customers
            .iter()
            .map(|c| (c.customer_name.as_str(), c.total_stock))
            .collect();
        assert_eq!(names, vec![("Beta", 40), ("Acme", 13), ("ACME", 7)]);
        assert_eq!(
            summary.customers[1].latest_date,
            NaiveDate::from_ymd_opt(2026, 2, 24).unwrap()
        );
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(ReportSummary::from_reports(&[]), ReportSummary::default());
    }

    #[test]
    fn test_customer_totals_saturate() {
        let reports = vec![
            report((2026, 2, 23), &[("Acme", 5, u64::MAX)], None),
            report((2026, 2, 24), &[("Acme", 5, u64::MAX)], None),
        ];

        let summary = ReportSummary::from_reports(&reports);
        assert_eq!(summary.customers[0].total_stock, u64::MAX);
    }

    #[test]
    fn test_customer_timeseries_by_date() {
        let mut later = report((2026, 2, 24), &[("Acme", 5, 12), ("Beta", 1, 40)], None);
        later.rows[0].warehouses.set(WarehouseId::Kothur, 9);
        let reports = vec![later, report((2026, 2, 23), &[("Acme", 5, 10)], None)];

        let series = customer_timeseries(&reports, None, None);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].customer_name, "Acme");
        let values: Vec<(&str, u64)> = series[0]
            .data
            .iter()
            .map(|p| (p.date.as_str(), p.value))
            .collect();
        assert_eq!(values, vec![("23.02.2026", 10), ("24.02.2026", 12)]);

        let kothur = customer_timeseries(&reports, None, Some(WarehouseId::Kothur));
        let values: Vec<u64> = kothur[0].data.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 9]);
    }

    #[test]
    fn test_customer_timeseries_filter_ignores_case() {
        let reports = vec![report((2026, 2, 23), &[("Acme", 5, 10), ("Beta", 1, 40)], None)];
        let filter = vec![" BETA ".to_string()];

        let series = customer_timeseries(&reports, Some(&filter), None);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].customer_name, "Beta");
        assert_eq!(series[0].data[0].value, 40);
    }

    #[test]
    fn test_timeseries_json_shape() {
        let reports = vec![report((2026, 2, 23), &[("Acme", 5, 10)], None)];
        let json = serde_json::to_value(customer_timeseries(&reports, None, None)).unwrap();

        assert_eq!(json[0]["customerName"], "Acme");
        assert_eq!(json[0]["data"][0]["date"], "23.02.2026");
        assert_eq!(json[0]["data"][0]["dateISO"], "2026-02-23");
        assert_eq!(json[0]["data"][0]["value"], 10);
    }

    #[test]
    fn test_warehouse_totals_in_date_order() {
        let reports = vec![
            report((2026, 2, 24), &[("Acme", 5, 10)], Some(50)),
            report((2026, 2, 23), &[("Acme", 5, 10)], None),
        ];

        let totals = warehouse_totals(&reports);
        let dates: Vec<&str> = totals.iter().map(|t| t.report_date_str.as_str()).collect();
        assert_eq!(dates, vec!["23.02.2026", "24.02.2026"]);
        assert_eq!(totals[0].grand_totals, None);
        assert_eq!(totals[1].grand_totals.map(|t| t.overall), Some(50));
    }
}
