//! Batch command for multiple report email bodies.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use stockmail_core::models::config::ExtractionConfig;
use stockmail_core::{
    customer_timeseries, warehouse_totals, ContentType, ExtractionResult, ParsedReport,
    ReportSummary, WarehouseId, WarehouseTotals,
};

use super::load_config;
use super::parse::{extract_file, format_report, parse_content_type, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching the input files
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Content type for every file (default: from extension, then config)
    #[arg(long, value_parser = parse_content_type)]
    content_type: Option<ContentType>,

    /// Also generate summary and warehouse total CSVs and print customer totals
    #[arg(long)]
    summary: bool,

    /// Also write per-customer stock series to timeseries.json
    #[arg(long)]
    timeseries: bool,

    /// Warehouse column for the series (default: grand total)
    #[arg(long, value_parser = parse_warehouse, requires = "timeseries")]
    warehouse: Option<WarehouseId>,

    /// Only include these customers in the series (comma-separated)
    #[arg(long, value_delimiter = ',', requires = "timeseries")]
    customers: Option<Vec<String>>,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// What happened to one input file.
enum Outcome {
    Extracted(ExtractionResult),
    DuplicateDate(String),
    Failed(String),
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    outcome: Outcome,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn report(&self) -> Option<&ParsedReport> {
        match &self.outcome {
            Outcome::Extracted(result) => Some(&result.report),
            _ => None,
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            config.batch.accepts_extension(ext)
        })
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    debug!("Extracting with {} workers", jobs);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extracted = extract_all(
        files,
        args.content_type,
        &config.extraction,
        jobs,
        &overall_pb,
    )
    .await?;

    overall_pb.finish_with_message("Complete");

    // Results arrive in file order, so the first file with a date wins
    let mut seen_dates = HashSet::new();
    let mut results = Vec::with_capacity(extracted.len());

    for (path, outcome, processing_time_ms) in extracted {
        let outcome = match outcome {
            Ok(result) => {
                let date = result.report.report_date_str.clone();
                if !seen_dates.insert(date.clone()) && config.batch.skip_duplicate_dates {
                    info!("Skipping {}: report {} already extracted", path.display(), date);
                    Outcome::DuplicateDate(date)
                } else {
                    Outcome::Extracted(result)
                }
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    Outcome::Failed(error_msg)
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        };

        results.push(ProcessResult {
            path,
            outcome,
            processing_time_ms,
        });
    }

    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            if let Some(report) = result.report() {
                let output_path = output_path_for(
                    output_dir,
                    &result.path,
                    report,
                    args.format,
                    config.batch.skip_duplicate_dates,
                );
                let content = format_report(report, args.format, config.output.pretty_json)?;
                fs::write(&output_path, content)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    let reports: Vec<ParsedReport> = results.iter().filter_map(|r| r.report()).cloned().collect();
    let report_path = |name: &str| {
        args.output_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    };

    if args.summary {
        let summary_path = report_path("summary.csv");
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );

        let totals_path = report_path("warehouse_totals.csv");
        write_warehouse_totals(&totals_path, &warehouse_totals(&reports))?;
        println!(
            "{} Warehouse totals written to {}",
            style("✓").green(),
            totals_path.display()
        );

        print_report_summary(&ReportSummary::from_reports(&reports));
    }

    if args.timeseries {
        let series = customer_timeseries(&reports, args.customers.as_deref(), args.warehouse);
        let column = args.warehouse.map_or("grandTotal", |w| w.key());
        let document = serde_json::json!({ "warehouse": column, "data": series });

        let series_path = report_path("timeseries.json");
        let content = if config.output.pretty_json {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        fs::write(&series_path, content)?;
        println!(
            "{} {} customer series written to {}",
            style("✓").green(),
            series.len(),
            series_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.report().is_some()).count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::DuplicateDate(_)))
        .count();
    let failed: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.outcome {
            Outcome::Failed(e) => Some((&r.path, e)),
            _ => None,
        })
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} skipped, {} failed",
        style(successful).green(),
        style(skipped).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

type FileOutcome = (PathBuf, anyhow::Result<ExtractionResult>, u64);

/// Extract every file on the blocking pool, at most `jobs` at a time.
async fn extract_all(
    files: Vec<PathBuf>,
    content_type: Option<ContentType>,
    config: &ExtractionConfig,
    jobs: usize,
    pb: &ProgressBar,
) -> anyhow::Result<Vec<FileOutcome>> {
    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut handles = Vec::with_capacity(files.len());

    for path in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let config = config.clone();
        let pb = pb.clone();

        handles.push(tokio::task::spawn_blocking(move || {
            let file_start = Instant::now();
            let result = extract_file(&path, content_type, &config);
            let processing_time_ms = file_start.elapsed().as_millis() as u64;

            pb.inc(1);
            drop(permit);
            (path, result, processing_time_ms)
        }));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        outcomes.push(handle.await?);
    }

    Ok(outcomes)
}

fn parse_warehouse(s: &str) -> Result<WarehouseId, String> {
    s.parse::<WarehouseId>().map_err(|e| e.to_string())
}

/// CSV exports are named by report date; the input stem is prepended
/// when dates may repeat within a run.
fn output_path_for(
    output_dir: &Path,
    input: &Path,
    report: &ParsedReport,
    format: OutputFormat,
    unique_dates: bool,
) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");

    match format {
        OutputFormat::Csv if unique_dates => output_dir.join(report.csv_file_name()),
        OutputFormat::Csv => output_dir.join(format!("{}_{}", stem, report.csv_file_name())),
        _ => output_dir.join(format!("{}.{}", stem, format.extension())),
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "report_date",
        "rows",
        "grand_total",
        "rows_dropped",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            Outcome::Extracted(extracted) => {
                let report = &extracted.report;
                wtr.write_record([
                    filename,
                    "success",
                    &report.report_date_str,
                    &report.rows.len().to_string(),
                    &report
                        .grand_totals
                        .map(|t| t.overall.to_string())
                        .unwrap_or_default(),
                    &extracted.diagnostics.rows_dropped.to_string(),
                    &time_ms,
                    "",
                ])?;
            }
            Outcome::DuplicateDate(date) => {
                wtr.write_record([filename, "skipped", date, "", "", "", &time_ms, ""])?;
            }
            Outcome::Failed(error) => {
                wtr.write_record([filename, "error", "", "", "", "", &time_ms, error])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

fn write_warehouse_totals(path: &Path, totals: &[WarehouseTotals]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["report_date"];
    header.extend(WarehouseId::ALL.iter().map(|w| w.label()));
    header.push("Grand Total");
    wtr.write_record(&header)?;

    for entry in totals {
        let mut record = vec![entry.report_date_str.clone()];
        match &entry.grand_totals {
            Some(t) => {
                record.extend(t.warehouses.iter().map(|(_, count)| count.to_string()));
                record.push(t.overall.to_string());
            }
            None => record.extend(std::iter::repeat_n(String::new(), header.len() - 1)),
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn print_report_summary(summary: &ReportSummary) {
    println!();
    println!("{}", style("Report summary:").bold());
    println!("  Reports:          {}", summary.total_reports);
    if let (Some(oldest), Some(latest)) = (&summary.oldest_report, &summary.latest_report) {
        println!("  Date range:       {} to {}", oldest, latest);
    }
    println!("  Unique customers: {}", summary.unique_customers);
    println!("  Latest total:     {}", summary.latest_grand_total);

    if !summary.customers.is_empty() {
        println!();
        println!("  {:<40} {:>8} {:>12}", "Customer", "WP", "Total");
        for customer in summary.customers.iter().take(10) {
            println!(
                "  {:<40} {:>8} {:>12}",
                customer.customer_name, customer.wp, customer.total_stock
            );
        }
    }
}
