//! Parse command - extract the stock report from a single email body.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use stockmail_core::models::config::ExtractionConfig;
use stockmail_core::{
    ContentType, ExtractionResult, ParsedReport, ReportParser, StockReportParser, WarehouseId,
};

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file holding the email body (HTML or plain text)
    #[arg(required = true)]
    input: PathBuf,

    /// Content type of the body (default: from extension, then config)
    #[arg(long, value_parser = parse_content_type)]
    content_type: Option<ContentType>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show dropped rows and defaulted cells
    #[arg(long)]
    diagnostics: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used when writing this format to a directory.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub(crate) fn parse_content_type(s: &str) -> Result<ContentType, String> {
    s.parse::<ContentType>().map_err(|e| e.to_string())
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Parsing file: {}", args.input.display());

    let result = extract_file(&args.input, args.content_type, &config.extraction)?;
    let output = format_report(&result.report, args.format, config.output.pretty_json)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.diagnostics {
        let d = &result.diagnostics;
        eprintln!();
        eprintln!("{} Table source: {:?}", style("ℹ").blue(), result.source);
        eprintln!(
            "{} Rows seen: {}, dropped: {}",
            style("ℹ").blue(),
            d.rows_seen,
            d.rows_dropped
        );
        eprintln!(
            "{} Cells defaulted: {}, footers ignored: {}",
            style("ℹ").blue(),
            d.cells_defaulted,
            d.footers_ignored
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Pick the content type: explicit flag, then file extension, then config.
pub fn resolve_content_type(
    path: &Path,
    explicit: Option<ContentType>,
    config: &ExtractionConfig,
) -> ContentType {
    explicit
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ContentType::from_extension)
        })
        .unwrap_or(config.default_content_type)
}

/// Read one file and extract its report.
pub fn extract_file(
    path: &Path,
    content_type: Option<ContentType>,
    config: &ExtractionConfig,
) -> anyhow::Result<ExtractionResult> {
    let bytes = fs::read(path)?;
    let body = String::from_utf8_lossy(&bytes);
    let content_type = resolve_content_type(path, content_type, config);

    debug!("Reading {} as {}", path.display(), content_type);

    let parser = StockReportParser::from_config(config);
    Ok(parser.parse(&body, content_type)?)
}

/// Render a report in the requested format.
pub fn format_report(
    report: &ParsedReport,
    format: OutputFormat,
    pretty_json: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty_json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Json => Ok(serde_json::to_string(report)?),
        OutputFormat::Csv => format_report_csv(report),
        OutputFormat::Text => Ok(format_report_text(report)),
    }
}

pub fn format_report_csv(report: &ParsedReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Sl No", "Customer Name", "WP"];
    header.extend(WarehouseId::ALL.iter().map(|w| w.label()));
    header.push("Grand Total");
    wtr.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![
            row.sl_no.to_string(),
            row.customer_name.clone(),
            row.wp.to_string(),
        ];
        record.extend(row.warehouses.iter().map(|(_, count)| count.to_string()));
        record.push(row.grand_total.to_string());
        wtr.write_record(&record)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_report_text(report: &ParsedReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("Stock report: {}\n", report.report_date_str));
    output.push_str(&format!(
        "Rows: {} ({} customers)\n",
        report.rows.len(),
        report.customer_count()
    ));
    output.push('\n');

    match &report.grand_totals {
        Some(totals) => {
            output.push_str("Grand totals:\n");
            for warehouse in totals.active_warehouses() {
                output.push_str(&format!(
                    "  {:<12} {}\n",
                    format!("{}:", warehouse),
                    totals.warehouses.get(warehouse)
                ));
            }
            output.push_str(&format!("  {:<12} {}\n", "Overall:", totals.overall));
        }
        None => output.push_str("Grand totals: not present\n"),
    }

    output
}
