use pretty_assertions::assert_eq;
use stockmail_core::extract::rules::normalize_count;
use stockmail_core::{
    extract_report, ContentType, ExtractionError, ReportParser, StockReportParser, TableSource,
    WarehouseId,
};

const DATE_LINE: &str = "Major Customer Stock Report as on - 23.02.2026";
const HEADER: &str = "Sl No\tCustomer Name\tWp\tAnnaram\tKothur\tNarkhuda\tP2\tP4\tP5\tP6\tPrime Pack\tGrand Total";
const ACME: &str = "1\tAcme Co\t5\t10\t0\t0\t0\t0\t0\t0\t0\t10";
const FOOTER: &str = "Grand Total\t10\t0\t0\t0\t0\t0\t0\t0\t10";

fn plain(lines: &[&str]) -> String {
    lines.join("\n")
}

#[test]
fn scenario_a_plain_text_report() {
    let body = plain(&[DATE_LINE, HEADER, ACME, FOOTER]);
    let report = extract_report(&body, ContentType::PlainText).expect("report");

    assert_eq!(report.report_date_str, "23.02.2026");
    assert_eq!(report.report_date.to_string(), "2026-02-23");
    assert_eq!(report.rows.len(), 1);

    let row = &report.rows[0];
    assert_eq!(row.sl_no, 1);
    assert_eq!(row.customer_name, "Acme Co");
    assert_eq!(row.wp, 5);
    assert_eq!(row.count(WarehouseId::Annaram), 10);
    for warehouse in &WarehouseId::ALL[1..] {
        assert_eq!(row.count(*warehouse), 0, "{}", warehouse);
    }
    assert_eq!(row.grand_total, 10);

    let totals = report.grand_totals.expect("grand totals");
    assert_eq!(totals.warehouses.get(WarehouseId::Annaram), 10);
    assert_eq!(totals.overall, 10);
}

#[test]
fn scenario_b_missing_date() {
    let body = plain(&[HEADER, ACME, FOOTER]);
    assert_eq!(
        extract_report(&body, ContentType::PlainText).unwrap_err(),
        ExtractionError::MissingDate
    );
}

#[test]
fn scenario_c_malformed_row_dropped() {
    let body = plain(&[DATE_LINE, HEADER, ACME, "2\tBroken\t1\t2\t3", FOOTER]);
    let result = StockReportParser::new()
        .parse(&body, ContentType::PlainText)
        .expect("report");

    assert_eq!(result.report.rows.len(), 1);
    assert_eq!(result.report.rows[0].customer_name, "Acme Co");
    assert_eq!(result.diagnostics.rows_dropped, 1);
}

#[test]
fn scenario_d_html_with_decorative_rows() {
    let html = r#"
        <html><body>
        <p>Dear Team,</p>
        <p>Major Customer Stock Report as on - 23.02.2026</p>
        <table border="1">
          <tr><td colspan="12">PREMIER ENERGIES - STOCK SUMMARY</td></tr>
          <tr><td>Units in nos</td></tr>
          <tr><th>Sl No</th><th>Customer Name</th><th>Wp</th><th>Annaram</th><th>Kothur</th><th>Narkhuda</th>
              <th>P2</th><th>P4</th><th>P5</th><th>P6</th><th>Prime Pack</th><th>Grand Total</th></tr>
          <tr><td>1</td><td>Acme Co</td><td>5</td><td>10</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>10</td></tr>
          <tr><td colspan="12">&nbsp;</td></tr>
          <tr><td>2</td><td>Short Row</td><td>1</td></tr>
          <tr><td>Grand Total</td><td>10</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>0</td><td>10</td></tr>
          <tr><td colspan="12">Generated automatically</td></tr>
        </table>
        <p>Regards</p>
        </body></html>
    "#;

    let result = StockReportParser::new()
        .parse(html, ContentType::Html)
        .expect("report");

    assert_eq!(result.source, TableSource::Markup);
    assert_eq!(result.report.rows.len(), 1);
    assert_eq!(result.report.rows[0].customer_name, "Acme Co");
    assert_eq!(result.report.grand_totals.expect("totals").overall, 10);
    assert_eq!(result.diagnostics.rows_dropped, 3);
}

#[test]
fn markup_and_plain_text_rows_are_equivalent() {
    let html = format!(
        "<p>{}</p><table><tr><td>Sl No</td><td>Customer Name</td></tr>\
         <tr><td>7</td><td>Delta Corp</td><td>3</td><td>1</td><td>2</td><td>3</td><td>4</td>\
         <td>5</td><td>6</td><td>7</td><td>8</td><td>36</td></tr></table>",
        DATE_LINE
    );
    let text = plain(&[
        DATE_LINE,
        HEADER,
        "7\tDelta Corp\t3\t1\t2\t3\t4\t5\t6\t7\t8\t36",
    ]);

    let from_html = extract_report(&html, ContentType::Html).expect("html report");
    let from_text = extract_report(&text, ContentType::PlainText).expect("text report");

    assert_eq!(from_html.rows, from_text.rows);
    assert_eq!(from_html.rows[0].warehouses.as_array(), &[1, 2, 3, 4, 5, 6, 7, 8]);
}

#[test]
fn first_grand_total_wins() {
    let body = plain(&[
        DATE_LINE,
        HEADER,
        ACME,
        FOOTER,
        "Grand Total\t99\t0\t0\t0\t0\t0\t0\t0\t99",
    ]);
    let result = StockReportParser::new()
        .parse(&body, ContentType::PlainText)
        .expect("report");

    assert_eq!(result.report.grand_totals.expect("totals").overall, 10);
    assert_eq!(result.diagnostics.footers_ignored, 1);
}

#[test]
fn eleven_field_line_is_not_padded() {
    let body = plain(&[DATE_LINE, HEADER, "1\tAcme Co\t5\t10\t0\t0\t0\t0\t0\t0\t0"]);
    assert_eq!(
        extract_report(&body, ContentType::PlainText).unwrap_err(),
        ExtractionError::EmptyTable
    );
}

#[test]
fn extraction_is_idempotent() {
    let inputs = [
        (plain(&[DATE_LINE, HEADER, ACME, FOOTER]), ContentType::PlainText),
        (plain(&[HEADER, ACME]), ContentType::PlainText),
        ("<table><tr><td>x</td></tr></table>".to_string(), ContentType::Html),
        (String::new(), ContentType::Html),
    ];

    let parser = StockReportParser::new();
    for (body, content_type) in &inputs {
        assert_eq!(parser.parse(body, *content_type), parser.parse(body, *content_type));
    }
}

#[test]
fn numeric_normalization_is_total() {
    let cases = [
        ("", 0),
        (" ", 0),
        ("-", 0),
        ("\t", 0),
        ("abc", 0),
        ("-7", 0),
        ("3.5", 3),
        ("1e5", 1),
        ("1,234", 1234),
        ("\u{663}", 0),
        ("18446744073709551615", u64::MAX),
        ("18446744073709551616", 0),
    ];
    for (cell, expected) in cases {
        assert_eq!(normalize_count(cell), expected, "{:?}", cell);
    }
}

#[test]
fn report_json_matches_document_shape() {
    let body = plain(&[DATE_LINE, HEADER, ACME, FOOTER]);
    let report = extract_report(&body, ContentType::PlainText).expect("report");
    let json = serde_json::to_value(&report).expect("json");

    assert_eq!(json["reportDateStr"], "23.02.2026");
    assert_eq!(json["reportDate"], "2026-02-23");
    assert_eq!(json["rows"][0]["customerName"], "Acme Co");
    assert_eq!(json["rows"][0]["annaramWarehouse"], 10);
    assert_eq!(json["grandTotals"]["overall"], 10);
}
