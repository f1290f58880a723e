//! Common regex patterns for stock report extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Major Customer Stock [Report] as on - DD.MM.YYYY", hyphen or en-dash
    pub static ref REPORT_DATE: Regex = Regex::new(
        r"(?i)Major\s+Customer\s+Stock(?:\s+Report)?\s+as\s+on\s*[-\u{2013}]\s*([0-9]{2}\.[0-9]{2}\.[0-9]{4})"
    ).unwrap();

    // Table header markers
    pub static ref SL_NO: Regex = Regex::new(r"(?i)Sl\s*No").unwrap();

    pub static ref SL_NO_LINE: Regex = Regex::new(r"(?i)^Sl\s*No").unwrap();

    pub static ref CUSTOMER_NAME: Regex = Regex::new(r"(?i)Customer\s*Name").unwrap();

    // Footer marker
    pub static ref GRAND_TOTAL: Regex = Regex::new(r"(?i)^Grand\s*Total").unwrap();

    // Plain-text field separator
    pub static ref TAB_RUN: Regex = Regex::new(r"\t+").unwrap();

    // Markup sniffing
    pub static ref TABLE_TAG: Regex = Regex::new(r"(?i)<table").unwrap();

    pub static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}
