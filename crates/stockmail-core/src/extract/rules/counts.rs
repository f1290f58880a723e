//! Numeric cell normalization.
//!
//! Every count in a [`StockRow`](crate::models::StockRow) or
//! [`GrandTotals`](crate::models::GrandTotals) passes through here. Cells
//! never fail: anything unreadable becomes zero.

/// How a count cell was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCell {
    /// Empty, whitespace or the `-` placeholder.
    Blank,
    /// A readable non-negative count.
    Value(u64),
    /// Text with no leading digits, a negative sign, or an overflowing value.
    Invalid,
}

impl CountCell {
    pub fn value(self) -> u64 {
        match self {
            Self::Value(v) => v,
            Self::Blank | Self::Invalid => 0,
        }
    }

    /// True when non-blank text had to be replaced with zero.
    pub fn is_defaulted(self) -> bool {
        matches!(self, Self::Invalid)
    }
}

/// Read a count cell.
///
/// Commas and whitespace are stripped, then the leading run of digits is the
/// value, so `"1,234"` is 1234 and `"1234.00"` is 1234.
pub fn classify_count(cell: &str) -> CountCell {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return CountCell::Blank;
    }

    let cleaned: String = trimmed
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();

    match leading_digits(cleaned.strip_prefix('+').unwrap_or(&cleaned)) {
        Some(digits) => digits.parse().map_or(CountCell::Invalid, CountCell::Value),
        None => CountCell::Invalid,
    }
}

/// Normalize a count cell to a non-negative integer.
pub fn normalize_count(cell: &str) -> u64 {
    classify_count(cell).value()
}

/// Parse a row's sequence number. Zero and non-numeric cells are rejected.
pub fn parse_sequence_number(cell: &str) -> Option<u32> {
    let trimmed = cell.trim();
    let digits = leading_digits(trimmed.strip_prefix('+').unwrap_or(trimmed))?;
    digits.parse().ok().filter(|n| *n > 0)
}

fn leading_digits(s: &str) -> Option<&str> {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(s.len(), |(i, _)| i);

    if end == 0 { None } else { Some(&s[..end]) }
}
