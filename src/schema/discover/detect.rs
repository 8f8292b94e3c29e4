//! Value recognizers and special-pattern detection.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Fraction of values that must match a recognizer, as `NUMERATOR / DENOMINATOR`.
pub(crate) const MATCH_NUMERATOR: usize = 4;
pub(crate) const MATCH_DENOMINATOR: usize = 5;

/// Values treated as missing.
pub(crate) const NULL_TOKENS: [&str; 5] = ["", "null", "NULL", "N/A", "n/a"];

/// Detected value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnType {
    String,
    Numeric,
    Date,
    Bool,
}

impl ColumnType {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Bool => "bool",
        }
    }
}

/// ISO 4217 codes recognized as currency values.
const KNOWN_CURRENCIES: [&str; 45] = [
    "USD", "EUR", "GBP", "JPY", "CNY", "INR", "SGD", "AUD", "CAD", "CHF", "HKD", "NZD", "SEK",
    "KRW", "NOK", "MXN", "BRL", "ZAR", "THB", "MYR", "IDR", "PHP", "VND", "TWD", "AED", "SAR",
    "QAR", "PLN", "CZK", "ILS", "DKK", "RUB", "TRY", "ARS", "CLP", "COP", "PEN", "EGP", "NGN",
    "KES", "PKR", "BDT", "LKR", "MMK", "NPR",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%b %d, %Y"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S"];

/// Bare years outside this range are read as numbers.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Month/quarter/year string patterns and the format each reports.
static TEMPORAL_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"^[A-Z][a-z]{2}-\d{4}$", "MMM-yyyy"),
        (r"^\d{4}-\d{2}$", "yyyy-MM"),
        (r"^Q[1-4]-\d{4}$", "QN-yyyy"),
        (r"^Q[1-4]\s+\d{4}$", "QN yyyy"),
        (r"^\d{4}$", "yyyy"),
        (r"^[A-Z][a-z]+ \d{4}$", "MMMM yyyy"),
    ]
    .into_iter()
    .map(|(pattern, format)| (Regex::new(pattern).unwrap(), format))
    .collect()
});

/// Whether `matches` out of `total` reaches the 80% threshold.
pub(crate) fn meets_threshold(matches: usize, total: usize) -> bool {
    total > 0 && matches * MATCH_DENOMINATOR >= total * MATCH_NUMERATOR
}

pub(crate) fn is_null(value: &str) -> bool {
    NULL_TOKENS.contains(&value)
}

/// Classify non-null values. Boolean wins over date, date over numeric.
pub(crate) fn detect_type(values: &[&str]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::String;
    }

    let (mut numeric, mut date, mut boolean) = (0, 0, 0);
    for value in values {
        numeric += usize::from(is_numeric(value));
        date += usize::from(is_date(value));
        boolean += usize::from(is_bool(value));
    }

    let total = values.len();
    if meets_threshold(boolean, total) {
        ColumnType::Bool
    } else if meets_threshold(date, total) {
        ColumnType::Date
    } else if meets_threshold(numeric, total) {
        ColumnType::Numeric
    } else {
        ColumnType::String
    }
}

/// Numbers with optional thousands separators, sign and currency symbol.
pub fn is_numeric(value: &str) -> bool {
    let cleaned = value.trim().replace(',', "");
    let unsigned = cleaned.strip_prefix('-').unwrap_or(&cleaned);
    let bare = unsigned
        .strip_prefix(['$', '€', '£'])
        .map_or(unsigned, |rest| rest.strip_prefix('-').unwrap_or(rest));
    !bare.is_empty() && bare.parse::<f64>().is_ok_and(f64::is_finite)
}

pub fn is_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        return value.parse::<i32>().is_ok_and(|year| YEAR_RANGE.contains(&year));
    }

    DATE_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(value, format).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
        || NaiveDate::parse_from_str(&format!("1 {value}"), "%d %b-%Y").is_ok()
        || NaiveDate::parse_from_str(&format!("1 {value}"), "%d %B %Y").is_ok()
        || NaiveDate::parse_from_str(value, "%d %b %Y").is_ok()
}

pub fn is_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "1" | "0"
    )
}

/// At least 80% of samples are known ISO currency codes.
pub fn detect_currency_codes<S: AsRef<str>>(samples: &[S]) -> bool {
    let matches = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| s.len() == 3 && KNOWN_CURRENCIES.contains(s))
        .count();
    matches > 0 && meets_threshold(matches, samples.len())
}

/// The first month/quarter/year pattern matched by at least 80% of samples.
pub fn detect_temporal_pattern<S: AsRef<str>>(samples: &[S]) -> Option<&'static str> {
    if samples.is_empty() {
        return None;
    }
    TEMPORAL_PATTERNS.iter().find_map(|(pattern, format)| {
        let matches = samples
            .iter()
            .filter(|s| pattern.is_match(s.as_ref().trim()))
            .count();
        meets_threshold(matches, samples.len()).then_some(*format)
    })
}
