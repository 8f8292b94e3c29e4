//! Number and label formatting shared by the builders.

/// Format an amount with a unit prefix, thousands separators and two
/// decimals: `"SGD 1,234.50"`. An empty unit yields `"1,234.50"`.
pub fn format_currency(amount: f64, unit: &str) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let body = format!("{}.{:02}", group_thousands(cents / 100), cents % 100);

    let formatted = if unit.is_empty() {
        body
    } else {
        format!("{unit} {body}")
    };
    if negative && cents > 0 {
        format!("-{formatted}")
    } else {
        formatted
    }
}

/// Format an integer with thousands separators.
pub fn format_int(n: i64) -> String {
    let grouped = group_thousands(n.unsigned_abs());
    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Format a percentage with one decimal: `"18.2%"`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Round to two decimal places.
pub fn round_to_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Capitalize the first character of a key for display.
pub fn label_for_dimension(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
