//! Column naming: keys, display names and measure units.

use inflector::Inflector;

use crate::engine::query::Aggregation;

/// A naming rule that assigns a unit to a measure.
#[derive(Debug, Clone)]
pub struct UnitRule {
    /// Unit name written to the measure.
    pub unit: &'static str,
    /// Singular name tokens that trigger the rule.
    pub keywords: &'static [&'static str],
    pub default_aggregation: Aggregation,
    pub is_currency: bool,
}

/// Unit rules in priority order; the first match wins.
pub static UNIT_RULES: &[UnitRule] = &[
    UnitRule {
        unit: "currency",
        keywords: &[
            "amount", "price", "revenue", "cost", "salary", "sale", "income", "expense", "spend",
            "fee", "profit", "budget", "payment",
        ],
        default_aggregation: Aggregation::Sum,
        is_currency: true,
    },
    UnitRule {
        unit: "hours",
        keywords: &["hour", "hr", "hrs"],
        default_aggregation: Aggregation::Sum,
        is_currency: false,
    },
    UnitRule {
        unit: "points",
        keywords: &["point", "pts", "score", "rating"],
        default_aggregation: Aggregation::Avg,
        is_currency: false,
    },
    UnitRule {
        unit: "percent",
        keywords: &["percent", "percentage", "pct", "rate", "ratio"],
        default_aggregation: Aggregation::Avg,
        is_currency: false,
    },
    UnitRule {
        unit: "units",
        keywords: &["quantity", "qty", "unit", "item"],
        default_aggregation: Aggregation::Sum,
        is_currency: false,
    },
];

/// The unit rule matching any token of `key`.
///
/// Tokens are split on non-alphanumerics and compared both as written and
/// in singular form, so `time_spent_(hours)` matches `hour`.
pub fn infer_unit(key: &str) -> Option<&'static UnitRule> {
    let tokens: Vec<(String, String)> = key
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| {
            let token = token.to_lowercase();
            let singular = token.to_singular();
            (token, singular)
        })
        .collect();

    UNIT_RULES.iter().find(|rule| {
        tokens.iter().any(|(token, singular)| {
            rule.keywords.contains(&token.as_str()) || rule.keywords.contains(&singular.as_str())
        })
    })
}

/// `"Story Points"` → `story_points`, `"issueType"` → `issue_type`.
pub fn to_snake_case(header: &str) -> String {
    let mut split = String::with_capacity(header.len() + 4);
    let mut previous: Option<char> = None;
    for c in header.chars() {
        if c.is_uppercase() && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
            split.push('_');
        }
        split.push(c);
        previous = Some(c);
    }

    let mut key = split.to_lowercase().replace([' ', '-'], "_");
    while key.contains("__") {
        key = key.replace("__", "_");
    }
    key.trim_matches('_').to_string()
}

/// Human label for a header: kept as written when it has spaces, otherwise
/// title-cased from its snake or kebab form.
pub fn to_display_name(header: &str) -> String {
    if header.contains(' ') {
        return header.trim().to_string();
    }

    header
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
