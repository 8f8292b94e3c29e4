//! Reply-template resolution.
//!
//! Templates carry `{placeholder}` tokens. Only referenced quantities are
//! computed. Placeholders that remain unresolved are stripped together with
//! the doubled spaces and trailing punctuation they leave behind; a template
//! that would strip to nothing is returned unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

use super::aggregate::{max_measure, min_measure, sum_measure, Group};
use super::analysis::{analyze_growth, derive_period};
use super::format::{format_currency, format_percent};
use crate::view::RecordView;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[a-z_]+\}").unwrap());

static EXTRA_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

const GROWTH_PLACEHOLDERS: [&str; 7] = [
    "{growth_percent}",
    "{change_amount}",
    "{earliest_value}",
    "{latest_value}",
    "{earliest_period}",
    "{latest_period}",
    "{direction}",
];

/// Resolve a reply template against the working view and its groups.
pub fn resolve_template(
    template: &str,
    groups: &[Group<'_>],
    view: &dyn RecordView,
    measure: &str,
    unit: &str,
) -> String {
    if template.is_empty() {
        return default_reply(view, measure, unit);
    }

    let wants = |placeholder: &str| template.contains(placeholder);
    let mut replacements: Vec<(&str, String)> = Vec::new();
    let count = view.len();

    if wants("{total}") || wants("{avg}") {
        let total = sum_measure(view, measure);
        replacements.push(("{total}", format_currency(total, unit)));
        if count > 0 {
            replacements.push(("{avg}", format_currency(total / count as f64, unit)));
        }
    }
    if wants("{count}") {
        replacements.push(("{count}", count.to_string()));
    }
    if wants("{period}") {
        replacements.push(("{period}", derive_period(view)));
    }
    if wants("{currency}") {
        replacements.push(("{currency}", unit.to_string()));
    }

    if wants("{top_category}") || wants("{top_amount}") {
        let top = groups.iter().reduce(|top, g| if g.value > top.value { g } else { top });
        if let Some(top) = top {
            replacements.push(("{top_category}", top.label.clone()));
            replacements.push(("{top_amount}", format_currency(top.value, unit)));
        }
    }

    if count > 0 {
        if wants("{max}") {
            replacements.push(("{max}", format_currency(max_measure(view, measure), unit)));
        }
        if wants("{min}") {
            replacements.push(("{min}", format_currency(min_measure(view, measure), unit)));
        }
    }

    if GROWTH_PLACEHOLDERS.iter().any(|&p| wants(p)) {
        if let Some(growth) = analyze_growth(view, measure, unit).growth {
            replacements.extend([
                ("{growth_percent}", format_percent(growth.change_percent)),
                ("{change_amount}", format_currency(growth.change_amount, unit)),
                ("{earliest_value}", format_currency(growth.earliest_value, unit)),
                ("{latest_value}", format_currency(growth.latest_value, unit)),
                ("{earliest_period}", growth.earliest_period),
                ("{latest_period}", growth.latest_period),
                ("{direction}", growth.direction.to_string()),
            ]);
        }
    }

    fill_placeholders(template, &replacements)
}

/// Substitute `replacements` into `template`, then strip anything left over.
pub fn fill_placeholders(template: &str, replacements: &[(&str, String)]) -> String {
    let mut resolved = template.to_string();
    for (placeholder, value) in replacements {
        resolved = resolved.replace(placeholder, value);
    }
    if PLACEHOLDER.is_match(&resolved) {
        strip_unresolved(&resolved)
    } else {
        resolved
    }
}

/// Remove unresolved placeholders and the debris they leave.
///
/// Returns `text` unchanged when nothing would remain.
pub fn strip_unresolved(text: &str) -> String {
    let cleaned = PLACEHOLDER.replace_all(text, "");
    let cleaned = EXTRA_SPACES.replace_all(&cleaned, " ");
    let cleaned = cleaned
        .trim()
        .trim_end_matches([' ', '.', '—', '-', '–']);
    if cleaned.is_empty() {
        text.to_string()
    } else {
        cleaned.to_string()
    }
}

fn default_reply(view: &dyn RecordView, measure: &str, unit: &str) -> String {
    if view.is_empty() {
        return "No matching records found.".to_string();
    }
    format!(
        "Found {} records totalling {}.",
        view.len(),
        format_currency(sum_measure(view, measure), unit)
    )
}
