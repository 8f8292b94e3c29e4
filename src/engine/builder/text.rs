//! Single-value text answers.

use crate::engine::aggregate::{avg_measure, max_measure, min_measure, sum_measure};
use crate::engine::analysis::{analyze_growth, derive_period};
use crate::engine::format::{format_currency, format_int};
use crate::engine::query::{Aggregation, Query};
use crate::engine::result::TextData;
use crate::view::RecordView;

/// Build a single-value answer over the whole view.
///
/// Counts are integer-formatted; other values are currency-formatted.
/// Growth queries are answered by the growth analyzer.
pub fn build_text(query: &Query, view: &dyn RecordView, measure: &str, unit: &str) -> TextData {
    if view.is_empty() {
        return TextData::empty(unit);
    }

    let value = match query.aggregation {
        Aggregation::Growth => return analyze_growth(view, measure, unit),
        Aggregation::Count => view.len() as f64,
        Aggregation::Avg => avg_measure(view, measure),
        Aggregation::Max => max_measure(view, measure),
        Aggregation::Min => min_measure(view, measure),
        _ => sum_measure(view, measure),
    };

    let formatted = if query.aggregation == Aggregation::Count {
        format_int(view.len() as i64)
    } else {
        format_currency(value, unit)
    };

    TextData {
        value: formatted,
        raw_value: value,
        unit: unit.to_string(),
        period: derive_period(view),
        count: view.len(),
        growth: None,
        ratio: None,
    }
}
