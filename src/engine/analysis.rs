//! Growth, ratio and period-label analysis.
//!
//! All three read the `month` dimension by convention; data without it
//! reports "All time" and has no growth trend.

use std::collections::HashMap;

use super::aggregate::{month_order, sum_measure};
use super::format::{format_currency, format_percent};
use super::result::{GrowthData, GrowthDirection, RatioData, TextData};
use crate::view::{ConcatView, RecordView, MONTH_DIMENSION};

/// Percentage-point band around zero reported as "unchanged".
const UNCHANGED_BAND: f64 = 0.5;

/// Minimum number of distinct months for a growth trend.
const MIN_GROWTH_MONTHS: usize = 2;

/// Per-month totals in chronological order. Ties keep first-seen order.
fn month_totals<V>(view: &V, measure: &str) -> Vec<(String, f64)>
where
    V: RecordView + ?Sized,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();

    for i in 0..view.len() {
        let Some(month) = view.dimension(i, MONTH_DIMENSION) else {
            continue;
        };
        if month.is_empty() {
            continue;
        }
        let value = view.measure(i, measure).unwrap_or(0.0);
        match slots.get(&*month) {
            Some(&slot) => totals[slot].1 += value,
            None => {
                slots.insert(month.to_string(), totals.len());
                totals.push((month.into_owned(), value));
            }
        }
    }

    totals.sort_by_key(|(month, _)| month_order(month));
    totals
}

/// Distinct month values in chronological order.
fn months_in_order<V>(view: &V) -> Vec<String>
where
    V: RecordView + ?Sized,
{
    let mut months = crate::view::unique_values(view, MONTH_DIMENSION);
    months.sort_by_key(|month| month_order(month));
    months
}

/// Human-readable period covered by a view.
///
/// `"No data"` for an empty view, `"All time"` when no record has a month,
/// the month itself when there is one, else `"earliest – latest"`.
pub fn derive_period<V>(view: &V) -> String
where
    V: RecordView + ?Sized,
{
    if view.is_empty() {
        return "No data".to_string();
    }
    let months = months_in_order(view);
    match months.as_slice() {
        [] => "All time".to_string(),
        [only] => only.clone(),
        [earliest, .., latest] => format!("{earliest} – {latest}"),
    }
}

/// Period-over-period change between the earliest and latest month.
pub fn analyze_growth<V>(view: &V, measure: &str, unit: &str) -> TextData
where
    V: RecordView + ?Sized,
{
    if view.is_empty() {
        return TextData {
            value: "No data".to_string(),
            ..TextData::empty(unit)
        };
    }

    let totals = month_totals(view, measure);
    if totals.len() < MIN_GROWTH_MONTHS {
        let total = sum_measure(view, measure);
        let period = derive_period(view);
        return TextData {
            value: format_currency(total, unit),
            raw_value: total,
            unit: unit.to_string(),
            period: period.clone(),
            count: view.len(),
            growth: Some(GrowthData {
                earliest_value: total,
                latest_value: total,
                earliest_period: period.clone(),
                latest_period: period,
                change_amount: 0.0,
                change_percent: 0.0,
                direction: GrowthDirection::InsufficientData,
            }),
            ratio: None,
        };
    }

    let (earliest_month, earliest) = &totals[0];
    let (latest_month, latest) = &totals[totals.len() - 1];

    let change_amount = latest - earliest;
    let change_percent = if *earliest != 0.0 {
        change_amount / earliest * 100.0
    } else {
        0.0
    };

    let direction = if change_percent > UNCHANGED_BAND {
        GrowthDirection::Increased
    } else if change_percent < -UNCHANGED_BAND {
        GrowthDirection::Decreased
    } else {
        GrowthDirection::Unchanged
    };

    let value = match direction {
        GrowthDirection::Increased => format!("↑ {:.1}%", change_percent.abs()),
        GrowthDirection::Decreased => format!("↓ {:.1}%", change_percent.abs()),
        _ => "→ No change".to_string(),
    };

    TextData {
        value,
        raw_value: change_percent,
        unit: unit.to_string(),
        period: format!("{earliest_month} – {latest_month}"),
        count: view.len(),
        growth: Some(GrowthData {
            earliest_value: *earliest,
            latest_value: *latest,
            earliest_period: earliest_month.clone(),
            latest_period: latest_month.clone(),
            change_amount,
            change_percent,
            direction,
        }),
        ratio: None,
    }
}

/// Numerator total as a percentage of the denominator total.
///
/// The two sides are independent filters over the same data and may overlap,
/// so the percentage can exceed 100. A denominator total of zero or below
/// yields 0.
pub fn ratio_totals(
    denominator: &dyn RecordView,
    numerator: &dyn RecordView,
    measure: &str,
    denominator_label: String,
    numerator_label: String,
) -> RatioData {
    let denominator_total = sum_measure(denominator, measure);
    let numerator_total = sum_measure(numerator, measure);
    let percentage = if denominator_total > 0.0 {
        numerator_total / denominator_total * 100.0
    } else {
        0.0
    };

    tracing::debug!(
        numerator = %numerator_label,
        denominator = %denominator_label,
        percentage,
        "computed ratio"
    );

    RatioData {
        numerator_total,
        denominator_total,
        percentage,
        numerator_label,
        denominator_label,
    }
}

/// Text payload for a computed ratio. The period spans both sides.
pub fn ratio_text(
    ratio: &RatioData,
    denominator: &dyn RecordView,
    numerator: &dyn RecordView,
    unit: &str,
) -> TextData {
    TextData {
        value: format_percent(ratio.percentage),
        raw_value: ratio.percentage,
        unit: unit.to_string(),
        period: derive_period(&ConcatView::new(denominator, numerator)),
        count: numerator.len() + denominator.len(),
        growth: None,
        ratio: Some(ratio.clone()),
    }
}

/// [`ratio_totals`] wrapped in its text payload.
pub fn analyze_ratio(
    denominator: &dyn RecordView,
    numerator: &dyn RecordView,
    measure: &str,
    unit: &str,
    denominator_label: String,
    numerator_label: String,
) -> TextData {
    let ratio = ratio_totals(
        denominator,
        numerator,
        measure,
        denominator_label,
        numerator_label,
    );
    ratio_text(&ratio, denominator, numerator, unit)
}
