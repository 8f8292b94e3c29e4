//! Chart payloads from grouped records.

use std::collections::{HashMap, HashSet};

use crate::engine::aggregate::Group;
use crate::engine::format::{label_for_dimension, round_to_2};
use crate::engine::query::Query;
use crate::engine::result::{ChartConfig, ChartKind, ChartPoint, ChartSeries};

/// Series colors, assigned cyclically.
pub const PALETTE: [&str; 10] = [
    "#4F46E5", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#06B6D4", "#EC4899", "#84CC16",
    "#F97316", "#6366F1",
];

/// Build a chart, or `None` when there are no groups to plot.
///
/// Two-level groupings plot one series per sub-group key across the primary
/// groups; otherwise a single series plots every group.
pub fn build_chart(query: &Query, groups: &[Group<'_>]) -> Option<ChartConfig> {
    if groups.is_empty() {
        return None;
    }

    let kind = ChartKind::from(query.visualization);
    let multi = query.group_by.len() >= 2 && groups.iter().any(|g| !g.sub_groups.is_empty());
    let series = if multi {
        multi_series(groups)
    } else {
        single_series(groups, &query.title)
    };

    Some(ChartConfig {
        kind,
        title: query.title.clone(),
        x_axis: query
            .group_by
            .first()
            .map(|key| label_for_dimension(key))
            .unwrap_or_default(),
        y_axis: query.aggregation.label().to_string(),
        colors: colors(series.len()),
        series,
        show_legend: true,
        show_grid: kind != ChartKind::Pie,
    })
}

fn single_series(groups: &[Group<'_>], title: &str) -> Vec<ChartSeries> {
    let name = if title.is_empty() { "Value" } else { title };
    vec![ChartSeries {
        name: name.to_string(),
        data: groups
            .iter()
            .map(|g| ChartPoint {
                label: g.label.clone(),
                value: Some(round_to_2(g.value)),
            })
            .collect(),
        color: None,
    }]
}

fn multi_series(groups: &[Group<'_>]) -> Vec<ChartSeries> {
    let mut seen = HashSet::new();
    let sub_keys: Vec<&str> = groups
        .iter()
        .flat_map(|g| g.sub_groups.iter())
        .map(|sub| sub.key.as_str())
        .filter(|key| seen.insert(*key))
        .collect();

    let lookups: Vec<HashMap<&str, f64>> = groups
        .iter()
        .map(|g| g.sub_groups.iter().map(|s| (s.key.as_str(), s.value)).collect())
        .collect();

    sub_keys
        .iter()
        .enumerate()
        .map(|(i, key)| ChartSeries {
            name: key.to_string(),
            data: groups
                .iter()
                .zip(&lookups)
                .map(|(g, lookup)| ChartPoint {
                    label: g.label.clone(),
                    value: lookup.get(key).copied().map(round_to_2),
                })
                .collect(),
            color: Some(PALETTE[i % PALETTE.len()].to_string()),
        })
        .collect()
}

fn colors(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| PALETTE[i % PALETTE.len()].to_string())
        .collect()
}
