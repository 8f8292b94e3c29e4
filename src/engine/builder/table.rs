//! Table payloads: one row per group, or per record for `list` queries.

use std::collections::BTreeMap;

use crate::engine::aggregate::Group;
use crate::engine::format::{format_currency, label_for_dimension};
use crate::engine::query::{Aggregation, Query};
use crate::engine::result::{Align, Column, ColumnType, Summary, TableData};
use crate::view::{dimension_value, RecordView};

/// Build a table.
///
/// `list` queries emit one row per record of `view`; everything else emits
/// one row per group.
pub fn build_table(
    query: &Query,
    groups: &[Group<'_>],
    view: &dyn RecordView,
    measure: &str,
    unit: &str,
) -> TableData {
    if query.aggregation == Aggregation::List {
        list_table(query, view, measure, unit)
    } else {
        aggregated_table(query, groups, unit)
    }
}

fn list_table(query: &Query, view: &dyn RecordView, measure: &str, unit: &str) -> TableData {
    if view.is_empty() {
        return TableData::empty(&query.title);
    }

    let dimension_keys = view.dimension_keys();
    let mut columns: Vec<Column> = dimension_keys
        .iter()
        .map(|key| Column {
            key: key.clone(),
            label: label_for_dimension(key),
            kind: ColumnType::Text,
            align: Align::Left,
        })
        .collect();
    columns.push(Column {
        key: measure.to_string(),
        label: label_for_dimension(measure),
        kind: ColumnType::Number,
        align: Align::Right,
    });

    let mut total = 0.0;
    let rows = (0..view.len())
        .map(|i| {
            let value = view.measure(i, measure).unwrap_or(0.0);
            total += value;
            dimension_keys
                .iter()
                .map(|key| dimension_value(view, i, key).into_owned())
                .chain(std::iter::once(format!("{value:.2}")))
                .collect()
        })
        .collect();

    TableData {
        title: query.title.clone(),
        columns,
        rows,
        summary: Some(Summary {
            label: format!("Total ({} records)", view.len()),
            values: BTreeMap::from([(measure.to_string(), format_currency(total, unit))]),
        }),
    }
}

fn aggregated_table(query: &Query, groups: &[Group<'_>], unit: &str) -> TableData {
    if groups.is_empty() {
        return TableData::empty(&query.title);
    }

    let group_label = query
        .group_by
        .first()
        .map_or_else(|| "Group".to_string(), |key| label_for_dimension(key));

    let columns = vec![
        Column {
            key: "group".to_string(),
            label: group_label,
            kind: ColumnType::Text,
            align: Align::Left,
        },
        Column {
            key: "value".to_string(),
            label: query.aggregation.label().to_string(),
            kind: ColumnType::Number,
            align: Align::Right,
        },
        Column {
            key: "count".to_string(),
            label: "Count".to_string(),
            kind: ColumnType::Number,
            align: Align::Center,
        },
    ];

    let rows = groups
        .iter()
        .map(|g| vec![g.label.clone(), format!("{:.2}", g.value), g.count.to_string()])
        .collect();
    let total_value: f64 = groups.iter().map(|g| g.value).sum();
    let total_count: usize = groups.iter().map(|g| g.count).sum();

    TableData {
        title: query.title.clone(),
        columns,
        rows,
        summary: Some(Summary {
            label: "Total".to_string(),
            values: BTreeMap::from([
                ("value".to_string(), format_currency(total_value, unit)),
                ("count".to_string(), total_count.to_string()),
            ]),
        }),
    }
}
