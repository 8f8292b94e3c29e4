//! Parent/child detection between dimensions.
//!
//! A dimension `P` is a parent of `C` when `P` has strictly fewer distinct
//! values and every observed value of `C` maps to exactly one value of `P`.
//! When several parents qualify the one with the most distinct values (the
//! closest level) wins.

use std::collections::HashMap;

use super::column::{ColumnAnalysis, ColumnRole};

/// A dimension column's trimmed values, extracted once for all pair tests.
struct ValueColumn<'a> {
    key: &'a str,
    unique_count: usize,
    values: Vec<&'a str>,
}

impl<'a> ValueColumn<'a> {
    fn extract(column: &'a ColumnAnalysis, rows: &'a [Vec<String>]) -> Self {
        Self {
            key: &column.key,
            unique_count: column.unique_count,
            values: rows
                .iter()
                .map(|row| row.get(column.index).map_or("", |v| v.trim()))
                .collect(),
        }
    }
}

/// Parent key for each dimension column that has one, as `(child, parent)`.
///
/// Only columns classified as dimensions take part; recovered columns are
/// neither children nor parents.
pub(crate) fn detect_hierarchies(
    columns: &[ColumnAnalysis],
    rows: &[Vec<String>],
) -> Vec<(String, String)> {
    let dimensions: Vec<ValueColumn<'_>> = columns
        .iter()
        .filter(|c| c.role == ColumnRole::Dimension)
        .map(|c| ValueColumn::extract(c, rows))
        .collect();

    let mut links = Vec::new();
    for (i, child) in dimensions.iter().enumerate() {
        let mut best: Option<&ValueColumn<'_>> = None;
        for (j, parent) in dimensions.iter().enumerate() {
            if i == j || parent.unique_count >= child.unique_count {
                continue;
            }
            if best.is_some_and(|b| b.unique_count >= parent.unique_count) {
                continue;
            }
            if maps_functionally(child, parent) {
                best = Some(parent);
            }
        }
        if let Some(parent) = best {
            tracing::debug!(child = child.key, parent = parent.key, "detected hierarchy");
            links.push((child.key.to_string(), parent.key.to_string()));
        }
    }
    links
}

/// Every non-empty child value maps to one parent value, and more than one
/// child value was seen.
fn maps_functionally(child: &ValueColumn<'_>, parent: &ValueColumn<'_>) -> bool {
    let mut mapping: HashMap<&str, &str> = HashMap::new();
    for (&c, &p) in child.values.iter().zip(&parent.values) {
        if c.is_empty() || p.is_empty() {
            continue;
        }
        match mapping.get(c) {
            Some(&existing) if existing != p => return false,
            Some(_) => {}
            None => {
                mapping.insert(c, p);
            }
        }
    }
    mapping.len() > 1
}
