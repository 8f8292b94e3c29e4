//! Dimension filters.
//!
//! Filtering produces a [`SubView`] of matching parent indices; no record is
//! copied. Matching is case-insensitive, OR within a dimension and AND across
//! dimensions.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::view::{dimension_value, RecordView, SubView};

/// Per-dimension allow-lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub dimensions: BTreeMap<String, Vec<String>>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: allow `values` for `dimension`.
    pub fn with<I, S>(mut self, dimension: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions
            .entry(dimension.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    /// Whether a non-empty allow-list is set for `dimension`.
    pub fn has_filter(&self, dimension: &str) -> bool {
        self.dimensions
            .get(dimension)
            .is_some_and(|values| !values.is_empty())
    }

    /// Whether no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.dimensions.values().all(Vec::is_empty)
    }

    /// Human-readable label: values joined per dimension, dimensions joined
    /// with an em dash. Unconstrained filters read as `"All"`.
    pub fn label(&self) -> String {
        let parts: Vec<String> = self
            .dimensions
            .values()
            .filter(|values| !values.is_empty())
            .map(|values| values.join(", "))
            .collect();
        if parts.is_empty() {
            "All".to_string()
        } else {
            parts.join(" — ")
        }
    }
}

/// Apply `filters` to `view`.
///
/// Unconstrained filters return the identity view.
pub fn apply_filters<'a>(view: &'a dyn RecordView, filters: &Filters) -> SubView<'a> {
    if filters.is_empty() {
        return SubView::identity(view);
    }

    let constraints: Vec<(&str, HashSet<String>)> = filters
        .dimensions
        .iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(key, values)| {
            let allowed = values.iter().map(|v| v.to_lowercase()).collect();
            (key.as_str(), allowed)
        })
        .collect();

    let indices: Vec<usize> = (0..view.len())
        .filter(|&i| {
            constraints.iter().all(|(key, allowed)| {
                allowed.contains(&dimension_value(view, i, key).to_lowercase())
            })
        })
        .collect();

    tracing::trace!(
        before = view.len(),
        after = indices.len(),
        dimensions = constraints.len(),
        "applied filters"
    );

    SubView::with_indices(view, indices)
}
