//! Base view over a borrowed slice of [`Record`]s.

use std::borrow::Cow;
use std::collections::HashSet;

use super::{Record, RecordView};

/// Wraps an in-memory record slice directly.
///
/// Key lists are collected once at construction, in first-seen order across
/// records.
pub struct SliceView<'a> {
    records: &'a [Record],
    dimension_keys: Vec<String>,
    measure_keys: Vec<String>,
}

impl<'a> SliceView<'a> {
    pub fn new(records: &'a [Record]) -> Self {
        let mut dimension_keys = Vec::new();
        let mut measure_keys = Vec::new();
        let mut seen_dimensions = HashSet::new();
        let mut seen_measures = HashSet::new();

        for record in records {
            for key in record.dimensions.keys() {
                if seen_dimensions.insert(key.as_str()) {
                    dimension_keys.push(key.clone());
                }
            }
            for key in record.measures.keys() {
                if seen_measures.insert(key.as_str()) {
                    measure_keys.push(key.clone());
                }
            }
        }

        Self {
            records,
            dimension_keys,
            measure_keys,
        }
    }

    /// The underlying records.
    pub fn records(&self) -> &'a [Record] {
        self.records
    }
}

impl RecordView for SliceView<'_> {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>> {
        self.records
            .get(index)?
            .dimensions
            .get(key)
            .map(|value| Cow::Borrowed(value.as_str()))
    }

    fn measure(&self, index: usize, key: &str) -> Option<f64> {
        self.records.get(index)?.measures.get(key).copied()
    }

    fn dimension_keys(&self) -> &[String] {
        &self.dimension_keys
    }

    fn measure_keys(&self) -> &[String] {
        &self.measure_keys
    }
}
