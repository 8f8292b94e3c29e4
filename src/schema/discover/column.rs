//! Per-column analysis and role classification.

use std::collections::BTreeSet;

use super::detect::{
    detect_currency_codes, detect_temporal_pattern, detect_type, is_null, ColumnType,
};
use super::naming::{infer_unit, to_display_name, to_snake_case, UnitRule};
use crate::schema::{
    CardinalityHint, DimensionDescriptor, MeasureDescriptor, SkippedColumn, TemporalOrder,
};

/// Distinct values kept as samples.
pub(crate) const MAX_SAMPLES: usize = 10;

/// Rows above which an all-unique column is treated as an identifier.
pub(crate) const IDENTIFIER_MIN_ROWS: usize = 10;

/// Integer columns below both limits are coded dimensions (e.g. priority 1-5).
pub(crate) const CODED_MAX_UNIQUE: usize = 20;
pub(crate) const CODED_MAX_RATIO: f64 = 0.3;

/// Strings above this many distinct values (and half the rows) are skipped.
pub(crate) const HIGH_CARDINALITY_MIN_UNIQUE: usize = 50;

/// Where a column ends up in the schema.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColumnRole {
    Dimension,
    Measure,
    Skipped { reason: String, recoverable: bool },
}

/// Everything learned about one column.
#[derive(Debug, Clone)]
pub(crate) struct ColumnAnalysis {
    pub header: String,
    pub key: String,
    pub index: usize,
    pub column_type: ColumnType,
    pub role: ColumnRole,
    pub unique_count: usize,
    pub null_count: usize,
    /// Up to [`MAX_SAMPLES`] distinct values, sorted.
    pub samples: Vec<String>,
    pub is_temporal: bool,
    pub temporal_format: Option<&'static str>,
    pub is_currency_code: bool,
    pub has_decimals: bool,
    pub unit: Option<&'static UnitRule>,
    pub cardinality: CardinalityHint,
}

impl ColumnAnalysis {
    /// Inspect column `index` across `rows` and classify it.
    pub(crate) fn analyze(header: &str, index: usize, rows: &[Vec<String>]) -> Self {
        let key = to_snake_case(header);
        let mut values: Vec<&str> = Vec::with_capacity(rows.len());
        let mut null_count = 0;
        for row in rows {
            match row.get(index).map(|v| v.trim()) {
                Some(value) if !is_null(value) => values.push(value),
                _ => null_count += 1,
            }
        }

        let unique: BTreeSet<&str> = values.iter().copied().collect();
        let mut column = Self {
            header: header.to_string(),
            unit: infer_unit(&key),
            key,
            index,
            column_type: ColumnType::String,
            role: ColumnRole::Dimension,
            unique_count: unique.len(),
            null_count,
            samples: unique.iter().take(MAX_SAMPLES).map(|v| v.to_string()).collect(),
            is_temporal: false,
            temporal_format: None,
            is_currency_code: false,
            has_decimals: false,
            cardinality: CardinalityHint::from_unique_count(unique.len()),
        };

        if values.is_empty() {
            column.role = ColumnRole::Skipped {
                reason: "All values are empty/null".to_string(),
                recoverable: false,
            };
            return column;
        }

        column.column_type = detect_type(&values);
        match column.column_type {
            ColumnType::Numeric => {
                column.has_decimals = values.iter().any(|v| v.contains('.'));
            }
            ColumnType::String => {
                column.is_currency_code = detect_currency_codes(column.samples.as_slice());
                column.temporal_format = detect_temporal_pattern(column.samples.as_slice());
                column.is_temporal = column.temporal_format.is_some();
            }
            ColumnType::Date => column.is_temporal = true,
            ColumnType::Bool => {}
        }

        column.role = column.classify(rows.len());
        column
    }

    fn classify(&self, total_rows: usize) -> ColumnRole {
        let all_unique = self.unique_count == total_rows && total_rows > IDENTIFIER_MIN_ROWS;
        match self.column_type {
            ColumnType::Numeric => {
                if all_unique {
                    return skipped("Unique per row — likely an ID column", false);
                }
                if self.has_decimals {
                    return ColumnRole::Measure;
                }
                let ratio = self.unique_count as f64 / total_rows as f64;
                if self.unique_count < CODED_MAX_UNIQUE && ratio < CODED_MAX_RATIO {
                    ColumnRole::Dimension
                } else {
                    ColumnRole::Measure
                }
            }
            ColumnType::Date | ColumnType::Bool => ColumnRole::Dimension,
            ColumnType::String => {
                if all_unique {
                    return skipped("Unique per row — likely an identifier", false);
                }
                if self.unique_count > total_rows / 2
                    && self.unique_count > HIGH_CARDINALITY_MIN_UNIQUE
                {
                    return skipped(
                        format!(
                            "High cardinality ({} unique values) — not useful for grouping",
                            self.unique_count
                        ),
                        true,
                    );
                }
                ColumnRole::Dimension
            }
        }
    }

    pub(crate) fn to_dimension(&self) -> DimensionDescriptor {
        DimensionDescriptor {
            is_temporal: self.is_temporal,
            temporal_format: self.temporal_format.map(str::to_string),
            temporal_order: self.is_temporal.then_some(TemporalOrder::Chronological),
            is_currency_code: self.is_currency_code,
            cardinality_hint: Some(self.cardinality),
            ..DimensionDescriptor::new(&self.key, to_display_name(&self.header))
                .with_samples(self.samples.iter().cloned())
        }
    }

    pub(crate) fn to_measure(&self) -> MeasureDescriptor {
        let mut measure = MeasureDescriptor::new(&self.key, to_display_name(&self.header));
        if let Some(rule) = self.unit {
            measure.unit = Some(rule.unit.to_string());
            measure.is_currency = rule.is_currency;
            measure.default_aggregation = rule.default_aggregation;
        }
        measure
    }

    pub(crate) fn to_skipped(&self) -> Option<SkippedColumn> {
        match &self.role {
            ColumnRole::Skipped {
                reason,
                recoverable,
            } => Some(SkippedColumn {
                column: self.header.clone(),
                reason: reason.clone(),
                recoverable: *recoverable,
                suggested_role: None,
            }),
            _ => None,
        }
    }
}

fn skipped(reason: impl Into<String>, recoverable: bool) -> ColumnRole {
    ColumnRole::Skipped {
        reason: reason.into(),
        recoverable,
    }
}
