//! Heuristic schema discovery.
//!
//! Each column of a [`RawTable`] goes through the same pipeline:
//!
//! 1. **Type detection**: boolean, date, numeric or string, requiring 80% of
//!    non-null values to match a recognizer.
//! 2. **Role classification**: dimension, measure, or skipped with a reason.
//! 3. **Pattern detection**: ISO currency codes and month/quarter/year
//!    strings.
//!
//! The accepted columns are then linked into hierarchies, a synthetic
//! `record_count` measure is added, and currency settings are enabled when
//! a currency-code dimension was found.
//!
//! # Example
//!
//! ```
//! use tally::schema::{discover, DiscoverOptions, RawTable};
//!
//! let table = RawTable::new(
//!     ["Month", "Category", "Amount"],
//!     vec![
//!         vec!["Jan-2026", "Income", "8500.00"],
//!         vec!["Jan-2026", "Expense", "2200.00"],
//!         vec!["Feb-2026", "Expense", "49.90"],
//!     ],
//! );
//! let schema = discover(&table, &DiscoverOptions::default()).unwrap();
//! assert_eq!(schema.dimension_keys(), ["month", "category"]);
//! assert_eq!(schema.measure_keys(), ["amount", "record_count"]);
//! ```

mod column;
mod detect;
mod hierarchy;
mod naming;

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};

use self::column::{ColumnAnalysis, ColumnRole};
use self::hierarchy::detect_hierarchies;
use super::error::{DiscoveryError, DiscoveryResult};
use super::{
    CurrencySchema, DimensionDescriptor, MeasureDescriptor, SchemaDescription,
    DEFAULT_DATASET_NAME,
};
use crate::engine::query::Aggregation;

pub use detect::{detect_currency_codes, detect_temporal_pattern, is_bool, is_date, is_numeric};
pub use naming::{infer_unit, to_display_name, to_snake_case, UnitRule, UNIT_RULES};

/// Rows inspected when no sample size is configured.
pub const DEFAULT_SAMPLE_SIZE: usize = 1000;

/// Upper bound on inspected rows when the sample size is 0.
pub const MAX_SAMPLE_ROWS: usize = 100_000;

/// Key of the synthetic row-count measure.
pub const RECORD_COUNT_MEASURE: &str = "record_count";

/// Header row plus string cells, as produced by an upstream parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    fn validate(&self) -> DiscoveryResult<()> {
        let has_header = self.headers.iter().any(|h| !h.trim().is_empty());
        match (has_header, self.rows.is_empty()) {
            (false, true) => Err(DiscoveryError::EmptyInput),
            (false, false) => Err(DiscoveryError::MissingHeader),
            (true, true) => Err(DiscoveryError::NoDataRows),
            (true, false) => Ok(()),
        }
    }
}

/// Discovery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Maximum rows inspected; 0 inspects up to [`MAX_SAMPLE_ROWS`].
    pub sample_size: usize,
    /// Skipped columns to force back in as dimensions, matched
    /// case-insensitively against the header or the key.
    pub recover_columns: Vec<String>,
    /// Dataset name; [`DEFAULT_DATASET_NAME`] when empty.
    pub name: String,
    /// Recorded as `discovered_from`.
    pub source: String,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            recover_columns: Vec::new(),
            name: String::new(),
            source: "CSV".to_string(),
        }
    }
}

impl DiscoverOptions {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn recover<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recover_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    fn row_limit(&self) -> usize {
        if self.sample_size == 0 {
            MAX_SAMPLE_ROWS
        } else {
            self.sample_size
        }
    }
}

/// Build a draft schema by inspecting `table`.
pub fn discover(table: &RawTable, options: &DiscoverOptions) -> DiscoveryResult<SchemaDescription> {
    table.validate()?;

    let rows = &table.rows[..table.rows.len().min(options.row_limit())];
    let columns: Vec<ColumnAnalysis> = table
        .headers
        .iter()
        .enumerate()
        .map(|(index, header)| ColumnAnalysis::analyze(header, index, rows))
        .collect();

    let recover: HashSet<String> = options
        .recover_columns
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();

    let mut schema = SchemaDescription::new(if options.name.is_empty() {
        DEFAULT_DATASET_NAME
    } else {
        options.name.as_str()
    });

    for column in &columns {
        tracing::trace!(
            column = %column.key,
            column_type = column.column_type.as_str(),
            unique = column.unique_count,
            nulls = column.null_count,
            "analyzed column"
        );
        if let Some(skipped) = column.to_skipped() {
            let recovered = recover.contains(&column.header.trim().to_lowercase())
                || recover.contains(&column.key);
            if recovered {
                tracing::debug!(column = %column.header, "recovered skipped column");
                schema.dimensions.push(column.to_dimension());
            } else {
                schema.skipped_columns.push(skipped);
            }
        } else if column.role == ColumnRole::Measure {
            schema.measures.push(column.to_measure());
        } else {
            schema.dimensions.push(column.to_dimension());
        }
    }

    schema.measures.push(record_count_measure());

    for (child, parent) in detect_hierarchies(&columns, rows) {
        if let Some(dimension) = schema.dimensions.iter_mut().find(|d| d.key == child) {
            dimension.parent = Some(parent);
        }
    }

    schema.currency = detect_currency_config(&schema.dimensions);
    schema.discovered_from = options.source.clone();
    schema.discovered_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    tracing::info!(
        rows = rows.len(),
        dimensions = schema.dimensions.len(),
        measures = schema.measures.len(),
        skipped = schema.skipped_columns.len(),
        currency = schema.currency.is_some(),
        "discovered schema"
    );

    Ok(schema)
}

fn record_count_measure() -> MeasureDescriptor {
    MeasureDescriptor {
        description: Some("Number of records (auto-generated)".to_string()),
        is_synthetic: true,
        aggregations: vec![Aggregation::Count],
        default_aggregation: Aggregation::Count,
        ..MeasureDescriptor::new(RECORD_COUNT_MEASURE, "Record Count")
    }
}

/// Enable currency settings from the first currency-code dimension.
///
/// The base currency defaults to its first sample; rates are left for the
/// consumer to supply.
fn detect_currency_config(dimensions: &[DimensionDescriptor]) -> Option<CurrencySchema> {
    dimensions
        .iter()
        .find(|d| d.is_currency_code)
        .map(|d| CurrencySchema {
            enabled: true,
            code_dimension: d.key.clone(),
            base_currency: d.sample_values.first().cloned().unwrap_or_default(),
            rates: Default::default(),
        })
}
