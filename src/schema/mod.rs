//! Dataset schema descriptions.
//!
//! A [`SchemaDescription`] tells consumers which fields of a dataset are
//! dimensions (grouping and filtering), which are measures (aggregated
//! numbers), how currency codes are stored, and which columns were left out
//! during discovery and why.
//!
//! Descriptions are produced heuristically by [`discover`] and may be
//! enriched once by [`refine`]. Both are pure with respect to their input:
//! discovery reads a [`RawTable`], refinement works on a copy of the draft.

pub mod discover;
pub mod error;
pub mod refine;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::query::Aggregation;
use crate::engine::executor::FALLBACK_MEASURE;

pub use discover::{discover, DiscoverOptions, RawTable};
pub use error::{DiscoveryError, DiscoveryResult, RefineError, RefineFailure, RefineResult};
pub use refine::{refine, GeminiConfig, GeminiTransport, RefineTransport};

/// Name given to discovered datasets when no override is supplied.
pub const DEFAULT_DATASET_NAME: &str = "Auto-discovered Dataset";

/// Current schema description format version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Complete description of a dataset's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchemaDescription {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub dimensions: Vec<DimensionDescriptor>,
    pub measures: Vec<MeasureDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencySchema>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub discovered_from: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub discovered_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_columns: Vec<SkippedColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refined_by: Option<String>,
}

impl SchemaDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: SCHEMA_VERSION.to_string(),
            ..Default::default()
        }
    }

    pub fn dimension_keys(&self) -> Vec<&str> {
        self.dimensions.iter().map(|d| d.key.as_str()).collect()
    }

    pub fn measure_keys(&self) -> Vec<&str> {
        self.measures.iter().map(|m| m.key.as_str()).collect()
    }

    pub fn dimension(&self, key: &str) -> Option<&DimensionDescriptor> {
        self.dimensions.iter().find(|d| d.key == key)
    }

    pub fn measure(&self, key: &str) -> Option<&MeasureDescriptor> {
        self.measures.iter().find(|m| m.key == key)
    }

    /// Key of the first measure, or `"amount"` when there are none.
    pub fn default_measure(&self) -> &str {
        self.measures
            .first()
            .map_or(FALLBACK_MEASURE, |m| m.key.as_str())
    }

    /// Pretty-printed JSON, as consumers cache it.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A string field used for grouping and filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionDescriptor {
    pub key: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sample_values: Vec<String>,
    pub groupable: bool,
    pub filterable: bool,
    /// Key of the parent dimension when this one rolls up into it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_temporal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_order: Option<TemporalOrder>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_currency_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardinality_hint: Option<CardinalityHint>,
    /// Natural ordering for ordinal values, e.g. `P1 > P2 > P3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_hint: Option<String>,
}

impl DimensionDescriptor {
    /// A groupable, filterable dimension.
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            groupable: true,
            filterable: true,
            ..Default::default()
        }
    }

    pub fn with_samples<I, S>(mut self, samples: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sample_values = samples.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// A numeric field that is aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureDescriptor {
    pub key: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `currency`, `hours`, `points`, `percent`, `units`, or a free-form unit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_currency: bool,
    /// Generated by discovery rather than read from a column.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_synthetic: bool,
    pub aggregations: Vec<Aggregation>,
    pub default_aggregation: Aggregation,
}

impl Default for MeasureDescriptor {
    fn default() -> Self {
        Self {
            key: String::new(),
            display_name: String::new(),
            description: None,
            unit: None,
            is_currency: false,
            is_synthetic: false,
            aggregations: vec![
                Aggregation::Sum,
                Aggregation::Avg,
                Aggregation::Min,
                Aggregation::Max,
                Aggregation::Count,
            ],
            default_aggregation: Aggregation::Sum,
        }
    }
}

impl MeasureDescriptor {
    /// A measure supporting sum/avg/min/max/count, defaulting to sum.
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: display_name.into(),
            ..Default::default()
        }
    }
}

/// Currency settings carried by a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrencySchema {
    pub enabled: bool,
    /// Dimension that holds ISO currency codes.
    pub code_dimension: String,
    pub base_currency: String,
    /// `code → base` conversion rates; discovery leaves this empty.
    pub rates: HashMap<String, f64>,
}

/// A column left out of the schema during discovery.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkippedColumn {
    /// Original header text.
    pub column: String,
    pub reason: String,
    /// Whether the column may be forced back in as a dimension.
    pub recoverable: bool,
    /// Role proposed by refinement; never applied automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_role: Option<String>,
}

/// Coarse distinct-value count of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardinalityHint {
    Low,
    Medium,
    High,
}

impl CardinalityHint {
    pub const LOW_MAX: usize = 10;
    pub const MEDIUM_MAX: usize = 100;

    pub fn from_unique_count(unique: usize) -> Self {
        if unique <= Self::LOW_MAX {
            CardinalityHint::Low
        } else if unique <= Self::MEDIUM_MAX {
            CardinalityHint::Medium
        } else {
            CardinalityHint::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CardinalityHint::Low => "low",
            CardinalityHint::Medium => "medium",
            CardinalityHint::High => "high",
        }
    }
}

impl fmt::Display for CardinalityHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering of temporal values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalOrder {
    #[default]
    Chronological,
    Reverse,
}
