//! The structured query consumed by the executor.
//!
//! Queries are usually produced by an upstream translator as JSON. Field
//! names are camelCase and every field is optional; enumerations accept the
//! historical spellings (`amount_desc`, `date_asc`, `alpha_asc`, ...) and
//! fall back to a safe default for anything unrecognized.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::filter::Filters;

/// Presentation kind of a query result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Intent {
    Chart,
    Table,
    #[default]
    Text,
}

impl From<&str> for Intent {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "chart" => Intent::Chart,
            "table" => Intent::Table,
            _ => Intent::Text,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Chart => write!(f, "chart"),
            Intent::Table => write!(f, "table"),
            Intent::Text => write!(f, "text"),
        }
    }
}

/// How each group's value is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    Avg,
    Max,
    Min,
    /// One row per record; the sum is kept only as a sort key.
    List,
    /// Period-over-period change across the `month` dimension.
    Growth,
    /// Numerator/denominator percentage across two filter sets.
    Ratio,
    /// Groups are formed but no value is computed.
    #[serde(rename = "none")]
    Passthrough,
}

impl From<&str> for Aggregation {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "count" => Aggregation::Count,
            "avg" | "average" | "mean" => Aggregation::Avg,
            "max" => Aggregation::Max,
            "min" => Aggregation::Min,
            "list" => Aggregation::List,
            "growth" => Aggregation::Growth,
            "ratio" => Aggregation::Ratio,
            "none" => Aggregation::Passthrough,
            _ => Aggregation::Sum,
        }
    }
}

impl Aggregation {
    /// Axis and column label for values of this aggregation.
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Sum => "Amount",
            Aggregation::Count => "Count",
            Aggregation::Avg => "Average",
            Aggregation::Max => "Maximum",
            Aggregation::Min => "Minimum",
            _ => "Value",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Avg => "avg",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
            Aggregation::List => "list",
            Aggregation::Growth => "growth",
            Aggregation::Ratio => "ratio",
            Aggregation::Passthrough => "none",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group ordering applied after aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SortMode {
    ValueDesc,
    ValueAsc,
    Chronological,
    ReverseChronological,
    LabelAsc,
    LabelDesc,
    /// Keep first-seen grouping order.
    #[default]
    #[serde(rename = "none")]
    Preserve,
}

impl From<&str> for SortMode {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "value_desc" | "amount_desc" => SortMode::ValueDesc,
            "value_asc" | "amount_asc" => SortMode::ValueAsc,
            "chronological" | "date_asc" => SortMode::Chronological,
            "reverse_chronological" | "date_desc" => SortMode::ReverseChronological,
            "label_asc" | "alpha_asc" => SortMode::LabelAsc,
            "label_desc" | "alpha_desc" => SortMode::LabelDesc,
            _ => SortMode::Preserve,
        }
    }
}

/// Rendering hint from the query source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Visualization {
    #[default]
    Bar,
    Line,
    Pie,
    StackedBar,
    Area,
    Table,
    Text,
}

impl From<&str> for Visualization {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "line" => Visualization::Line,
            "pie" => Visualization::Pie,
            "stacked_bar" | "stacked" => Visualization::StackedBar,
            "area" => Visualization::Area,
            "table" => Visualization::Table,
            "text" => Visualization::Text,
            _ => Visualization::Bar,
        }
    }
}

macro_rules! from_owned_string {
    ($($ty:ty),*) => {
        $(impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self::from(s.as_str())
            }
        })*
    };
}

from_owned_string!(Intent, Aggregation, SortMode, Visualization);

/// A structured computation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    pub intent: Intent,
    pub filters: Filters,
    /// Numerator filters; only read by ratio queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_filters: Option<Filters>,
    pub aggregation: Aggregation,
    /// Measure key; empty means "use the configured default".
    pub measure: String,
    pub group_by: Vec<String>,
    #[serde(rename = "sortBy")]
    pub sort: SortMode,
    /// Maximum number of groups; 0 is unlimited.
    pub limit: usize,
    #[serde(rename = "visualize", skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
    pub title: String,
    /// Reply template with `{placeholder}` tokens.
    #[serde(rename = "reply")]
    pub reply_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl Query {
    /// Decode a query from translator JSON.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(EngineError::QueryDecode)
    }

    /// Repair internally inconsistent combinations.
    ///
    /// - `list` aggregation always renders as a table.
    /// - A chart without group-by dimensions becomes text.
    /// - `max`/`min` without group-by dimensions becomes text.
    pub fn normalize(mut self) -> Self {
        let mut changed = false;

        if self.aggregation == Aggregation::List && self.intent != Intent::Table {
            self.intent = Intent::Table;
            self.visualization = Some(Visualization::Table);
            changed = true;
        }

        if self.intent == Intent::Chart && self.group_by.is_empty() {
            self.intent = Intent::Text;
            self.visualization = Some(Visualization::Text);
            changed = true;
        }

        if matches!(self.aggregation, Aggregation::Max | Aggregation::Min)
            && self.group_by.is_empty()
            && self.intent != Intent::Text
        {
            self.intent = Intent::Text;
            self.visualization = Some(Visualization::Text);
            changed = true;
        }

        if changed {
            tracing::debug!(
                intent = %self.intent,
                aggregation = %self.aggregation,
                group_by = ?self.group_by,
                "adjusted inconsistent query"
            );
        }

        self
    }

    /// Builder: set intent.
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = intent;
        self
    }

    /// Builder: set aggregation.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Builder: set the measure key.
    pub fn with_measure(mut self, measure: impl Into<String>) -> Self {
        self.measure = measure.into();
        self
    }

    /// Builder: append a group-by dimension.
    pub fn group_by(mut self, dimension: impl Into<String>) -> Self {
        self.group_by.push(dimension.into());
        self
    }

    /// Builder: set filters.
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// Builder: set ratio numerator filters.
    pub fn with_compare_filters(mut self, filters: Filters) -> Self {
        self.compare_filters = Some(filters);
        self
    }

    /// Builder: set sort mode.
    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Builder: set the group limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder: set the visualization hint.
    pub fn with_visualization(mut self, visualization: Visualization) -> Self {
        self.visualization = Some(visualization);
        self
    }

    /// Builder: set title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Builder: set the reply template.
    pub fn with_reply(mut self, template: impl Into<String>) -> Self {
        self.reply_template = template.into();
        self
    }
}
