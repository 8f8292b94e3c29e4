//! Render-ready output types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};
use super::query::{Intent, Visualization};

/// The outcome of one query execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub success: bool,
    pub reply: String,
    pub title: String,
    /// Exactly one presentation payload; its tag is serialized as `type`.
    #[serde(flatten)]
    pub payload: Payload,
    pub display_unit: String,
    pub currency_converted: bool,
    /// Recoverable issues, such as currency codes with no conversion rate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl QueryResult {
    /// A successful text result that only carries a reply.
    pub fn message(reply: impl Into<String>, unit: &str) -> Self {
        Self {
            success: true,
            reply: reply.into(),
            title: String::new(),
            payload: Payload::Text(TextData::empty(unit)),
            display_unit: unit.to_string(),
            currency_converted: false,
            warnings: Vec::new(),
        }
    }

    /// Presentation kind of the payload.
    pub fn kind(&self) -> Intent {
        match self.payload {
            Payload::Chart(_) => Intent::Chart,
            Payload::Table(_) => Intent::Table,
            Payload::Text(_) => Intent::Text,
        }
    }

    pub fn chart(&self) -> Option<&ChartConfig> {
        match &self.payload {
            Payload::Chart(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&TableData> {
        match &self.payload {
            Payload::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Encode as JSON for a rendering front end.
    pub fn to_json(&self) -> EngineResult<String> {
        serde_json::to_string(self).map_err(EngineError::ResultEncode)
    }
}

/// Presentation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Payload {
    Chart(ChartConfig),
    Table(TableData),
    Text(TextData),
}

/// Chart style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
    StackedBar,
    Area,
}

impl From<Option<Visualization>> for ChartKind {
    fn from(hint: Option<Visualization>) -> Self {
        match hint {
            Some(Visualization::Line) => ChartKind::Line,
            Some(Visualization::Pie) => ChartKind::Pie,
            Some(Visualization::StackedBar) => ChartKind::StackedBar,
            Some(Visualization::Area) => ChartKind::Area,
            _ => ChartKind::Bar,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: String,
    pub y_axis: String,
    pub series: Vec<ChartSeries>,
    pub colors: Vec<String>,
    pub show_legend: bool,
    pub show_grid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub data: Vec<ChartPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A labelled point. `value` is `None` where a series has no data for the
/// label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub title: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl TableData {
    pub(crate) fn empty(title: &str) -> Self {
        Self {
            title: title.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
            summary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    pub align: Align,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Currency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Totals row: a label plus formatted totals keyed by column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub label: String,
    pub values: BTreeMap<String, String>,
}

/// A single formatted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub value: String,
    pub raw_value: f64,
    pub unit: String,
    pub period: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth: Option<GrowthData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<RatioData>,
}

impl TextData {
    pub(crate) fn empty(unit: &str) -> Self {
        Self {
            value: "0".to_string(),
            raw_value: 0.0,
            unit: unit.to_string(),
            period: "No data".to_string(),
            count: 0,
            growth: None,
            ratio: None,
        }
    }
}

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthDirection {
    #[serde(rename = "increased")]
    Increased,
    #[serde(rename = "decreased")]
    Decreased,
    #[serde(rename = "unchanged")]
    Unchanged,
    #[serde(rename = "insufficient data")]
    InsufficientData,
}

impl GrowthDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            GrowthDirection::Increased => "increased",
            GrowthDirection::Decreased => "decreased",
            GrowthDirection::Unchanged => "unchanged",
            GrowthDirection::InsufficientData => "insufficient data",
        }
    }
}

impl fmt::Display for GrowthDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthData {
    pub earliest_value: f64,
    pub latest_value: f64,
    pub earliest_period: String,
    pub latest_period: String,
    pub change_amount: f64,
    pub change_percent: f64,
    pub direction: GrowthDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioData {
    pub numerator_total: f64,
    pub denominator_total: f64,
    pub percentage: f64,
    pub numerator_label: String,
    pub denominator_label: String,
}
