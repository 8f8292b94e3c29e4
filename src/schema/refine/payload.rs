//! What the model sees, and what it sends back.
//!
//! The payload carries column metadata only: names, keys, roles, a handful
//! of distinct samples and a coarse unique-count estimate. Row data never
//! leaves the process.

use serde::{Deserialize, Serialize};

use super::transport::truncate;
use crate::schema::error::RefineError;
use crate::schema::{CardinalityHint, SchemaDescription};

/// Samples per column sent to the model.
pub const PAYLOAD_SAMPLES: usize = 5;

/// Characters of an unparsable response kept in the error.
const RESPONSE_EXCERPT: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinePayload {
    pub columns: Vec<PayloadColumn>,
    /// Not tracked by schema descriptions; always 0.
    pub row_count: usize,
    pub detected: DetectedPatterns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadColumn {
    pub name: String,
    pub key: String,
    pub role: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub samples: Vec<String>,
    pub unique: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_temporal: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_currency_code: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPatterns {
    pub has_currency: bool,
    pub has_temporal: bool,
    /// `"child → parent"` pairs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hierarchies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_columns: Vec<String>,
}

/// Unique-count estimate sent for a cardinality hint.
pub fn estimate_unique(hint: Option<CardinalityHint>) -> usize {
    match hint {
        Some(CardinalityHint::Low) => 5,
        Some(CardinalityHint::Medium) => 30,
        Some(CardinalityHint::High) => 200,
        None => 10,
    }
}

/// Metadata for every dimension and every non-synthetic measure.
pub fn build_payload(draft: &SchemaDescription) -> RefinePayload {
    let dimensions = draft.dimensions.iter().map(|d| PayloadColumn {
        name: d.display_name.clone(),
        key: d.key.clone(),
        role: "dimension",
        kind: if d.is_temporal { "temporal" } else { "string" },
        samples: d.sample_values.iter().take(PAYLOAD_SAMPLES).cloned().collect(),
        unique: estimate_unique(d.cardinality_hint),
        is_temporal: d.is_temporal,
        is_currency_code: d.is_currency_code,
        parent: d.parent.clone(),
    });

    let measures = draft
        .measures
        .iter()
        .filter(|m| !m.is_synthetic)
        .map(|m| PayloadColumn {
            name: m.display_name.clone(),
            key: m.key.clone(),
            role: "measure",
            kind: "numeric",
            samples: Vec::new(),
            unique: 0,
            is_temporal: false,
            is_currency_code: false,
            parent: None,
        });

    let detected = DetectedPatterns {
        has_currency: draft.currency.as_ref().is_some_and(|c| c.enabled),
        has_temporal: draft.dimensions.iter().any(|d| d.is_temporal),
        hierarchies: draft
            .dimensions
            .iter()
            .filter_map(|d| d.parent.as_ref().map(|p| format!("{} → {}", d.key, p)))
            .collect(),
        skipped_columns: draft
            .skipped_columns
            .iter()
            .map(|s| s.column.clone())
            .collect(),
    };

    RefinePayload {
        columns: dimensions.chain(measures).collect(),
        row_count: 0,
        detected,
    }
}

/// The instruction prompt with the payload embedded as pretty JSON.
pub fn build_prompt(payload: &RefinePayload) -> Result<String, RefineError> {
    let metadata = serde_json::to_string_pretty(payload).map_err(RefineError::Payload)?;
    Ok(format!(
        r#"You are a data analyst inspecting a dataset's structure. Based on the column metadata below, provide semantic enrichments.

COLUMN METADATA:
{metadata}

INSTRUCTIONS:
1. Suggest a concise, descriptive name for this dataset (2-5 words)
2. Write a one-line description of what this dataset contains
3. For each column, provide:
   - displayName: Human-friendly label (e.g., "story_points" → "Story Points")
   - description: What this column represents in the domain (e.g., "Issue severity level")
   - unit: For measures only, one of "currency", "hours", "points", "percent", "units", or "" if unknown
   - sortHint: For ordinal dimensions, the natural ordering (e.g., "P1 > P2 > P3 > P4")
   - defaultAggregation: For measures, one of "sum", "avg", "count", "max", "min"
4. Suggest any hierarchies the heuristics may have missed (parent → child relationships)
5. Flag any columns currently classified as "skipped" that should probably be included

Respond with ONLY valid JSON (no markdown, no backticks):
{{
  "datasetName": "...",
  "datasetDescription": "...",
  "enrichments": [
    {{
      "key": "column_key",
      "displayName": "...",
      "description": "...",
      "unit": "",
      "sortHint": "",
      "defaultAggregation": ""
    }}
  ],
  "suggestedHierarchies": [
    {{"parent": "parent_key", "child": "child_key", "reason": "..."}}
  ],
  "recoverColumns": [
    {{"column": "column_name", "reason": "...", "suggestedRole": "dimension"}}
  ]
}}"#
    ))
}

/// Parsed model answer. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Enrichment {
    pub dataset_name: String,
    pub dataset_description: String,
    pub enrichments: Vec<ColumnEnrichment>,
    pub suggested_hierarchies: Vec<HierarchySuggestion>,
    pub recover_columns: Vec<RecoverSuggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ColumnEnrichment {
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub unit: String,
    pub sort_hint: String,
    pub default_aggregation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HierarchySuggestion {
    pub parent: String,
    pub child: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecoverSuggestion {
    pub column: String,
    pub reason: String,
    pub suggested_role: String,
}

/// Decode a model answer, tolerating a surrounding markdown code fence.
pub fn parse_response(response: &str) -> Result<Enrichment, RefineError> {
    let trimmed = response.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let unfenced = unfenced.strip_suffix("```").unwrap_or(unfenced).trim();

    serde_json::from_str(unfenced).map_err(|source| RefineError::Parse {
        source,
        excerpt: truncate(unfenced, RESPONSE_EXCERPT),
    })
}
