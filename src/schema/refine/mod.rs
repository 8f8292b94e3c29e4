//! One-shot schema refinement through a hosted language model.
//!
//! [`refine`] sends column metadata for a draft schema to a
//! [`RefineTransport`], parses the answer, and layers display names,
//! descriptions, units and hierarchy suggestions onto a copy of the draft.
//! Any failure hands the untouched draft back inside [`RefineFailure`].

mod payload;
mod transport;

use chrono::{SecondsFormat, Utc};

use super::error::{RefineError, RefineFailure, RefineResult};
use super::SchemaDescription;
use crate::engine::query::Aggregation;

pub use payload::{
    build_payload, build_prompt, estimate_unique, parse_response, ColumnEnrichment,
    DetectedPatterns, Enrichment, HierarchySuggestion, PayloadColumn, RecoverSuggestion,
    RefinePayload, PAYLOAD_SAMPLES,
};
pub use transport::{
    GeminiConfig, GeminiTransport, RefineTransport, DEFAULT_ENDPOINT, DEFAULT_MODEL,
    DEFAULT_TIMEOUT,
};

/// Aggregations a model may pick as a measure's default.
const ACCEPTED_AGGREGATIONS: [&str; 5] = ["sum", "avg", "count", "max", "min"];

/// Enrich `draft` with a single model call.
///
/// The draft itself is never modified. On success the returned schema has
/// `refined_at` and `refined_by` set; on failure the error carries a clone
/// of the draft.
pub fn refine(draft: &SchemaDescription, transport: &dyn RefineTransport) -> RefineResult {
    tracing::debug!(
        transport = transport.name(),
        dimensions = draft.dimensions.len(),
        measures = draft.measures.len(),
        "refining schema"
    );
    let attempt = || -> Result<Enrichment, RefineError> {
        let prompt = build_prompt(&build_payload(draft))?;
        let response = transport.complete(&prompt)?;
        parse_response(&response)
    };

    match attempt() {
        Ok(enrichment) => {
            let refined = apply_enrichments(draft, &enrichment, transport.name());
            tracing::info!(
                transport = transport.name(),
                enriched = enrichment.enrichments.len(),
                hierarchies = enrichment.suggested_hierarchies.len(),
                "refined schema"
            );
            Ok(refined)
        }
        Err(e) => {
            tracing::warn!(transport = transport.name(), error = %e, "schema refinement failed");
            Err(RefineFailure::new(draft.clone(), e))
        }
    }
}

/// Layer `enrichment` onto a copy of `draft`.
///
/// Empty strings in the enrichment leave the draft's value in place. Unknown
/// keys are ignored. Hierarchy suggestions only attach to dimensions without
/// a parent, and only to a different, known parent dimension.
pub fn apply_enrichments(
    draft: &SchemaDescription,
    enrichment: &Enrichment,
    refined_by: &str,
) -> SchemaDescription {
    let mut schema = draft.clone();

    if !enrichment.dataset_name.is_empty() {
        schema.name = enrichment.dataset_name.clone();
    }
    if !enrichment.dataset_description.is_empty() {
        schema.description = Some(enrichment.dataset_description.clone());
    }

    for column in &enrichment.enrichments {
        if let Some(dimension) = schema.dimensions.iter_mut().find(|d| d.key == column.key) {
            if !column.display_name.is_empty() {
                dimension.display_name = column.display_name.clone();
            }
            if !column.description.is_empty() {
                dimension.description = Some(column.description.clone());
            }
            if !column.sort_hint.is_empty() {
                dimension.sort_hint = Some(column.sort_hint.clone());
            }
        } else if let Some(measure) = schema.measures.iter_mut().find(|m| m.key == column.key) {
            if !column.display_name.is_empty() {
                measure.display_name = column.display_name.clone();
            }
            if !column.description.is_empty() {
                measure.description = Some(column.description.clone());
            }
            if !column.unit.is_empty() {
                measure.unit = Some(column.unit.clone());
                measure.is_currency = column.unit == "currency";
            }
            let aggregation = column.default_aggregation.to_lowercase();
            if ACCEPTED_AGGREGATIONS.contains(&aggregation.as_str()) {
                measure.default_aggregation = Aggregation::from(aggregation.as_str());
            }
        }
    }

    for suggestion in &enrichment.suggested_hierarchies {
        if suggestion.child == suggestion.parent
            || schema.dimension(&suggestion.parent).is_none()
        {
            continue;
        }
        if let Some(child) = schema
            .dimensions
            .iter_mut()
            .find(|d| d.key == suggestion.child && d.parent.is_none())
        {
            tracing::debug!(
                child = %suggestion.child,
                parent = %suggestion.parent,
                "applied suggested hierarchy"
            );
            child.parent = Some(suggestion.parent.clone());
        }
    }

    for suggestion in &enrichment.recover_columns {
        if suggestion.suggested_role.is_empty() {
            continue;
        }
        if let Some(skipped) = schema
            .skipped_columns
            .iter_mut()
            .find(|s| s.column == suggestion.column)
        {
            skipped.suggested_role = Some(suggestion.suggested_role.clone());
        }
    }

    schema.refined_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    schema.refined_by = Some(refined_by.to_string());
    schema
}
