//! Query execution: filter → normalize → group → build → resolve reply.
//!
//! Execution is synchronous, performs no I/O, and never fails. Empty data
//! and unmatched filters produce successful text results explaining why
//! there is nothing to show.

use std::collections::HashMap;

use super::aggregate::group_and_aggregate;
use super::analysis::{ratio_text, ratio_totals};
use super::builder::{build_chart, build_table, build_text};
use super::currency::{plan_currency, CurrencyConfig, CurrencyPlan};
use super::filter::{apply_filters, Filters};
use super::format::{format_currency, format_percent};
use super::query::{Aggregation, Intent, Query};
use super::result::{GrowthDirection, Payload, QueryResult};
use super::template::{fill_placeholders, resolve_template};
use crate::schema::SchemaDescription;
use crate::view::{ConcatView, CurrencyView, RecordView};

/// Measure aggregated when neither the query nor the options name one.
pub const FALLBACK_MEASURE: &str = "amount";

const NO_DATA_REPLY: &str = "No data available to analyze.";
const NO_MATCH_REPLY: &str = "No records match your query filters. Try broadening your search.";
const NO_CHART_REPLY: &str = "Not enough data to generate a chart.";

/// Per-execution options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteOptions {
    /// Measure used when the query leaves it empty.
    pub default_measure: Option<String>,
    /// Currency normalization settings.
    pub currency: Option<CurrencyConfig>,
}

impl ExecuteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the default measure.
    pub fn with_default_measure(mut self, measure: impl Into<String>) -> Self {
        self.default_measure = Some(measure.into());
        self
    }

    /// Builder: enable currency normalization.
    pub fn with_currency(
        mut self,
        base_currency: impl Into<String>,
        dimension: impl Into<String>,
        rates: HashMap<String, f64>,
    ) -> Self {
        self.currency = Some(CurrencyConfig::new(base_currency, dimension, rates));
        self
    }

    /// Builder: use an existing currency configuration.
    pub fn with_currency_config(mut self, config: CurrencyConfig) -> Self {
        self.currency = Some(config);
        self
    }

    /// Defaults derived from a schema: its first non-synthetic measure and
    /// its currency configuration, when enabled.
    pub fn from_schema(schema: &SchemaDescription) -> Self {
        let default_measure = schema
            .measures
            .iter()
            .find(|m| !m.is_synthetic)
            .or_else(|| schema.measures.first())
            .map(|m| m.key.clone());

        let currency = schema
            .currency
            .as_ref()
            .filter(|c| c.enabled && !c.code_dimension.is_empty())
            .map(|c| CurrencyConfig::new(&c.base_currency, &c.code_dimension, c.rates.clone()));

        Self {
            default_measure,
            currency,
        }
    }

    fn resolve_measure(&self, query: &Query) -> String {
        if !query.measure.is_empty() {
            return query.measure.clone();
        }
        match &self.default_measure {
            Some(measure) if !measure.is_empty() => measure.clone(),
            _ => FALLBACK_MEASURE.to_string(),
        }
    }
}

/// Run a query against a view.
///
/// The query is normalized first, so callers may pass translator output
/// as-is.
pub fn execute(query: &Query, view: &dyn RecordView, options: &ExecuteOptions) -> QueryResult {
    let query = query.clone().normalize();
    let measure = options.resolve_measure(&query);

    if view.is_empty() {
        return QueryResult::message(NO_DATA_REPLY, "");
    }

    tracing::debug!(
        records = view.len(),
        intent = %query.intent,
        aggregation = %query.aggregation,
        measure = %measure,
        "executing query"
    );

    if query.aggregation == Aggregation::Ratio {
        if let Some(compare) = &query.compare_filters {
            return execute_ratio(&query, compare, view, &measure, options);
        }
    }

    let filtered = apply_filters(view, &query.filters);
    if filtered.is_empty() {
        return QueryResult::message(NO_MATCH_REPLY, "");
    }

    tracing::debug!(
        before = view.len(),
        after = filtered.len(),
        "filtered records"
    );

    let plan = plan_currency(&filtered, options.currency.as_ref());
    let converted;
    let working: &dyn RecordView = match normalizing(options, &plan) {
        Some(config) => {
            converted = CurrencyView::new(
                &filtered,
                &measure,
                &config.dimension,
                &config.base_currency,
                &config.rates,
            );
            &converted
        }
        None => &filtered,
    };
    let unit = plan.display_unit.as_str();

    let groups = group_and_aggregate(
        working,
        &query.group_by,
        &measure,
        query.aggregation,
        query.sort,
        query.limit,
    );

    let mut result = QueryResult {
        warnings: plan.warning().into_iter().collect(),
        title: query.title.clone(),
        currency_converted: plan.convert,
        ..QueryResult::message(String::new(), unit)
    };

    match query.intent {
        Intent::Chart => match build_chart(&query, &groups) {
            Some(chart) => result.payload = Payload::Chart(chart),
            None => {
                result.payload = Payload::Text(build_text(&query, working, &measure, unit));
                result.reply = NO_CHART_REPLY.to_string();
                return result;
            }
        },
        Intent::Table => {
            result.payload = Payload::Table(build_table(&query, &groups, working, &measure, unit));
        }
        Intent::Text => {
            let text = build_text(&query, working, &measure, unit);
            let insufficient = query.aggregation == Aggregation::Growth
                && text
                    .growth
                    .as_ref()
                    .is_some_and(|g| g.direction == GrowthDirection::InsufficientData);
            if insufficient {
                result.reply = format!(
                    "Your data shows {} for {}. Need at least 2 months of data to show trends.",
                    text.value, text.period
                );
                result.payload = Payload::Text(text);
                return result;
            }
            result.payload = Payload::Text(text);
        }
    }

    result.reply = resolve_template(&query.reply_template, &groups, working, &measure, unit);
    result
}

/// The currency configuration to convert with, when the plan calls for it.
fn normalizing<'o>(options: &'o ExecuteOptions, plan: &CurrencyPlan) -> Option<&'o CurrencyConfig> {
    options.currency.as_ref().filter(|_| plan.convert)
}

/// Ratio queries filter the data twice: the primary filters form the
/// denominator and the compare filters form the numerator.
fn execute_ratio(
    query: &Query,
    compare: &Filters,
    view: &dyn RecordView,
    measure: &str,
    options: &ExecuteOptions,
) -> QueryResult {
    let denominator = apply_filters(view, &query.filters);
    let numerator = apply_filters(view, compare);

    let plan = plan_currency(
        &ConcatView::new(&denominator, &numerator),
        options.currency.as_ref(),
    );
    let (converted_denominator, converted_numerator);
    let (denominator_view, numerator_view): (&dyn RecordView, &dyn RecordView) =
        match normalizing(options, &plan) {
            Some(config) => {
                converted_denominator = CurrencyView::new(
                    &denominator,
                    measure,
                    &config.dimension,
                    &config.base_currency,
                    &config.rates,
                );
                converted_numerator = CurrencyView::new(
                    &numerator,
                    measure,
                    &config.dimension,
                    &config.base_currency,
                    &config.rates,
                );
                (&converted_denominator, &converted_numerator)
            }
            None => (&denominator, &numerator),
        };
    let unit = plan.display_unit.as_str();

    let ratio = ratio_totals(
        denominator_view,
        numerator_view,
        measure,
        query.filters.label(),
        compare.label(),
    );
    let text = ratio_text(&ratio, denominator_view, numerator_view, unit);

    let replacements = [
        ("{ratio_percent}", format_percent(ratio.percentage)),
        ("{numerator_total}", format_currency(ratio.numerator_total, unit)),
        ("{denominator_total}", format_currency(ratio.denominator_total, unit)),
        ("{numerator_label}", ratio.numerator_label.clone()),
        ("{denominator_label}", ratio.denominator_label.clone()),
        ("{period}", text.period.clone()),
        ("{total}", format_currency(ratio.numerator_total, unit)),
    ];
    let template = if query.reply_template.is_empty() {
        "{numerator_label} is {ratio_percent} of {denominator_label} in {period}."
    } else {
        query.reply_template.as_str()
    };
    let reply = fill_placeholders(template, &replacements);

    QueryResult {
        reply,
        title: query.title.clone(),
        currency_converted: plan.convert,
        warnings: plan.warning().into_iter().collect(),
        payload: Payload::Text(text),
        ..QueryResult::message(String::new(), unit)
    }
}
