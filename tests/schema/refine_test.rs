//! Refinement through the public API with a scripted transport.

#[path = "../common/mod.rs"]
mod common;

use std::cell::RefCell;
use std::time::Duration;

use tally::config::{Settings, SettingsError};
use tally::engine::Aggregation;
use tally::schema::refine::{apply_enrichments, build_payload, parse_response, DEFAULT_MODEL};
use tally::schema::{
    discover, refine, DiscoverOptions, GeminiConfig, GeminiTransport, RefineError,
    RefineTransport, SchemaDescription,
};

/// Replays a fixed answer and keeps the prompts it was sent.
struct Scripted {
    answer: Option<&'static str>,
    prompts: RefCell<Vec<String>>,
}

impl Scripted {
    fn answering(answer: &'static str) -> Self {
        Self {
            answer: Some(answer),
            prompts: RefCell::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            answer: None,
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl RefineTransport for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, prompt: &str) -> Result<String, RefineError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answer
            .map(str::to_string)
            .ok_or(RefineError::EmptyResponse)
    }
}

const ANSWER: &str = r#"```json
{
  "datasetName": "Household Finance",
  "datasetDescription": "Monthly income and expenses across two countries.",
  "enrichments": [
    {"key": "field", "displayName": "Line Item", "description": "What the money was for"},
    {"key": "amount", "unit": "currency", "defaultAggregation": "Sum"},
    {"key": "record_count", "displayName": "Entries"}
  ],
  "suggestedHierarchies": [
    {"parent": "location", "child": "currency", "reason": "each country uses one currency"},
    {"parent": "month", "child": "field", "reason": "field already has a parent"}
  ]
}
```"#;

fn finance_draft() -> SchemaDescription {
    discover(&common::table(common::FINANCE_CSV), &DiscoverOptions::default()).unwrap()
}

#[test]
fn test_refine_discovered_schema() {
    let draft = finance_draft();
    let transport = Scripted::answering(ANSWER);
    let refined = refine(&draft, &transport).unwrap();

    let prompts = transport.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("\"key\": \"field\""));

    assert_eq!(refined.name, "Household Finance");
    assert_eq!(
        refined.description.as_deref(),
        Some("Monthly income and expenses across two countries.")
    );
    assert_eq!(refined.dimension("field").unwrap().display_name, "Line Item");
    assert_eq!(refined.dimension("field").unwrap().parent.as_deref(), Some("category"));
    assert_eq!(refined.dimension("currency").unwrap().parent.as_deref(), Some("location"));
    assert_eq!(refined.measure("record_count").unwrap().display_name, "Entries");
    assert_eq!(refined.measure("amount").unwrap().default_aggregation, Aggregation::Sum);
    assert_eq!(refined.refined_by.as_deref(), Some("scripted"));
    assert!(refined.refined_at.is_some());

    // The draft is untouched.
    assert_eq!(draft.name, "Auto-discovered Dataset");
    assert!(draft.refined_at.is_none());
}

#[test]
fn test_failure_returns_draft() {
    let draft = finance_draft();
    let failure = refine(&draft, &Scripted::failing()).unwrap_err();

    assert!(matches!(failure.source, RefineError::EmptyResponse));
    assert_eq!(failure.into_draft(), draft);
}

#[test]
fn test_garbage_answer_returns_draft() {
    let draft = finance_draft();
    let failure = refine(&draft, &Scripted::answering("I cannot help with that.")).unwrap_err();

    assert!(matches!(failure.source, RefineError::Parse { .. }));
    assert_eq!(failure.draft, draft);
}

#[test]
fn test_payload_describes_draft() {
    let payload = build_payload(&finance_draft());

    assert_eq!(payload.columns.len(), 6);
    let month = &payload.columns[0];
    assert_eq!(month.kind, "temporal");
    assert!(month.is_temporal);
    assert!(payload.detected.has_currency);
    assert!(payload.detected.has_temporal);
    assert_eq!(payload.detected.hierarchies, ["field → category"]);
    assert!(payload.columns.iter().all(|c| c.key != "record_count"));
}

#[test]
fn test_apply_parsed_enrichment() {
    let enrichment = parse_response(ANSWER).unwrap();
    let refined = apply_enrichments(&finance_draft(), &enrichment, "manual");
    assert_eq!(refined.refined_by.as_deref(), Some("manual"));
    assert_eq!(
        refined.dimension("field").unwrap().description.as_deref(),
        Some("What the money was for")
    );
}

#[test]
fn test_gemini_requires_key() {
    let err = GeminiTransport::new(GeminiConfig::new("  ")).unwrap_err();
    assert!(matches!(err, RefineError::MissingApiKey));

    let transport = GeminiTransport::new(
        GeminiConfig::new("test-key").with_timeout(Duration::from_secs(5)),
    )
    .unwrap();
    assert_eq!(transport.name(), "gemini");
    assert_eq!(transport.config().model, DEFAULT_MODEL);
}

#[test]
fn test_settings_build_gemini_config() {
    std::env::set_var("TALLY_TEST_REFINE_KEY", "from-env");
    let settings: Settings = toml::from_str(
        r#"
        [refine]
        api_key = "${TALLY_TEST_REFINE_KEY}"
        model = "gemini-2.5-pro"
        timeout_secs = 10
        "#,
    )
    .unwrap();

    let config = settings.gemini_config().unwrap();
    assert_eq!(config.api_key, "from-env");
    assert_eq!(config.model, "gemini-2.5-pro");
    assert_eq!(config.timeout, Duration::from_secs(10));

    let unset = Settings::default().gemini_config().unwrap_err();
    assert!(matches!(unset, SettingsError::InvalidConfig(_)));
}
