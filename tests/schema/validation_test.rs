//! Discovery against realistic exports from three unrelated domains.

#[path = "../common/mod.rs"]
mod common;

use tally::engine::Aggregation;
use tally::schema::discover::RECORD_COUNT_MEASURE;
use tally::schema::{discover, DiscoverOptions, SchemaDescription};

fn discover_csv(csv: &str) -> SchemaDescription {
    discover(&common::table(csv), &DiscoverOptions::default()).unwrap()
}

fn skipped(schema: &SchemaDescription) -> Vec<&str> {
    schema
        .skipped_columns
        .iter()
        .map(|s| s.column.as_str())
        .collect()
}

fn unit<'a>(schema: &'a SchemaDescription, key: &str) -> Option<&'a str> {
    schema.measure(key).and_then(|m| m.unit.as_deref())
}

fn assert_record_count(schema: &SchemaDescription) {
    let count = schema.measure(RECORD_COUNT_MEASURE).unwrap();
    assert!(count.is_synthetic);
    assert_eq!(count.aggregations, [Aggregation::Count]);
    assert_eq!(schema.measures.last().map(|m| m.key.as_str()), Some(RECORD_COUNT_MEASURE));
}

#[test]
fn test_issue_tracker_export() {
    let schema = discover_csv(common::JIRA_CSV);

    assert_eq!(
        schema.dimension_keys(),
        [
            "issue_type",
            "status",
            "priority",
            "assignee",
            "reporter",
            "component",
            "sprint",
            "story_points",
            "created",
            "resolved",
            "labels",
        ]
    );
    assert_eq!(skipped(&schema), ["Issue Key", "Summary"]);
    assert!(schema.currency.is_none());

    assert!(schema.dimension("created").unwrap().is_temporal);
    assert!(schema.dimension("resolved").unwrap().is_temporal);
    assert!(!schema.dimension("sprint").unwrap().is_temporal);

    // Five point values over twenty issues is a coded scale, whatever the header says.
    let points = schema.dimension("story_points").unwrap();
    assert_eq!(points.sample_values, ["13", "2", "3", "5", "8"]);
    assert!(points.parent.is_none());
    assert!(schema.measure("story_points").is_none());
    assert_eq!(
        schema.measure_keys(),
        [
            "original_estimate_(hours)",
            "time_spent_(hours)",
            RECORD_COUNT_MEASURE,
        ]
    );
    assert_eq!(unit(&schema, "original_estimate_(hours)"), Some("hours"));
    assert_eq!(unit(&schema, "time_spent_(hours)"), Some("hours"));
    assert_record_count(&schema);
}

#[test]
fn test_ecommerce_export() {
    let schema = discover_csv(common::ECOMMERCE_CSV);
    let dimensions = schema.dimension_keys();

    for key in ["category", "sub_category", "region", "city", "currency"] {
        assert!(dimensions.contains(&key), "missing dimension {key}");
    }
    assert!(skipped(&schema).contains(&"Order ID"));
    assert_eq!(
        schema.dimension("sub_category").unwrap().parent.as_deref(),
        Some("category")
    );
    assert!(schema.dimension("order_date").unwrap().is_temporal);
    assert!(schema.dimension("ship_date").unwrap().is_temporal);

    assert_eq!(unit(&schema, "quantity"), Some("units"));
    assert_eq!(unit(&schema, "revenue"), Some("currency"));
    assert!(schema.measure("revenue").unwrap().is_currency);
    assert_eq!(unit(&schema, "shipping_cost"), Some("currency"));

    let currency = schema.currency.as_ref().unwrap();
    assert_eq!(currency.code_dimension, "currency");
    assert_eq!(currency.base_currency, "BRL");
    assert!(schema.dimension("currency").unwrap().is_currency_code);
    assert_record_count(&schema);
}

#[test]
fn test_hr_export() {
    let schema = discover_csv(common::HR_CSV);
    let dimensions = schema.dimension_keys();

    for key in ["department", "job_title", "level", "location", "employment_status"] {
        assert!(dimensions.contains(&key), "missing dimension {key}");
    }
    let skipped = skipped(&schema);
    assert!(skipped.contains(&"Employee ID"));
    assert!(skipped.contains(&"Full Name"));
    assert!(schema.dimension("hire_date").unwrap().is_temporal);

    assert_eq!(unit(&schema, "annual_salary"), Some("currency"));
    let bonus = schema.measure("bonus_percent").unwrap();
    assert_eq!(bonus.unit.as_deref(), Some("percent"));
    assert_eq!(bonus.default_aggregation, Aggregation::Avg);
    let score = schema.measure("performance_score").unwrap();
    assert_eq!(score.unit.as_deref(), Some("points"));
    assert_eq!(score.default_aggregation, Aggregation::Avg);
    assert_record_count(&schema);
}
