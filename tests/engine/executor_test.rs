//! End-to-end execution tests: translator JSON in, render-ready result out.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashMap;

use insta::assert_snapshot;
use tally::engine::{
    execute, Aggregation, ExecuteOptions, Filters, GrowthDirection, Intent, Payload, Query,
};
use tally::schema::{discover, DiscoverOptions};
use tally::view::{Record, SliceView};

fn sgd_options() -> ExecuteOptions {
    ExecuteOptions::new().with_currency(
        "SGD",
        "currency",
        HashMap::from([("INR".to_string(), 0.016)]),
    )
}

#[test]
fn test_chart_query_from_json() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::from_json(
        r#"{
            "intent": "chart",
            "filters": {"dimensions": {"category": ["Expense"]}},
            "aggregation": "sum",
            "measure": "amount",
            "groupBy": ["month"],
            "sortBy": "date_asc",
            "visualize": "line",
            "title": "Monthly expenses",
            "reply": "Expenses peaked at {top_amount} in {top_category}."
        }"#,
    )
    .unwrap();

    let result = execute(&query, &view, &ExecuteOptions::new());
    assert!(result.success);
    assert_eq!(result.kind(), Intent::Chart);
    assert_eq!(result.title, "Monthly expenses");
    assert_snapshot!(result.reply, @"Expenses peaked at 3,300.00 in Mar-2026.");

    let chart = result.chart().unwrap();
    assert_eq!(chart.x_axis, "Month");
    let labels: Vec<_> = chart.series[0].data.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, ["Jan-2026", "Feb-2026", "Mar-2026"]);
    assert_eq!(chart.series[0].name, "Monthly expenses");
}

#[test]
fn test_mixed_currency_total_is_normalized() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_filters(Filters::new().with("category", ["Income"]))
        .with_reply("Income was {total} in {period}.");

    let result = execute(&query, &view, &sgd_options());
    assert!(result.currency_converted);
    assert_eq!(result.display_unit, "SGD");
    assert!(result.warnings.is_empty());
    assert_snapshot!(result.reply, @"Income was SGD 26,400.00 in Jan-2026 – Mar-2026.");
    assert!((result.text().unwrap().raw_value - 26_400.0).abs() < 1e-6);

    // Source records are never rewritten.
    assert_eq!(records[3].measures["amount"], 25000.0);
}

#[test]
fn test_missing_rate_becomes_warning() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let options = ExecuteOptions::new().with_currency(
        "SGD",
        "currency",
        HashMap::from([("USD".to_string(), 1.35)]),
    );

    let result = execute(&Query::default(), &view, &options);
    assert!(result.currency_converted);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("INR"));
}

#[test]
fn test_single_currency_is_displayed_as_is() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let query = Query::default().with_filters(Filters::new().with("location", ["India"]));

    let result = execute(&query, &view, &sgd_options());
    assert!(!result.currency_converted);
    assert_eq!(result.display_unit, "INR");
    assert_eq!(result.text().unwrap().value, "INR 30,000.00");
}

#[test]
fn test_ratio_query() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::from_json(
        r#"{
            "intent": "text",
            "aggregation": "ratio",
            "filters": {"dimensions": {"category": ["Expense"]}},
            "compareFilters": {"dimensions": {"field": ["Rent"]}},
            "reply": "Rent is {ratio_percent} of your expenses ({numerator_total} of {denominator_total})."
        }"#,
    )
    .unwrap();

    let result = execute(&query, &view, &ExecuteOptions::new());
    assert_snapshot!(
        result.reply,
        @"Rent is 73.3% of your expenses (6,600.00 of 9,000.00)."
    );
    let ratio = result.text().unwrap().ratio.as_ref().unwrap();
    assert_eq!(ratio.numerator_label, "Rent");
}

#[test]
fn test_ratio_default_reply() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_aggregation(Aggregation::Ratio)
        .with_filters(Filters::new().with("category", ["Expense"]))
        .with_compare_filters(Filters::new().with("field", ["Travel"]));

    let result = execute(&query, &view, &ExecuteOptions::new());
    assert_snapshot!(result.reply, @"Travel is 12.2% of Expense in Jan-2026 – Mar-2026.");
}

#[test]
fn test_ratio_percent_is_rounded_to_one_decimal() {
    let records: Vec<Record> = [
        ("Jan-2026", "Expense", "Rent", 10000.0),
        ("Jan-2026", "Expense", "Travel", 1000.0),
        ("Feb-2026", "Expense", "Rent", 3500.0),
        ("Feb-2026", "Expense", "Travel", 2000.0),
        ("Feb-2026", "Income", "Salary", 9000.0),
    ]
    .into_iter()
    .map(|(month, category, field, amount)| {
        Record::new()
            .with_dimension("month", month)
            .with_dimension("category", category)
            .with_dimension("field", field)
            .with_measure("amount", amount)
    })
    .collect();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_aggregation(Aggregation::Ratio)
        .with_filters(Filters::new().with("category", ["Expense"]))
        .with_compare_filters(Filters::new().with("field", ["Travel"]))
        .with_reply("Travel takes {ratio_percent} of {denominator_total}.");

    let result = execute(&query, &view, &ExecuteOptions::new());
    assert_snapshot!(result.reply, @"Travel takes 18.2% of 16,500.00.");
    let ratio = result.text().unwrap().ratio.as_ref().unwrap();
    assert_eq!(ratio.denominator_total, 16500.0);
    assert_eq!(ratio.numerator_total, 3000.0);
    assert!((ratio.percentage - 18.18).abs() < 0.01);
}

#[test]
fn test_ratio_with_unmatched_numerator_is_zero() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_aggregation(Aggregation::Ratio)
        .with_filters(Filters::new().with("category", ["Expense"]))
        .with_compare_filters(Filters::new().with("field", ["Yacht"]));

    let result = execute(&query, &view, &ExecuteOptions::new());
    assert_snapshot!(result.reply, @"Yacht is 0.0% of Expense in Jan-2026 – Mar-2026.");
    let ratio = result.text().unwrap().ratio.as_ref().unwrap();
    assert_eq!(ratio.numerator_total, 0.0);
    assert_eq!(ratio.denominator_total, 9000.0);
}

#[test]
fn test_growth_query() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_aggregation(Aggregation::Growth)
        .with_filters(Filters::new().with("category", ["Expense"]))
        .with_reply(
            "Spending {direction} {growth_percent} from {earliest_value} to {latest_value}.",
        );

    let result = execute(&query, &view, &ExecuteOptions::new());
    let text = result.text().unwrap();
    assert_eq!(text.growth.as_ref().unwrap().direction, GrowthDirection::Increased);
    assert_snapshot!(result.reply, @"Spending increased 17.9% from 2,800.00 to 3,300.00.");
}

#[test]
fn test_repairs_inconsistent_queries() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);

    let chart_without_groups = Query::default().with_intent(Intent::Chart);
    let result = execute(&chart_without_groups, &view, &ExecuteOptions::new());
    assert_eq!(result.kind(), Intent::Text);

    let list_as_text = Query::default()
        .with_aggregation(Aggregation::List)
        .with_filters(Filters::new().with("field", ["Rent"]));
    let result = execute(&list_as_text, &view, &ExecuteOptions::new());
    let table = result.table().unwrap();
    assert_eq!(table.rows.len(), 3);

    let max_table = Query::default()
        .with_intent(Intent::Table)
        .with_aggregation(Aggregation::Max);
    let result = execute(&max_table, &view, &ExecuteOptions::new());
    assert_eq!(result.kind(), Intent::Text);
    assert_eq!(result.text().unwrap().raw_value, 9000.0);
}

#[test]
fn test_empty_and_unmatched() {
    let empty: Vec<Record> = Vec::new();
    let view = SliceView::new(&empty);
    let result = execute(&Query::default(), &view, &ExecuteOptions::new());
    assert!(result.success);
    assert_eq!(result.reply, "No data available to analyze.");
    assert!(matches!(result.payload, Payload::Text(_)));

    let records = common::finance_records();
    let view = SliceView::new(&records);
    let query = Query::default().with_filters(Filters::new().with("field", ["Yacht"]));
    let result = execute(&query, &view, &ExecuteOptions::new());
    assert!(result.success);
    assert_eq!(
        result.reply,
        "No records match your query filters. Try broadening your search."
    );
}

#[test]
fn test_default_measure_from_discovered_schema() {
    let schema =
        discover(&common::table(common::FINANCE_CSV), &DiscoverOptions::default()).unwrap();
    let options = ExecuteOptions::from_schema(&schema);
    assert_eq!(options.default_measure.as_deref(), Some("amount"));
    assert_eq!(options.currency.as_ref().unwrap().dimension, "currency");

    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let result = execute(&Query::default(), &view, &options);
    assert_eq!(result.text().unwrap().raw_value, 35_000.0);
}

#[test]
fn test_result_json_shape() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_intent(Intent::Table)
        .group_by("field")
        .with_title("By field");
    let result = execute(&query, &view, &ExecuteOptions::new());

    let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
    assert_eq!(json["type"], "table");
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["columns"][0]["label"], "Field");
    assert_eq!(json["data"]["rows"][0][0], "Salary");
}
