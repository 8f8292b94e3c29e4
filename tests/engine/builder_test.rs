//! Integration tests for chart, table and text builders and reply templates.

#[path = "../common/mod.rs"]
mod common;

use insta::assert_snapshot;
use tally::engine::aggregate::group_and_aggregate;
use tally::engine::builder::{build_chart, build_table, build_text, PALETTE};
use tally::engine::template::resolve_template;
use tally::engine::{apply_filters, Aggregation, ChartKind, Filters, Intent, Query, SortMode};
use tally::view::SliceView;

#[test]
fn test_month_by_category_chart() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_intent(Intent::Chart)
        .group_by("month")
        .group_by("category");
    let groups = group_and_aggregate(
        &view,
        &query.group_by,
        "amount",
        Aggregation::Sum,
        SortMode::Chronological,
        0,
    );
    let chart = build_chart(&query, &groups).unwrap();

    assert_eq!(chart.kind, ChartKind::Bar);
    assert!(chart.show_grid);
    assert_eq!(chart.colors, [PALETTE[0], PALETTE[1]]);

    let income = &chart.series[0];
    assert_eq!(income.name, "Income");
    let values: Vec<_> = income.data.iter().map(|p| p.value).collect();
    assert_eq!(values, [Some(8500.0), Some(8500.0), Some(9000.0)]);

    let expense = &chart.series[1];
    assert_eq!(expense.name, "Expense");
    assert_eq!(expense.data[2].label, "Mar-2026");
    assert_eq!(expense.data[2].value, Some(3300.0));
}

#[test]
fn test_list_table_over_filtered_view() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let india = apply_filters(&view, &Filters::new().with("location", ["India"]));
    let query = Query::default()
        .with_intent(Intent::Table)
        .with_aggregation(Aggregation::List)
        .with_title("India");
    let table = build_table(&query, &[], &india, "amount", "INR");

    let labels: Vec<_> = table.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(
        labels,
        ["Category", "Currency", "Field", "Location", "Month", "Amount"]
    );
    assert_eq!(
        table.rows[0],
        ["Income", "INR", "Rental Income", "India", "Jan-2026", "25000.00"]
    );
    let summary = table.summary.unwrap();
    assert_eq!(summary.label, "Total (2 records)");
    assert_eq!(summary.values["amount"], "INR 30,000.00");
}

#[test]
fn test_grouped_table_with_limit() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let query = Query::default()
        .with_intent(Intent::Table)
        .with_aggregation(Aggregation::Avg)
        .group_by("field");
    let groups = group_and_aggregate(
        &view,
        &query.group_by,
        "amount",
        query.aggregation,
        SortMode::ValueAsc,
        2,
    );
    let table = build_table(&query, &groups, &view, "amount", "SGD");

    assert_eq!(table.columns[1].label, "Average");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0], ["Groceries", "650.00", "2"]);
    assert_eq!(table.rows[1], ["Travel", "1100.00", "1"]);
}

#[test]
fn test_text_count_and_average() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);

    let count = build_text(
        &Query::default().with_aggregation(Aggregation::Count),
        &view,
        "amount",
        "SGD",
    );
    assert_eq!(count.value, "9");
    assert_eq!(count.period, "Jan-2026 – Mar-2026");

    let rent = apply_filters(&view, &Filters::new().with("field", ["Rent"]));
    let avg = build_text(
        &Query::default().with_aggregation(Aggregation::Avg),
        &rent,
        "amount",
        "SGD",
    );
    assert_eq!(avg.value, "SGD 2,200.00");
    assert_eq!(avg.count, 3);
}

fn reply(template: &str, filters: Filters) -> String {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let filtered = apply_filters(&view, &filters);
    let groups = group_and_aggregate(
        &filtered,
        &["field".to_string()],
        "amount",
        Aggregation::Sum,
        SortMode::Preserve,
        0,
    );
    resolve_template(template, &groups, &filtered, "amount", "SGD")
}

#[test]
fn test_reply_top_group() {
    assert_snapshot!(
        reply(
            "Your biggest item was {top_category} at {top_amount} ({count} records, avg {avg}).",
            Filters::new(),
        ),
        @"Your biggest item was Salary at SGD 26,000.00 (9 records, avg SGD 3,888.89)."
    );
}

#[test]
fn test_reply_growth_range() {
    assert_snapshot!(
        reply(
            "Between {earliest_period} and {latest_period} spending {direction} by {change_amount}.",
            Filters::new().with("category", ["Expense"]),
        ),
        @"Between Jan-2026 and Mar-2026 spending increased by SGD 500.00."
    );
}

#[test]
fn test_reply_extremes() {
    assert_snapshot!(
        reply(
            "Expenses ranged from {min} to {max} in {currency}.",
            Filters::new().with("category", ["Expense"]),
        ),
        @"Expenses ranged from SGD 600.00 to SGD 2,200.00 in SGD."
    );
}

#[test]
fn test_reply_strips_unknown_placeholder() {
    assert_snapshot!(reply("Total {total} {mystery}.", Filters::new()), @"Total SGD 35,000.00");
}

#[test]
fn test_reply_default() {
    assert_snapshot!(
        reply("", Filters::new().with("field", ["Rent"])),
        @"Found 3 records totalling SGD 6,600.00."
    );
}
