//! Integration tests for grouping, aggregation, sorting and limits.

#[path = "../common/mod.rs"]
mod common;

use tally::engine::aggregate::{compare_months, group_and_aggregate, Group, TOTAL_GROUP_KEY};
use tally::engine::{apply_filters, Aggregation, Filters, SortMode};
use tally::view::{RecordView, SliceView};

fn keys(groups: &[Group<'_>]) -> Vec<String> {
    groups.iter().map(|g| g.key.clone()).collect()
}

fn by(key: &str) -> Vec<String> {
    vec![key.to_string()]
}

#[test]
fn test_group_by_field_value_desc() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let groups = group_and_aggregate(
        &view,
        &by("field"),
        "amount",
        Aggregation::Sum,
        SortMode::ValueDesc,
        3,
    );

    assert_eq!(keys(&groups), ["Salary", "Rent", "Groceries"]);
    assert_eq!(groups[0].value, 26000.0);
    assert_eq!(groups[0].count, 3);
    assert_eq!(groups[1].value, 6600.0);
    assert_eq!(groups[2].value, 1300.0);
}

#[test]
fn test_group_views_hold_member_records() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let groups = group_and_aggregate(
        &view,
        &by("location"),
        "amount",
        Aggregation::Count,
        SortMode::Preserve,
        0,
    );

    assert_eq!(keys(&groups), ["Singapore", "India"]);
    let india = &groups[1];
    assert_eq!(india.value, 2.0);
    assert_eq!(india.view.len(), 2);
    assert_eq!(india.view.dimension(1, "field").as_deref(), Some("Property Tax"));
}

#[test]
fn test_grouping_a_filtered_view() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let expenses = apply_filters(&view, &Filters::new().with("category", ["Expense"]));
    let groups = group_and_aggregate(
        &expenses,
        &by("month"),
        "amount",
        Aggregation::Avg,
        SortMode::ReverseChronological,
        0,
    );

    assert_eq!(keys(&groups), ["Mar-2026", "Feb-2026", "Jan-2026"]);
    assert_eq!(groups[0].value, 1650.0);
    assert_eq!(groups[2].value, 1400.0);
}

#[test]
fn test_group_by_virtual_year() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let groups = group_and_aggregate(
        &view,
        &by("year"),
        "amount",
        Aggregation::Max,
        SortMode::Preserve,
        0,
    );
    assert_eq!(keys(&groups), ["2026"]);
    assert_eq!(groups[0].value, 25000.0);
}

#[test]
fn test_two_levels_and_extra_keys_ignored() {
    let records = common::finance_records();
    let view = SliceView::new(&records);
    let group_by = vec![
        "month".to_string(),
        "category".to_string(),
        "location".to_string(),
    ];
    let groups = group_and_aggregate(
        &view,
        &group_by,
        "amount",
        Aggregation::Sum,
        SortMode::Chronological,
        0,
    );

    assert_eq!(groups.len(), 3);
    let jan = &groups[0];
    assert_eq!(jan.key, "Jan-2026");
    assert_eq!(keys(&jan.sub_groups), ["Income", "Expense"]);
    assert_eq!(jan.sub_groups[0].value, 33500.0);
    assert_eq!(jan.sub_groups[1].value, 2800.0);
    assert!(jan.sub_groups.iter().all(|s| s.sub_groups.is_empty()));
}

#[test]
fn test_total_group_and_min() {
    let records = common::sgd_records();
    let view = SliceView::new(&records);
    let groups = group_and_aggregate(&view, &[], "amount", Aggregation::Min, SortMode::Preserve, 0);

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, TOTAL_GROUP_KEY);
    assert_eq!(groups[0].value, 600.0);
    assert_eq!(groups[0].count, 9);
}

#[test]
fn test_label_sort_is_case_insensitive() {
    let records: Vec<_> = ["beta", "Alpha", "gamma"]
        .into_iter()
        .map(|name| {
            tally::view::Record::new()
                .with_dimension("name", name)
                .with_measure("amount", 1.0)
        })
        .collect();
    let view = SliceView::new(&records);
    let groups = group_and_aggregate(
        &view,
        &by("name"),
        "amount",
        Aggregation::Sum,
        SortMode::LabelAsc,
        0,
    );
    assert_eq!(keys(&groups), ["Alpha", "beta", "gamma"]);
}

#[test]
fn test_compare_months() {
    use std::cmp::Ordering;
    assert_eq!(compare_months("Dec-2025", "Jan-2026"), Ordering::Less);
    assert_eq!(compare_months("Mar-2026", "Feb-2026"), Ordering::Greater);
}
