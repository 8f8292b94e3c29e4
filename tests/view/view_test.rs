//! Integration tests for the view layer: composition of sub, concat and
//! currency views over slice and domain sources.

#[path = "../common/mod.rs"]
mod common;

use std::collections::HashMap;

use tally::view::{
    dimension_value, unique_values, ConcatView, CurrencyView, DomainAdapter, Record, RecordView,
    SliceView, SubView,
};

#[test]
fn test_slice_view_keys_first_seen() {
    let records = common::finance_records();
    let view = SliceView::new(&records);

    assert_eq!(view.len(), 11);
    assert_eq!(
        view.dimension_keys(),
        ["category", "currency", "field", "location", "month"]
    );
    assert_eq!(view.measure_keys(), ["amount"]);
    assert_eq!(view.dimension(3, "location").as_deref(), Some("India"));
    assert_eq!(view.measure(3, "amount"), Some(25000.0));
    assert!(view.dimension(99, "month").is_none());
}

#[test]
fn test_nested_sub_views_read_through_to_source() {
    let records = common::finance_records();
    let base = SliceView::new(&records);

    let expenses: Vec<usize> = (0..base.len())
        .filter(|&i| base.dimension(i, "category").as_deref() == Some("Expense"))
        .collect();
    let outer = SubView::with_indices(&base, expenses);
    assert_eq!(outer.len(), 7);

    let inner = outer.select(&[0, 2]);
    assert_eq!(inner.len(), 2);
    assert_eq!(inner.dimension(0, "field").as_deref(), Some("Rent"));
    assert_eq!(inner.dimension(1, "field").as_deref(), Some("Rent"));
    assert_eq!(inner.parent_index(1), Some(5));
    assert_eq!(inner.parent_index(2), None);
}

#[test]
fn test_virtual_year_through_sub_view() {
    let records = common::finance_records();
    let base = SliceView::new(&records);
    let view = SubView::identity(&base);

    assert_eq!(dimension_value(&view, 0, "year"), "2026");
    assert_eq!(unique_values(&view, "year"), ["2026"]);
    assert_eq!(unique_values(&view, "month"), ["Jan-2026", "Feb-2026", "Mar-2026"]);
}

#[test]
fn test_concat_view_spans_both_sides() {
    let left = vec![Record::new().with_dimension("month", "Jan-2026").with_measure("amount", 1.0)];
    let right = vec![
        Record::new().with_dimension("month", "Feb-2026").with_measure("amount", 2.0),
        Record::new().with_dimension("month", "Mar-2026").with_measure("amount", 3.0),
    ];
    let (a, b) = (SliceView::new(&left), SliceView::new(&right));
    let view = ConcatView::new(&a, &b);

    assert_eq!(view.len(), 3);
    assert_eq!(view.dimension(0, "month").as_deref(), Some("Jan-2026"));
    assert_eq!(view.dimension(2, "month").as_deref(), Some("Mar-2026"));
    assert_eq!(view.measure(1, "amount"), Some(2.0));
    assert_eq!(view.measure(3, "amount"), None);
}

#[test]
fn test_currency_view_over_filtered_records() {
    let records = common::finance_records();
    let base = SliceView::new(&records);
    let india = SubView::with_indices(&base, vec![3, 7]);
    let rates = HashMap::from([("INR".to_string(), 0.016)]);
    let view = CurrencyView::new(&india, "amount", "currency", "SGD", &rates);

    assert!((view.measure(0, "amount").unwrap_or_default() - 400.0).abs() < 1e-9);
    assert!((view.measure(1, "amount").unwrap_or_default() - 80.0).abs() < 1e-9);
    assert_eq!(view.dimension(0, "currency").as_deref(), Some("SGD"));
    assert_eq!(view.dimension(0, "location").as_deref(), Some("India"));

    // Source data is untouched.
    assert_eq!(base.measure(3, "amount"), Some(25000.0));
}

#[test]
fn test_domain_view_without_conversion() {
    struct Ticket {
        team: String,
        priority: u8,
        hours: f64,
    }

    let adapter = DomainAdapter::<Ticket>::new()
        .dimension("team", |t: &Ticket| t.team.as_str())
        .computed_dimension("priority", |t: &Ticket| format!("P{}", t.priority))
        .measure("hours", |t: &Ticket| t.hours);

    let tickets = vec![
        Ticket {
            team: "Core".into(),
            priority: 1,
            hours: 4.0,
        },
        Ticket {
            team: "Web".into(),
            priority: 2,
            hours: 2.5,
        },
        Ticket {
            team: "Core".into(),
            priority: 2,
            hours: 1.0,
        },
    ];
    let view = adapter.bind(&tickets);
    let core = SubView::with_indices(&view, vec![0, 2]);

    assert_eq!(core.len(), 2);
    assert_eq!(core.dimension(1, "priority").as_deref(), Some("P2"));
    assert_eq!(core.measure(0, "hours"), Some(4.0));
    assert_eq!(unique_values(&view, "team"), ["Core", "Web"]);
    assert_eq!(view.dimension_keys(), ["team", "priority"]);
}
