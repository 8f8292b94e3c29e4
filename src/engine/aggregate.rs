//! Grouping, aggregation, sorting and limiting.
//!
//! Groups hold [`SubView`]s over the working view, so builders and template
//! resolution can read a group's records without copying them. Two-level
//! groups select their sub-views from the same parent as the primary group.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::query::{Aggregation, SortMode};
use crate::view::{dimension_value, RecordView, SubView};

/// Key of the single group produced when no group-by key is given.
pub const TOTAL_GROUP_KEY: &str = "all";

const MAX_GROUP_LEVELS: usize = 2;

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// One partition of a view with its computed value.
#[derive(Debug)]
pub struct Group<'v> {
    pub key: String,
    pub label: String,
    pub value: f64,
    pub count: usize,
    pub sub_groups: Vec<Group<'v>>,
    /// Records belonging to this group.
    pub view: SubView<'v>,
}

impl<'v> Group<'v> {
    fn new(key: String, view: SubView<'v>) -> Self {
        Self {
            label: key.clone(),
            key,
            value: 0.0,
            count: 0,
            sub_groups: Vec::new(),
            view,
        }
    }

    fn aggregate(&mut self, measure: &str, aggregation: Aggregation) {
        self.count = self.view.len();
        if self.count == 0 {
            return;
        }
        self.value = match aggregation {
            Aggregation::Count => self.count as f64,
            Aggregation::Avg => avg_measure(&self.view, measure),
            Aggregation::Max => max_measure(&self.view, measure),
            Aggregation::Min => min_measure(&self.view, measure),
            Aggregation::Passthrough => 0.0,
            Aggregation::Sum
            | Aggregation::List
            | Aggregation::Growth
            | Aggregation::Ratio => sum_measure(&self.view, measure),
        };
    }
}

/// Partition, aggregate, sort and truncate.
///
/// Zero keys yield one `"all"`/`"Total"` group over the whole view. One key
/// partitions by first-seen value. Two keys nest a second partition inside
/// each primary group; further keys are ignored.
pub fn group_and_aggregate<'v>(
    view: &'v dyn RecordView,
    group_by: &[String],
    measure: &str,
    aggregation: Aggregation,
    sort: SortMode,
    limit: usize,
) -> Vec<Group<'v>> {
    if group_by.len() > MAX_GROUP_LEVELS {
        tracing::warn!(
            requested = group_by.len(),
            used = MAX_GROUP_LEVELS,
            "only two group-by levels are supported"
        );
    }

    let mut groups = match group_by {
        [] => {
            let mut total = Group::new(TOTAL_GROUP_KEY.to_string(), SubView::identity(view));
            total.label = "Total".to_string();
            vec![total]
        }
        [key] => group_single(view, key),
        [primary, secondary, ..] => {
            let mut groups = group_single(view, primary);
            for group in &mut groups {
                group.sub_groups = partition(&group.view, secondary)
                    .into_iter()
                    .map(|(key, local)| Group::new(key, group.view.select(&local)))
                    .collect();
            }
            groups
        }
    };

    for group in &mut groups {
        group.aggregate(measure, aggregation);
        for sub in &mut group.sub_groups {
            sub.aggregate(measure, aggregation);
        }
    }

    sort_groups(&mut groups, sort);

    if limit > 0 {
        groups.truncate(limit);
    }
    groups
}

fn group_single<'v>(view: &'v dyn RecordView, key: &str) -> Vec<Group<'v>> {
    partition(view, key)
        .into_iter()
        .map(|(value, indices)| Group::new(value, SubView::with_indices(view, indices)))
        .collect()
}

/// Indices of `view` per distinct value of `key`, in first-seen order.
fn partition<V>(view: &V, key: &str) -> Vec<(String, Vec<usize>)>
where
    V: RecordView + ?Sized,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut partitions: Vec<(String, Vec<usize>)> = Vec::new();

    for i in 0..view.len() {
        let value = dimension_value(view, i, key);
        match slots.get(&*value) {
            Some(&slot) => partitions[slot].1.push(i),
            None => {
                slots.insert(value.to_string(), partitions.len());
                partitions.push((value.into_owned(), vec![i]));
            }
        }
    }
    partitions
}

/// Order groups in place. Sorting is stable, so ties keep grouping order.
pub fn sort_groups(groups: &mut [Group<'_>], sort: SortMode) {
    let by_label = |a: &Group<'_>, b: &Group<'_>| a.key.to_lowercase().cmp(&b.key.to_lowercase());
    let by_date = |a: &Group<'_>, b: &Group<'_>| sortable_date(&a.key).cmp(&sortable_date(&b.key));

    match sort {
        SortMode::ValueDesc => groups.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortMode::ValueAsc => groups.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortMode::Chronological => groups.sort_by(by_date),
        SortMode::ReverseChronological => groups.sort_by(|a, b| by_date(b, a)),
        SortMode::LabelAsc => groups.sort_by(by_label),
        SortMode::LabelDesc => groups.sort_by(|a, b| by_label(b, a)),
        SortMode::Preserve => {}
    }
}

/// Sortable integer for a `"Mon-YYYY"` value: `year * 100 + month`.
///
/// Returns 0 when the value does not parse.
pub fn month_order(value: &str) -> i32 {
    let Some((month, year)) = value.trim().split_once('-') else {
        return 0;
    };
    let month = month.to_lowercase();
    let Some(position) = MONTH_NAMES.iter().position(|name| *name == month) else {
        return 0;
    };
    match parse_year(year) {
        Some(year) => year * 100 + position as i32 + 1,
        None => 0,
    }
}

/// Sortable integer for a group key: `"Mon-YYYY"` or a bare four-digit year.
pub fn sortable_date(key: &str) -> i32 {
    match month_order(key) {
        0 => parse_year(key.trim()).map_or(0, |year| year * 100),
        order => order,
    }
}

fn parse_year(value: &str) -> Option<i32> {
    if value.len() == 4 && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else {
        None
    }
}

/// Compare two `"Mon-YYYY"` values chronologically.
pub fn compare_months(a: &str, b: &str) -> Ordering {
    month_order(a).cmp(&month_order(b))
}

/// Sum of a measure; absent values count as zero.
pub fn sum_measure<V>(view: &V, measure: &str) -> f64
where
    V: RecordView + ?Sized,
{
    (0..view.len())
        .map(|i| view.measure(i, measure).unwrap_or(0.0))
        .sum()
}

/// Mean of a measure over every record; 0 for an empty view.
pub fn avg_measure<V>(view: &V, measure: &str) -> f64
where
    V: RecordView + ?Sized,
{
    match view.len() {
        0 => 0.0,
        n => sum_measure(view, measure) / n as f64,
    }
}

/// Largest present value; 0 when no record has the measure.
pub fn max_measure<V>(view: &V, measure: &str) -> f64
where
    V: RecordView + ?Sized,
{
    (0..view.len())
        .filter_map(|i| view.measure(i, measure))
        .reduce(f64::max)
        .unwrap_or(0.0)
}

/// Smallest present value; 0 when no record has the measure.
pub fn min_measure<V>(view: &V, measure: &str) -> f64
where
    V: RecordView + ?Sized,
{
    (0..view.len())
        .filter_map(|i| view.measure(i, measure))
        .reduce(f64::min)
        .unwrap_or(0.0)
}
