//! Zero-copy data access.
//!
//! Every layer above this module reads data exclusively through the
//! [`RecordView`] trait. A view is a read-only, indexed facade over a set of
//! records; it never owns caller data and never copies it. Composite views
//! hold either index lists or references into a parent view.
//!
//! # Variants
//!
//! | View | Wraps | Used for |
//! |------|-------|----------|
//! | [`SliceView`] | `&[Record]` | generic rows from a parser |
//! | [`DomainView`] | `&[T]` + registered accessors | application structs, no conversion |
//! | [`SubView`] | parent + index list | filtering, grouping |
//! | [`ConcatView`] | two views end-to-end | ratio period labels |
//! | [`CurrencyView`] | parent + rate table | on-read currency normalization |
//!
//! # Example
//!
//! ```
//! use tally::view::{Record, RecordView, SliceView};
//!
//! let records = vec![
//!     Record::new().with_dimension("month", "Jan-2026").with_measure("amount", 100.0),
//!     Record::new().with_dimension("month", "Feb-2026").with_measure("amount", 250.0),
//! ];
//! let view = SliceView::new(&records);
//! assert_eq!(view.len(), 2);
//! assert_eq!(view.measure(1, "amount"), Some(250.0));
//! ```

mod adapter;
mod concat;
mod currency;
mod slice;
mod sub;

pub use adapter::{DomainAdapter, DomainView};
pub use concat::ConcatView;
pub use currency::CurrencyView;
pub use slice::SliceView;
pub use sub::SubView;

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Dimension holding `"Mon-YYYY"` month buckets.
///
/// Growth analysis and period labels read this key by convention.
pub const MONTH_DIMENSION: &str = "month";

/// Virtual dimension derived from [`MONTH_DIMENSION`].
pub const YEAR_DIMENSION: &str = "year";

/// One logical row: string dimensions and numeric measures.
///
/// A missing key means "no value", which is distinct from an empty string or
/// zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub dimensions: BTreeMap<String, String>,
    #[serde(default)]
    pub measures: BTreeMap<String, f64>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a dimension value.
    pub fn with_dimension(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dimensions.insert(key.into(), value.into());
        self
    }

    /// Builder: set a measure value.
    pub fn with_measure(mut self, key: impl Into<String>, value: f64) -> Self {
        self.measures.insert(key.into(), value);
        self
    }
}

/// Indexed, read-only access to a dataset.
///
/// Implementations are called in tight loops by the engine. For the duration
/// of a query, reading the same index and key twice must return the same
/// value.
pub trait RecordView {
    /// Number of records visible through this view.
    fn len(&self) -> usize;

    /// Whether the view has no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension value at `index`, or `None` when the record has no value for
    /// `key` or the index is out of range.
    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>>;

    /// Measure value at `index`, or `None` when absent or out of range.
    fn measure(&self, index: usize, key: &str) -> Option<f64>;

    /// All dimension keys known to this view.
    fn dimension_keys(&self) -> &[String];

    /// All measure keys known to this view.
    fn measure_keys(&self) -> &[String];
}

/// Read a dimension, resolving the virtual `year` dimension.
///
/// A physically stored `year` wins. Otherwise `year` is derived from the
/// `month` dimension (`"Jan-2026"` → `"2026"`). Absent values read as `""`.
pub fn dimension_value<'v, V>(view: &'v V, index: usize, key: &str) -> Cow<'v, str>
where
    V: RecordView + ?Sized,
{
    if let Some(value) = view.dimension(index, key) {
        return value;
    }
    if key == YEAR_DIMENSION {
        if let Some(year) = view
            .dimension(index, MONTH_DIMENSION)
            .and_then(|month| year_of_month(&month).map(str::to_owned))
        {
            return Cow::Owned(year);
        }
    }
    Cow::Borrowed("")
}

/// Extract the year from a `"Mon-YYYY"` value.
pub(crate) fn year_of_month(month: &str) -> Option<&str> {
    let mut parts = month.split('-');
    let (_, year, rest) = (parts.next()?, parts.next()?, parts.next());
    if rest.is_some() || year.is_empty() {
        return None;
    }
    Some(year)
}

/// Distinct non-empty values of a dimension, in first-seen order.
pub fn unique_values<V>(view: &V, key: &str) -> Vec<String>
where
    V: RecordView + ?Sized,
{
    let mut seen = std::collections::HashSet::new();
    let mut values = Vec::new();
    for i in 0..view.len() {
        let value = dimension_value(view, i, key);
        if !value.is_empty() && seen.insert(value.to_string()) {
            values.push(value.into_owned());
        }
    }
    values
}
