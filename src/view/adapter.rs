//! Typed-adapter views over application structs.
//!
//! A [`DomainAdapter`] is declared once per source type with one accessor per
//! dimension and measure key, then bound to any number of slices. Reads go
//! straight through the accessors, so application data is never converted
//! into generic [`Record`](super::Record)s.
//!
//! ```
//! use tally::view::{DomainAdapter, RecordView};
//!
//! struct Expense {
//!     category: String,
//!     amount: f64,
//! }
//!
//! let adapter = DomainAdapter::<Expense>::new()
//!     .dimension("category", |e: &Expense| e.category.as_str())
//!     .measure("amount", |e: &Expense| e.amount);
//!
//! let data = vec![Expense { category: "Travel".into(), amount: 42.0 }];
//! let view = adapter.bind(&data);
//! assert_eq!(view.dimension(0, "category").as_deref(), Some("Travel"));
//! ```

use std::borrow::Cow;
use std::collections::HashMap;

use super::RecordView;

enum DimensionAccessor<T> {
    /// Returns a borrow into the record; zero-copy.
    Borrowed(Box<dyn Fn(&T) -> &str + Send + Sync>),
    /// Computes a value on read (formatted dates, enums, derived labels).
    Computed(Box<dyn Fn(&T) -> String + Send + Sync>),
}

type MeasureAccessor<T> = Box<dyn Fn(&T) -> Option<f64> + Send + Sync>;

/// Registry of per-key accessors for a source type `T`.
pub struct DomainAdapter<T> {
    dimensions: HashMap<String, DimensionAccessor<T>>,
    measures: HashMap<String, MeasureAccessor<T>>,
    dimension_keys: Vec<String>,
    measure_keys: Vec<String>,
}

impl<T> Default for DomainAdapter<T> {
    fn default() -> Self {
        Self {
            dimensions: HashMap::new(),
            measures: HashMap::new(),
            dimension_keys: Vec::new(),
            measure_keys: Vec::new(),
        }
    }
}

impl<T> DomainAdapter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension that borrows a string field.
    pub fn dimension<F>(mut self, key: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> &str + Send + Sync + 'static,
    {
        self.insert_dimension(key.into(), DimensionAccessor::Borrowed(Box::new(accessor)));
        self
    }

    /// Register a dimension whose value is computed on each read.
    pub fn computed_dimension<F>(mut self, key: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.insert_dimension(key.into(), DimensionAccessor::Computed(Box::new(accessor)));
        self
    }

    /// Register a measure that is always present.
    pub fn measure<F>(self, key: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> f64 + Send + Sync + 'static,
    {
        self.optional_measure(key, move |item: &T| Some(accessor(item)))
    }

    /// Register a measure that may be absent for some records.
    pub fn optional_measure<F>(mut self, key: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> Option<f64> + Send + Sync + 'static,
    {
        let key = key.into();
        if !self.measures.contains_key(&key) {
            self.measure_keys.push(key.clone());
        }
        self.measures.insert(key, Box::new(accessor));
        self
    }

    /// Bind the adapter to a slice of data.
    pub fn bind<'a>(&'a self, data: &'a [T]) -> DomainView<'a, T> {
        DomainView {
            adapter: self,
            data,
        }
    }

    fn insert_dimension(&mut self, key: String, accessor: DimensionAccessor<T>) {
        if !self.dimensions.contains_key(&key) {
            self.dimension_keys.push(key.clone());
        }
        self.dimensions.insert(key, accessor);
    }
}

/// A [`DomainAdapter`] bound to concrete data.
pub struct DomainView<'a, T> {
    adapter: &'a DomainAdapter<T>,
    data: &'a [T],
}

impl<T> RecordView for DomainView<'_, T> {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>> {
        let item = self.data.get(index)?;
        match self.adapter.dimensions.get(key)? {
            DimensionAccessor::Borrowed(f) => Some(Cow::Borrowed(f(item))),
            DimensionAccessor::Computed(f) => Some(Cow::Owned(f(item))),
        }
    }

    fn measure(&self, index: usize, key: &str) -> Option<f64> {
        let item = self.data.get(index)?;
        (self.adapter.measures.get(key)?)(item)
    }

    fn dimension_keys(&self) -> &[String] {
        &self.adapter.dimension_keys
    }

    fn measure_keys(&self) -> &[String] {
        &self.adapter.measure_keys
    }
}
