//! Index-list views used by filtering and grouping.

use std::borrow::Cow;
use std::fmt;

use super::RecordView;

/// A subset of a parent view, addressed by parent indices.
///
/// `indices == None` is the identity view: every parent index, in order,
/// without allocating an index list.
pub struct SubView<'a> {
    parent: &'a dyn RecordView,
    indices: Option<Vec<usize>>,
}

impl<'a> SubView<'a> {
    /// A view over every record of `parent`.
    pub fn identity(parent: &'a dyn RecordView) -> Self {
        Self {
            parent,
            indices: None,
        }
    }

    /// A view over the given parent indices.
    pub fn with_indices(parent: &'a dyn RecordView, indices: Vec<usize>) -> Self {
        Self {
            parent,
            indices: Some(indices),
        }
    }

    /// Translate a local index to the parent's index.
    #[inline]
    pub fn parent_index(&self, index: usize) -> Option<usize> {
        match &self.indices {
            None => (index < self.parent.len()).then_some(index),
            Some(indices) => indices.get(index).copied(),
        }
    }

    /// Narrow this view to a subset of its own (local) indices.
    ///
    /// The result points at the same parent, so nesting never stacks views.
    pub fn select(&self, local: &[usize]) -> SubView<'a> {
        let indices = local
            .iter()
            .filter_map(|&i| self.parent_index(i))
            .collect();
        SubView::with_indices(self.parent, indices)
    }

    /// The view this sub-view indexes into.
    pub fn parent(&self) -> &'a dyn RecordView {
        self.parent
    }
}

impl RecordView for SubView<'_> {
    fn len(&self) -> usize {
        match &self.indices {
            None => self.parent.len(),
            Some(indices) => indices.len(),
        }
    }

    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>> {
        self.parent.dimension(self.parent_index(index)?, key)
    }

    fn measure(&self, index: usize, key: &str) -> Option<f64> {
        self.parent.measure(self.parent_index(index)?, key)
    }

    fn dimension_keys(&self) -> &[String] {
        self.parent.dimension_keys()
    }

    fn measure_keys(&self) -> &[String] {
        self.parent.measure_keys()
    }
}

impl fmt::Debug for SubView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubView")
            .field("len", &self.len())
            .field("identity", &self.indices.is_none())
            .finish()
    }
}
