//! Concatenation of two views.

use std::borrow::Cow;

use super::RecordView;

/// Two views read end-to-end, without merging storage.
///
/// Key lists are reported from the first view.
pub struct ConcatView<'a> {
    first: &'a dyn RecordView,
    second: &'a dyn RecordView,
}

impl<'a> ConcatView<'a> {
    pub fn new(first: &'a dyn RecordView, second: &'a dyn RecordView) -> Self {
        Self { first, second }
    }
}

impl RecordView for ConcatView<'_> {
    fn len(&self) -> usize {
        self.first.len() + self.second.len()
    }

    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>> {
        let split = self.first.len();
        if index < split {
            self.first.dimension(index, key)
        } else {
            self.second.dimension(index - split, key)
        }
    }

    fn measure(&self, index: usize, key: &str) -> Option<f64> {
        let split = self.first.len();
        if index < split {
            self.first.measure(index, key)
        } else {
            self.second.measure(index - split, key)
        }
    }

    fn dimension_keys(&self) -> &[String] {
        self.first.dimension_keys()
    }

    fn measure_keys(&self) -> &[String] {
        self.first.measure_keys()
    }
}
