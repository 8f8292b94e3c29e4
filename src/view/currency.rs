//! On-read currency normalization.

use std::borrow::Cow;
use std::collections::HashMap;

use super::RecordView;

/// Converts one measure into a base currency as it is read.
///
/// A value is multiplied by `rates[code]` when the record's code differs from
/// the base currency and a positive rate is known. Values are recomputed on
/// every read. Reading the code dimension itself reports the base currency
/// for converted records.
pub struct CurrencyView<'a> {
    parent: &'a dyn RecordView,
    measure: &'a str,
    code_dimension: &'a str,
    base_currency: &'a str,
    rates: &'a HashMap<String, f64>,
}

impl<'a> CurrencyView<'a> {
    pub fn new(
        parent: &'a dyn RecordView,
        measure: &'a str,
        code_dimension: &'a str,
        base_currency: &'a str,
        rates: &'a HashMap<String, f64>,
    ) -> Self {
        Self {
            parent,
            measure,
            code_dimension,
            base_currency,
            rates,
        }
    }

    fn rate_at(&self, index: usize) -> Option<f64> {
        let code = self.parent.dimension(index, self.code_dimension)?;
        if code == self.base_currency {
            return None;
        }
        self.rates
            .get(&*code)
            .copied()
            .filter(|rate| *rate > 0.0)
    }
}

impl RecordView for CurrencyView<'_> {
    fn len(&self) -> usize {
        self.parent.len()
    }

    fn dimension(&self, index: usize, key: &str) -> Option<Cow<'_, str>> {
        if key == self.code_dimension && self.rate_at(index).is_some() {
            return Some(Cow::Borrowed(self.base_currency));
        }
        self.parent.dimension(index, key)
    }

    fn measure(&self, index: usize, key: &str) -> Option<f64> {
        let value = self.parent.measure(index, key)?;
        if key != self.measure {
            return Some(value);
        }
        Some(match self.rate_at(index) {
            Some(rate) => value * rate,
            None => value,
        })
    }

    fn dimension_keys(&self) -> &[String] {
        self.parent.dimension_keys()
    }

    fn measure_keys(&self) -> &[String] {
        self.parent.measure_keys()
    }
}
