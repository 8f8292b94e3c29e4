//! Currency normalization planning.
//!
//! Before grouping, the executor inspects the distinct currency codes in the
//! filtered view. A single code is displayed as-is. Mixed codes are converted
//! to the base currency through a [`CurrencyView`](crate::view::CurrencyView)
//! when a rate table is configured.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::view::{unique_values, RecordView};

/// Base currency, the dimension holding codes, and `code → base` rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub base_currency: String,
    pub dimension: String,
    pub rates: HashMap<String, f64>,
}

impl CurrencyConfig {
    pub fn new(
        base_currency: impl Into<String>,
        dimension: impl Into<String>,
        rates: HashMap<String, f64>,
    ) -> Self {
        Self {
            base_currency: base_currency.into(),
            dimension: dimension.into(),
            rates,
        }
    }

    /// Whether values can be converted at all.
    pub fn can_convert(&self) -> bool {
        !self.base_currency.is_empty() && !self.dimension.is_empty() && !self.rates.is_empty()
    }

    fn has_rate(&self, code: &str) -> bool {
        code == self.base_currency || self.rates.get(code).is_some_and(|rate| *rate > 0.0)
    }
}

/// How a view should be displayed and whether it must be converted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrencyPlan {
    pub display_unit: String,
    pub convert: bool,
    /// Codes present in mixed-currency data that cannot be converted.
    pub missing_rates: Vec<String>,
}

impl CurrencyPlan {
    /// Warning text for codes that stay unconverted.
    pub fn warning(&self) -> Option<String> {
        if self.missing_rates.is_empty() {
            return None;
        }
        Some(format!(
            "No conversion rate for {}; those values are left unconverted",
            self.missing_rates.join(", ")
        ))
    }
}

/// Decide the display unit and conversion for `view`.
pub fn plan_currency<V>(view: &V, config: Option<&CurrencyConfig>) -> CurrencyPlan
where
    V: RecordView + ?Sized,
{
    let Some(config) = config.filter(|c| !c.dimension.is_empty()) else {
        return CurrencyPlan::default();
    };

    let codes = unique_values(view, &config.dimension);
    match codes.as_slice() {
        [] => CurrencyPlan {
            display_unit: config.base_currency.clone(),
            ..CurrencyPlan::default()
        },
        [only] => CurrencyPlan {
            display_unit: only.clone(),
            ..CurrencyPlan::default()
        },
        [first, ..] => {
            let missing_rates: Vec<String> = codes
                .iter()
                .filter(|code| !config.has_rate(code))
                .cloned()
                .collect();
            let convert = config.can_convert();
            let display_unit = if config.base_currency.is_empty() {
                first.clone()
            } else {
                config.base_currency.clone()
            };

            if convert {
                tracing::debug!(
                    base = %config.base_currency,
                    codes = codes.len(),
                    "normalizing mixed currencies"
                );
            }
            if !missing_rates.is_empty() {
                tracing::warn!(codes = ?missing_rates, "currency codes without conversion rate");
            }

            CurrencyPlan {
                display_unit,
                convert,
                missing_rates,
            }
        }
    }
}
