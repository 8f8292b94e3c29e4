//! The query execution engine.
//!
//! ```text
//! Query ──normalize──▶ filter ──▶ currency plan ──▶ group/aggregate ──▶ build ──▶ reply
//!                         │            │                                  │
//!                     SubView     CurrencyView                 chart / table / text
//! ```
//!
//! Ratio queries take a separate path: the data is filtered twice and the
//! two totals are compared.

pub mod aggregate;
pub mod analysis;
pub mod builder;
pub mod currency;
pub mod error;
pub mod executor;
pub mod filter;
pub mod format;
pub mod query;
pub mod result;
pub mod template;

pub use aggregate::{group_and_aggregate, Group};
pub use currency::CurrencyConfig;
pub use error::{EngineError, EngineResult};
pub use executor::{execute, ExecuteOptions};
pub use filter::{apply_filters, Filters};
pub use query::{Aggregation, Intent, Query, SortMode, Visualization};
pub use result::{
    Align, ChartConfig, ChartKind, ChartPoint, ChartSeries, Column, ColumnType, GrowthData,
    GrowthDirection, Payload, QueryResult, RatioData, Summary, TableData, TextData,
};
