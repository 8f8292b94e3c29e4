//! # Tally
//!
//! An embeddable analytics engine for small record sets: zero-copy views,
//! grouping and aggregation, chart/table/text results, and heuristic schema
//! discovery.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         Query (structured, from an upstream translator)  │
//! │  (intent, aggregation, measure, group-by, filters, ...)  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [engine::execute]
//! ┌─────────────────────────────────────────────────────────┐
//! │   filter → currency plan → group/aggregate → build       │
//! │   growth and ratio analysis                              │
//! └─────────────────────────────────────────────────────────┘
//!                          │ reads through
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │    RecordView: SliceView, DomainView, SubView,           │
//! │                ConcatView, CurrencyView                  │
//! └─────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────┐
//! │   RawTable ──[schema::discover]──▶ SchemaDescription     │
//! │            ──[schema::refine]───▶ enriched copy          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine performs no I/O and never fails: empty data and unmatched
//! filters produce text results that say so. Diagnostics are emitted as
//! `tracing` events; the crate installs no subscriber.

pub mod config;
pub mod engine;
pub mod schema;
pub mod view;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::engine::{
        execute, Aggregation, ExecuteOptions, Filters, Intent, Payload, Query, QueryResult,
        SortMode, Visualization,
    };
    pub use crate::schema::{discover, refine, DiscoverOptions, RawTable, SchemaDescription};
    pub use crate::view::{
        ConcatView, CurrencyView, DomainAdapter, Record, RecordView, SliceView, SubView,
    };
}

pub use engine::{execute, ExecuteOptions, Query, QueryResult};
pub use schema::{discover, DiscoverOptions, RawTable, SchemaDescription};
pub use view::{Record, RecordView, SliceView};
