//! Result builders: turn groups into chart, table or text payloads.

mod chart;
mod table;
mod text;

pub use chart::{build_chart, PALETTE};
pub use table::build_table;
pub use text::build_text;
