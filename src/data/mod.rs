//! Data models behind the dashboard.
//!
//! ## Submodules
//!
//! - [`selection`]: One selector level's options and current choice
//! - [`series`]: Chart series built from fetched streams, and the bit-rate axis formatter
//! - [`zoom`]: Applied x-axis range with its undo stack
//!
//! ## Data Flow
//!
//! ```text
//! ListResponse ──▶ Identifier::parse ──▶ Selection::replace (metric / host / interface)
//!
//! GetResponse ──▶ series_from_streams() ──▶ Vec<ChartSeries> ──▶ ui::chart
//!                                                 ▲
//!                                   ZoomState ────┘ (x-axis bounds)
//! ```

pub mod selection;
pub mod series;
pub mod zoom;

pub use selection::Selection;
pub use series::{format_bps, series_from_streams, ChartSeries};
pub use zoom::{AxisRange, ZoomState};
