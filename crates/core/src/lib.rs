//! Data shaping for heap-allocation trace views.
//!
//! - [`series`] turns allocation intervals into a live-bytes step series and
//!   compresses it into display bins.
//! - [`window`] keeps a scrollable slice of a large paged dataset materialized.
//! - [`tree`] prunes flame-graph call trees by keyword.
//! - [`views`] chains them against a [`store::TraceStore`].

pub mod config;
pub mod context;
pub mod error;
pub mod series;
pub mod store;
pub mod tree;
pub mod views;
pub mod window;

pub use config::{ConfigError, ShapingConfig, WindowConfig};
pub use context::ViewContext;
pub use error::ShapeError;
pub use store::{ChunkPages, JsonDataset, StoreError, TracePages, TraceStore};
pub use window::{
    ChunkWindow, Direction, Edge, PageRequest, PageSource, RowBuffer, ScrollOutcome, Sink,
    TraceWindow, VirtualWindow, WindowState, scroll_percent,
};
