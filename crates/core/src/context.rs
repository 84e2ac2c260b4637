use heaplens_protocol::{TimeBounds, Timestamp};
use serde::Serialize;

use crate::config::ShapingConfig;
use crate::store::TraceStore;

/// Store state and tunables one view computation runs against.
///
/// Captured once per call so a pipeline never mixes a horizon from before a
/// filter change with bounds from after it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewContext {
    pub bounds: TimeBounds,
    pub horizon: Timestamp,
    pub max_bins: usize,
    pub downsample_factor: usize,
    /// Chunks fetched per store call while collecting a series.
    pub page_size: usize,
}

impl ViewContext {
    pub fn capture<S: TraceStore + ?Sized>(store: &S, config: &ShapingConfig) -> Self {
        Self {
            bounds: store.time_filter_bounds(),
            horizon: store.horizon(),
            max_bins: config.max_bins,
            downsample_factor: config.downsample_factor,
            page_size: config.chunk_window.page_size,
        }
    }

    pub fn with_max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }
}
