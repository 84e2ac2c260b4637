//! Query interface to the trace store, and the in-memory JSON implementation.

mod dataset;

pub use dataset::JsonDataset;

use std::path::PathBuf;

use heaplens_protocol::{
    FlameMode, Interval, TimeBounds, Timestamp, TraceId, TraceListKey, TraceSummary, TreeNode,
    TreeShapeError,
};
use thiserror::Error;

use crate::series::AggregateError;
use crate::window::PageSource;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no such trace: {0}")]
    UnknownTrace(TraceId),
    #[error("flame mode {0:?} needs a point in time")]
    MissingTime(FlameMode),
    #[error("trace list {requested:?} was replaced by {current:?}")]
    StaleList {
        requested: TraceListKey,
        current: TraceListKey,
    },
    #[error("{trace} has invalid chunks: {source}")]
    InvalidChunks {
        trace: TraceId,
        #[source]
        source: AggregateError,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid dataset JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid flame tree: {0}")]
    Shape(#[from] TreeShapeError),
}

/// Read side of the external trace store.
///
/// Chunk pages are ordered by start time. Trace pages follow the store's
/// current sort, identified by [`list_key`](TraceStore::list_key).
pub trait TraceStore {
    /// Traces visible under the current time filter.
    fn trace_count(&self) -> usize;

    fn chunk_count(&self, trace: TraceId) -> Result<usize, StoreError>;

    fn intervals_for_trace(
        &self,
        trace: TraceId,
        low: usize,
        count: usize,
    ) -> Result<Vec<Interval>, StoreError>;

    fn trace_list(&self, low: usize, count: usize) -> Vec<TraceSummary>;

    /// Changes whenever the trace list is re-sorted or re-filtered.
    fn list_key(&self) -> TraceListKey;

    fn time_filter_bounds(&self) -> TimeBounds;

    /// Upper bound for series construction under the active filter.
    fn horizon(&self) -> Timestamp;

    fn synthesize_flame_tree(
        &self,
        mode: FlameMode,
        time: Option<Timestamp>,
    ) -> Result<TreeNode, StoreError>;
}

/// Pages of one trace's chunks.
#[derive(Debug, Clone, Copy)]
pub struct ChunkPages<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TraceStore + ?Sized> ChunkPages<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: TraceStore + ?Sized> PageSource for ChunkPages<'_, S> {
    type Selection = TraceId;
    type Record = Interval;
    type Error = StoreError;

    fn total_len(&self, trace: &TraceId) -> Result<usize, StoreError> {
        self.store.chunk_count(*trace)
    }

    fn fetch_page(
        &self,
        trace: &TraceId,
        low: usize,
        count: usize,
    ) -> Result<Vec<Interval>, StoreError> {
        self.store.intervals_for_trace(*trace, low, count)
    }
}

/// Pages of the sorted trace list. Requests for a list the store has since
/// re-sorted or re-filtered fail with [`StoreError::StaleList`].
#[derive(Debug, Clone, Copy)]
pub struct TracePages<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TraceStore + ?Sized> TracePages<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn check(&self, requested: &TraceListKey) -> Result<(), StoreError> {
        let current = self.store.list_key();
        if *requested != current {
            return Err(StoreError::StaleList {
                requested: *requested,
                current,
            });
        }
        Ok(())
    }
}

impl<S: TraceStore + ?Sized> PageSource for TracePages<'_, S> {
    type Selection = TraceListKey;
    type Record = TraceSummary;
    type Error = StoreError;

    fn total_len(&self, key: &TraceListKey) -> Result<usize, StoreError> {
        self.check(key)?;
        Ok(self.store.trace_count())
    }

    fn fetch_page(
        &self,
        key: &TraceListKey,
        low: usize,
        count: usize,
    ) -> Result<Vec<TraceSummary>, StoreError> {
        self.check(key)?;
        Ok(self.store.trace_list(low, count))
    }
}
