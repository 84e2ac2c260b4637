use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Index of an allocation site in the trace store.
///
/// Indices are only stable for one filter/sort configuration of the store;
/// a re-sort or re-filter invalidates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(pub u32);

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trace#{}", self.0)
    }
}

/// One row of the trace (allocation site) list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    pub trace: TraceId,
    /// Call stack of the allocation site, frames separated by `|`.
    pub stack: String,
    /// Allocated type name, when the profiler recorded one.
    #[serde(rename = "type", default)]
    pub type_name: String,
    pub num_chunks: usize,
    /// Peak live bytes attributed to this site.
    pub max_aggregate: i64,
    /// Total time spent inside the allocator for this site.
    pub alloc_time_total: Timestamp,
    pub usage_score: f64,
    pub lifetime_score: f64,
    pub useful_lifetime_score: f64,
}

/// Frames of a `|`-separated call stack, outermost first.
pub fn stack_frames(stack: &str) -> impl Iterator<Item = &str> {
    stack.split('|').filter(|frame| !frame.is_empty())
}

/// Ordering applied to the trace list by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Peak live bytes, largest first.
    #[default]
    Bytes,
    /// Number of chunks, largest first.
    NumChunks,
    /// Usage score, worst (lowest) first.
    Usage,
    /// Lifetime score, worst first.
    Lifetime,
    /// Useful-lifetime score, worst first.
    UsefulLifetime,
    /// Total allocator time, largest first.
    AllocTime,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytes" => Ok(Self::Bytes),
            "num_chunks" | "chunks" => Ok(Self::NumChunks),
            "usage" => Ok(Self::Usage),
            "lifetime" => Ok(Self::Lifetime),
            "useful_lifetime" => Ok(Self::UsefulLifetime),
            "alloc_time" => Ok(Self::AllocTime),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Identity of one materialized trace list: the sort it was produced under
/// and the store's filter generation at that time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceListKey {
    pub sort: SortKey,
    pub generation: u64,
}

/// Weighting used when synthesizing the flame tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlameMode {
    /// Live bytes at one point in time.
    BytesTime,
    /// Total bytes ever allocated.
    #[default]
    BytesTotal,
    /// Peak bytes allocated but never used.
    PeakWaste,
    /// Number of allocations.
    NumAllocs,
}

impl FlameMode {
    /// Whether this mode needs a point in time to be synthesized.
    pub fn is_timed(self) -> bool {
        matches!(self, Self::BytesTime)
    }
}

impl std::str::FromStr for FlameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bytes_time" => Ok(Self::BytesTime),
            "bytes_total" => Ok(Self::BytesTotal),
            "peak_waste" => Ok(Self::PeakWaste),
            "num_allocs" => Ok(Self::NumAllocs),
            other => Err(format!("unknown flame mode: {other}")),
        }
    }
}
