pub mod trace;
pub mod tree;
pub mod types;

pub use trace::{FlameMode, SortKey, TraceId, TraceListKey, TraceSummary, stack_frames};
pub use tree::{TreeNode, TreeShapeError};
pub use types::{Bin, Interval, StepPoint, TimeBounds, Timestamp};
