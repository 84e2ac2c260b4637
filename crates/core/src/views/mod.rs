//! Pipelines that chain the shaping components into the data behind one view.

pub mod flame;
pub mod live_bytes;

pub use flame::{FlameRequest, FlameView, flame_view};
pub use live_bytes::{LiveBytes, global_live_bytes, trace_live_bytes};
