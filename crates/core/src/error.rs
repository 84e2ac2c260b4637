use thiserror::Error;

use crate::config::ConfigError;
use crate::series::{AggregateError, DownsampleError};
use crate::store::StoreError;
use crate::tree::TreeError;

/// Any failure from a view pipeline.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("aggregate: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("downsample: {0}")]
    Downsample(#[from] DownsampleError),
    #[error("tree: {0}")]
    Tree(#[from] TreeError),
    #[error("store: {0}")]
    Store(#[from] StoreError),
    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
