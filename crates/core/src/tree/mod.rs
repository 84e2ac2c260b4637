pub mod filter;
pub mod flame;

pub use filter::{KeywordSet, Retain, filter_tree, leaf_aggregate, max_leaf_value, validate_sums};
pub use flame::{FlameTree, HIDDEN_BRANCH, prune_bare_trunks};

use heaplens_protocol::TreeShapeError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TreeError {
    #[error("malformed tree at {path}: {reason}")]
    MalformedTree { path: String, reason: String },
}

impl From<TreeShapeError> for TreeError {
    fn from(err: TreeShapeError) -> Self {
        let (path, reason) = match err {
            TreeShapeError::NotAnObject { path } => (path, "node is not an object"),
            TreeShapeError::MissingName { path } => (path, "node has no name"),
            TreeShapeError::InvalidValue { path } => (path, "value is missing or not a number"),
            TreeShapeError::ChildrenNotList { path } => {
                (path, "children field is present but not a list")
            }
        };
        Self::MalformedTree {
            path,
            reason: reason.to_string(),
        }
    }
}
