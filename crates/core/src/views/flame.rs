use heaplens_protocol::{FlameMode, Timestamp, TreeNode};
use serde::Serialize;
use tracing::debug;

use crate::error::ShapeError;
use crate::store::TraceStore;
use crate::tree::{FlameTree, KeywordSet, Retain, filter_tree, max_leaf_value, prune_bare_trunks};

/// What the user asked the flame graph to show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlameRequest {
    pub mode: FlameMode,
    /// Required by timed modes.
    pub time: Option<Timestamp>,
    pub keywords: KeywordSet,
    pub show_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlameView {
    pub root: TreeNode,
    /// Largest leaf value, for colour-scale normalization.
    pub max_leaf: f64,
    /// Whether anything survived keyword filtering.
    pub matched: bool,
}

/// Synthesize, trim and filter the flame tree for one request.
pub fn flame_view<S: TraceStore + ?Sized>(
    store: &S,
    request: &FlameRequest,
) -> Result<FlameView, ShapeError> {
    let tree = store.synthesize_flame_tree(request.mode, request.time)?;

    let mut flame = FlameTree::new(tree);
    flame.set_hidden_visible(request.show_hidden);

    let root = flame.root_mut();
    let trunks = prune_bare_trunks(root);
    let retain = filter_tree(root, &request.keywords)?;
    let max_leaf = max_leaf_value(root);

    debug!(
        mode = ?request.mode,
        keywords = request.keywords.len(),
        trunks,
        nodes = root.node_count(),
        "flame view ready"
    );
    Ok(FlameView {
        root: flame.into_root(),
        max_leaf,
        matched: retain == Retain::Keep,
    })
}
