use heaplens_protocol::TreeNode;

/// Name of the top-level branch that collects traces the user chose to hide.
pub const HIDDEN_BRANCH: &str = "Hide";

/// A synthesized flame tree with its hidden-trace branch detached.
///
/// The hidden branch is held aside until the user asks to see it, so the
/// root's value only counts it while it is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameTree {
    root: TreeNode,
    hidden: Option<TreeNode>,
}

impl FlameTree {
    /// Detach the top-level [`HIDDEN_BRANCH`] child from `root`, if any.
    pub fn new(mut root: TreeNode) -> Self {
        let mut hidden = None;
        if let Some(children) = root.children.as_mut()
            && let Some(pos) = children.iter().position(|c| c.name == HIDDEN_BRANCH)
        {
            let branch = children.remove(pos);
            root.value -= branch.value;
            hidden = Some(branch);
        }
        Self {
            root,
            hidden: Some(hidden.unwrap_or_else(|| TreeNode::leaf(HIDDEN_BRANCH, 0.0))),
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut TreeNode {
        &mut self.root
    }

    pub fn into_root(self) -> TreeNode {
        self.root
    }

    pub fn is_hidden_visible(&self) -> bool {
        self.hidden.is_none()
    }

    /// Attach or detach the hidden branch, keeping the root's value in step.
    ///
    /// An empty placeholder branch is never attached.
    pub fn set_hidden_visible(&mut self, visible: bool) {
        if visible {
            let Some(branch) = self.hidden.take() else {
                return;
            };
            if branch.value <= 0.0 && branch.is_leaf() {
                self.hidden = Some(branch);
                return;
            }
            self.root.value += branch.value;
            self.root.children.get_or_insert_with(Vec::new).push(branch);
        } else if self.hidden.is_none() {
            let Some(children) = self.root.children.as_mut() else {
                return;
            };
            let Some(pos) = children.iter().position(|c| c.name == HIDDEN_BRANCH) else {
                return;
            };
            let branch = children.remove(pos);
            if children.is_empty() {
                self.root.children = None;
            }
            self.root.value -= branch.value;
            self.hidden = Some(branch);
        }
    }
}

/// Drop the root's direct children that are leaves, subtracting their
/// values. Returns how many were removed.
///
/// Leaves hanging straight off the root are frames with no caller context
/// and only add noise to the top row of a flame graph.
pub fn prune_bare_trunks(root: &mut TreeNode) -> usize {
    let Some(children) = root.children.as_mut() else {
        return 0;
    };
    let before = children.len();
    let mut shed = 0.0;
    children.retain(|child| {
        if child.is_leaf() {
            shed += child.value;
            false
        } else {
            true
        }
    });
    let removed = before - children.len();
    if children.is_empty() && removed > 0 {
        root.children = None;
    }
    root.value -= shed;
    removed
}
