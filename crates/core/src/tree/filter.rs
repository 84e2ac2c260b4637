use std::collections::BTreeSet;

use heaplens_protocol::TreeNode;
use serde::{Deserialize, Serialize};

use super::TreeError;

/// Keywords entered by the user to narrow the flame graph.
///
/// Empty keywords are dropped on insertion: an empty string would match
/// every name and silently disable the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split free-form input on whitespace and commas.
    pub fn parse(input: &str) -> Self {
        input
            .split(|c: char| c.is_whitespace() || c == ',')
            .collect()
    }

    /// Returns `true` if the keyword was not already present.
    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword.is_empty() {
            return false;
        }
        self.0.insert(keyword)
    }

    pub fn remove(&mut self, keyword: &str) -> bool {
        self.0.remove(keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Case-sensitive substring match against any keyword.
    pub fn matches(&self, name: &str) -> bool {
        self.0.iter().any(|keyword| name.contains(keyword.as_str()))
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

/// What a parent should do with a child after filtering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retain {
    Keep,
    Remove,
}

/// Prune `root` in place down to the subtrees that mention a keyword.
///
/// A node whose name matches keeps its entire subtree. Any other node keeps
/// only the children that survive filtering. A removed child's value is
/// subtracted from its parent, as is whatever a surviving child shed while
/// being filtered itself, so every ancestor drops by exactly the weight
/// pruned beneath it. A non-matching leaf, or an internal node left with no
/// children, reports [`Retain::Remove`]; the latter is turned back into a
/// leaf first.
///
/// An empty keyword set keeps everything and leaves the tree untouched.
///
/// The tree is checked with [`validate_sums`] before any mutation, so a
/// malformed input is reported without being half-filtered.
pub fn filter_tree(root: &mut TreeNode, keywords: &KeywordSet) -> Result<Retain, TreeError> {
    if keywords.is_empty() {
        return Ok(Retain::Keep);
    }
    validate_sums(root)?;
    Ok(prune(root, keywords))
}

fn prune(node: &mut TreeNode, keywords: &KeywordSet) -> Retain {
    if keywords.matches(&node.name) {
        return Retain::Keep;
    }

    let Some(children) = node.children.as_mut() else {
        return Retain::Remove;
    };

    // Back to front so removal by index never skips a sibling.
    for i in (0..children.len()).rev() {
        let original = children[i].value;
        if prune(&mut children[i], keywords) == Retain::Remove {
            children.remove(i);
            node.value -= original;
        } else {
            node.value -= original - children[i].value;
        }
    }

    if children.is_empty() {
        node.children = None;
        return Retain::Remove;
    }
    Retain::Keep
}

/// Check that no node's children add up to more than the node itself and
/// that every value is finite.
pub fn validate_sums(root: &TreeNode) -> Result<(), TreeError> {
    let mut path = Vec::new();
    check_node(root, &mut path)
}

fn check_node<'a>(node: &'a TreeNode, path: &mut Vec<&'a str>) -> Result<(), TreeError> {
    path.push(&node.name);

    if !node.value.is_finite() {
        return Err(TreeError::MalformedTree {
            path: path.join("/"),
            reason: format!("value {} is not finite", node.value),
        });
    }

    if let Some(children) = &node.children {
        let sum = node.children_sum();
        let tolerance = 1e-9 * node.value.abs().max(1.0);
        if sum > node.value + tolerance {
            return Err(TreeError::MalformedTree {
                path: path.join("/"),
                reason: format!("children sum {sum} exceeds node value {}", node.value),
            });
        }
        for child in children {
            check_node(child, path)?;
        }
    }

    path.pop();
    Ok(())
}

/// Fold `combine` over the leaves of `root`, left to right.
///
/// Only nodes without a `children` field are visited. The tree is not
/// modified.
pub fn leaf_aggregate<T, F>(root: &TreeNode, init: T, mut combine: F) -> T
where
    F: FnMut(T, &TreeNode) -> T,
{
    fn walk<T, F>(node: &TreeNode, acc: T, combine: &mut F) -> T
    where
        F: FnMut(T, &TreeNode) -> T,
    {
        match &node.children {
            None => combine(acc, node),
            Some(children) => children
                .iter()
                .fold(acc, |acc, child| walk(child, acc, combine)),
        }
    }

    walk(root, init, &mut combine)
}

/// Largest leaf value, used to normalize colour scales. 0 for a tree whose
/// leaves are all non-positive.
pub fn max_leaf_value(root: &TreeNode) -> f64 {
    leaf_aggregate(root, 0.0, |max, leaf| f64::max(max, leaf.value))
}
