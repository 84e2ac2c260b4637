use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// A node of the flame-graph call tree.
///
/// Leaf-ness is carried by the *absence* of `children` (`None`), not by an
/// empty list: an internal node that loses every child during filtering is
/// turned back into a leaf explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    /// Per-node score fields supplied by the synthesizer
    /// (`usage_score`, `lifetime_score`, ...), passed through untouched.
    #[serde(flatten)]
    pub scores: Map<String, Value>,
}

#[derive(Debug, Error, PartialEq)]
pub enum TreeShapeError {
    #[error("{path}: node is not an object")]
    NotAnObject { path: String },
    #[error("{path}: node has no name")]
    MissingName { path: String },
    #[error("{path}: node value is missing or not a number")]
    InvalidValue { path: String },
    #[error("{path}: children field is present but not a list")]
    ChildrenNotList { path: String },
}

impl TreeNode {
    pub fn leaf(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            children: None,
            scores: Map::new(),
        }
    }

    /// An internal node whose value is the sum of `children`.
    pub fn branch(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        let value = children.iter().map(|c| c.value).sum();
        Self {
            name: name.into(),
            value,
            children: Some(children),
            scores: Map::new(),
        }
    }

    /// Attach a score field.
    pub fn with_score(mut self, key: impl Into<String>, score: f64) -> Self {
        self.scores.insert(key.into(), Value::from(score));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn score(&self, key: &str) -> Option<f64> {
        self.scores.get(key).and_then(Value::as_f64)
    }

    /// Sum of the direct children's values (0 for a leaf).
    pub fn children_sum(&self) -> f64 {
        self.children().iter().map(|c| c.value).sum()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }

    /// First node named `name`, depth-first pre-order.
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        if self.name == name {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(name))
    }

    /// Build a tree from untyped JSON, rejecting shapes the typed
    /// deserializer would silently coerce or reject without a path.
    ///
    /// Nodes may use either `name` or the short `n` key for their name.
    pub fn from_value(value: Value) -> Result<Self, TreeShapeError> {
        Self::from_value_at(value, "$")
    }

    fn from_value_at(value: Value, path: &str) -> Result<Self, TreeShapeError> {
        let Value::Object(mut obj) = value else {
            return Err(TreeShapeError::NotAnObject { path: path.into() });
        };

        let name = match obj.remove("name").or_else(|| obj.remove("n")) {
            Some(Value::String(name)) => name,
            _ => return Err(TreeShapeError::MissingName { path: path.into() }),
        };

        let value = obj
            .remove("value")
            .as_ref()
            .and_then(Value::as_f64)
            .ok_or_else(|| TreeShapeError::InvalidValue { path: path.into() })?;

        let children = match obj.remove("children") {
            None => None,
            Some(Value::Array(items)) => Some(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Self::from_value_at(item, &format!("{path}.children[{i}]")))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(TreeShapeError::ChildrenNotList { path: path.into() }),
        };

        Ok(Self {
            name,
            value,
            children,
            scores: obj,
        })
    }
}
