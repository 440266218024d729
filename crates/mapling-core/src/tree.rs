use crate::{Error, Result};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// A node in the source mind-map tree.
///
/// Ownership of `children` is exclusive, so the structure is a finite rooted
/// tree by construction: cycles and shared subtrees are unrepresentable. The
/// only malformed input a caller can hand us is a duplicate `id`, which
/// [`MindMapNode::validate`] rejects before any layout pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MindMapNode>,
}

impl MindMapNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    pub fn with_children(
        id: impl Into<String>,
        label: impl Into<String>,
        children: Vec<MindMapNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children,
        }
    }

    /// Checks id uniqueness across the whole tree, failing fast on the first
    /// duplicate (visited-set walk, no recursion).
    pub fn validate(&self) -> Result<()> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut stack: Vec<&MindMapNode> = vec![self];
        while let Some(node) = stack.pop() {
            if !seen.insert(node.id.as_str()) {
                return Err(Error::DuplicateNodeId {
                    id: node.id.clone(),
                });
            }
            stack.extend(node.children.iter());
        }
        Ok(())
    }

    /// Total number of nodes in the subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(MindMapNode::node_count)
            .sum::<usize>()
    }

    pub fn get(&self, id: &str) -> Option<&MindMapNode> {
        let mut stack: Vec<&MindMapNode> = vec![self];
        while let Some(node) = stack.pop() {
            if node.id == id {
                return Some(node);
            }
            stack.extend(node.children.iter());
        }
        None
    }

    /// Whether the node with `id` owns children in the full tree. Drives the
    /// expand/collapse affordance independently of the collapse state.
    pub fn has_children(&self, id: &str) -> bool {
        self.get(id).is_some_and(|n| !n.children.is_empty())
    }
}
