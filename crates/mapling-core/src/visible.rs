use crate::tree::MindMapNode;
use rustc_hash::FxHashSet;

/// Collapse state for one mind-map view.
///
/// Mutated only through [`CollapsedSet::toggle`], and only by the owning
/// session. Collapse state is per-view and never persisted by this crate.
#[derive(Debug, Clone, Default)]
pub struct CollapsedSet(FxHashSet<String>);

impl CollapsedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `id`; returns `true` when the node is collapsed
    /// afterwards.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Borrowed view of one visible node, created fresh per pass and discarded
/// wholesale on the next one.
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    pub node: &'a MindMapNode,
    /// Root is depth 0.
    pub depth: usize,
    pub parent: Option<&'a str>,
    /// Index among the parent's children.
    pub index: usize,
    /// Index of the depth-1 ancestor branch; `None` for the root.
    pub section: Option<usize>,
    /// Whether the node owns children in the full tree, so a collapsed node
    /// keeps its expand affordance.
    pub has_children: bool,
    /// Whether the node itself is collapsed (its subtree is hidden).
    pub collapsed: bool,
}

impl<'a> VisibleNode<'a> {
    pub fn id(&self) -> &'a str {
        self.node.id.as_str()
    }
}

/// Depth-first pre-order listing of the nodes eligible for rendering.
///
/// A node is visible iff no strict ancestor is in `collapsed`; descendants of
/// a collapsed node are pruned regardless of their own collapse state.
pub fn visible_nodes<'a>(root: &'a MindMapNode, collapsed: &CollapsedSet) -> Vec<VisibleNode<'a>> {
    fn visit<'a>(
        node: &'a MindMapNode,
        depth: usize,
        parent: Option<&'a str>,
        index: usize,
        section: Option<usize>,
        collapsed: &CollapsedSet,
        out: &mut Vec<VisibleNode<'a>>,
    ) {
        let is_collapsed = collapsed.contains(&node.id);
        out.push(VisibleNode {
            node,
            depth,
            parent,
            index,
            section,
            has_children: !node.children.is_empty(),
            collapsed: is_collapsed,
        });
        if is_collapsed {
            return;
        }
        for (i, child) in node.children.iter().enumerate() {
            // The root's children start the branches; everything deeper
            // inherits its branch section.
            let child_section = if depth == 0 { Some(i) } else { section };
            visit(
                child,
                depth + 1,
                Some(node.id.as_str()),
                i,
                child_section,
                collapsed,
                out,
            );
        }
    }

    let mut out = Vec::new();
    visit(root, 0, None, 0, None, collapsed, &mut out);
    out
}

/// Parent→child pairs with both endpoints visible, in child pre-order.
pub fn visible_edges<'a>(nodes: &[VisibleNode<'a>]) -> Vec<(&'a str, &'a str)> {
    nodes
        .iter()
        .filter_map(|n| n.parent.map(|p| (p, n.node.id.as_str())))
        .collect()
}
