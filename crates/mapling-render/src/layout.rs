//! Depth-indexed tree layout.
//!
//! Coordinate conventions: the x axis encodes depth (root at 0, branches
//! fanning left/right), the y axis encodes sibling order. Every pass starts
//! from the visible node set and replaces the previous layout wholesale;
//! there is no incremental state.

use crate::model::{Bounds, LayoutEdge, LayoutNode, LayoutPoint, MindMapLayout};
use crate::text::{TextMeasurer, TextStyle};
use mapling_core::Result;
use mapling_core::config::LayoutConfig;
use mapling_core::geom::Size;
use mapling_core::tree::MindMapNode;
use mapling_core::visible::{CollapsedSet, visible_edges, visible_nodes};
use rustc_hash::FxHashMap;

/// Lays out the currently visible subset of `tree` for a container of the
/// given size.
///
/// Fails only on a malformed tree (duplicate id); callers keep their previous
/// layout in that case.
pub fn layout(
    tree: &MindMapNode,
    collapsed: &CollapsedSet,
    container: Size,
    config: &LayoutConfig,
    measurer: &dyn TextMeasurer,
) -> Result<MindMapLayout> {
    tree.validate()?;

    let visible = visible_nodes(tree, collapsed);
    let index_of: FxHashMap<&str, usize> = visible
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id(), i))
        .collect();

    // Visible children per node, preserving sibling order (the visible list
    // is pre-order, so parents always precede their children).
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); visible.len()];
    for (i, n) in visible.iter().enumerate() {
        if let Some(parent) = n.parent {
            children[index_of[parent]].push(i);
        }
    }

    let max_depth = visible.iter().map(|n| n.depth).max().unwrap_or(0);

    // Sibling spacing is driven by the densest depth level, bounded so deep
    // bushy trees stay apart while shallow trees stay compact.
    let mut per_level = vec![0usize; max_depth + 1];
    for n in &visible {
        per_level[n.depth] += 1;
    }
    let max_in_level = per_level.iter().copied().max().unwrap_or(1);
    let available_h = container.height - config.vertical_reserve;
    let spacing = (available_h / (max_in_level as f64 + 1.0))
        .min(config.max_sibling_spacing)
        .max(config.min_sibling_spacing);

    // Sibling axis: visible leaves take consecutive slots, each parent
    // centers midway between its first and last child. A node whose subtree
    // is fully collapsed is a leaf here.
    fn place(
        i: usize,
        children: &[Vec<usize>],
        sib: &mut [f64],
        next_slot: &mut usize,
        spacing: f64,
    ) {
        if children[i].is_empty() {
            sib[i] = *next_slot as f64 * spacing;
            *next_slot += 1;
            return;
        }
        for &c in &children[i] {
            place(c, children, sib, next_slot, spacing);
        }
        let first = sib[children[i][0]];
        let last = sib[children[i][children[i].len() - 1]];
        sib[i] = (first + last) / 2.0;
    }
    let mut sib = vec![0.0f64; visible.len()];
    let mut next_slot = 0usize;
    place(0, &children, &mut sib, &mut next_slot, spacing);

    // Depth axis: one coordinate per level. Depth-1 branches fan out with an
    // extra spread, and the two deepest levels stretch so leaf clusters do
    // not crowd their parents.
    let base = container.width / config.depth_divisor;
    let mut level_x: Vec<f64> = (0..=max_depth).map(|d| d as f64 * base).collect();
    if max_depth >= 1 {
        level_x[1] *= config.first_level_spread;
        level_x[max_depth] *= config.deepest_spread;
        if max_depth >= 2 {
            level_x[max_depth - 1] *= config.second_deepest_spread;
        }
    }
    // The spread multipliers are tunable presentation values; force the
    // level table to stay strictly outward so no combination of them can
    // fold a level back onto its parent level.
    let min_step = base * 0.5;
    for d in 1..=max_depth {
        if level_x[d] < level_x[d - 1] + min_step {
            level_x[d] = level_x[d - 1] + min_step;
        }
    }

    // Root stays at the layout-space origin.
    let root_sib = sib[0];

    let mut nodes = Vec::with_capacity(visible.len());
    for (i, n) in visible.iter().enumerate() {
        // Even-index branches go right of the root, odd-index branches left,
        // the whole subtree with them.
        let sign = match n.section {
            Some(s) if s % 2 == 1 => -1.0,
            _ => 1.0,
        };
        let style = TextStyle {
            font_size: if n.depth == 0 {
                config.root_font_size
            } else {
                config.node_font_size
            },
            font_weight: if n.depth == 0 { 700 } else { 500 },
        };
        let metrics = measurer.measure(&n.node.label, &style);

        nodes.push(LayoutNode {
            id: n.node.id.clone(),
            label: n.node.label.clone(),
            x: sign * level_x[n.depth],
            y: sib[i] - root_sib,
            width: metrics.width + config.label_padding,
            height: metrics.height + config.label_padding,
            depth: n.depth,
            section: n.section,
            has_children: n.has_children,
            collapsed: n.collapsed,
        });
    }

    let mut edges = Vec::with_capacity(visible.len().saturating_sub(1));
    for (from, to) in visible_edges(&visible) {
        let parent = &nodes[index_of[from]];
        let child = &nodes[index_of[to]];
        edges.push(LayoutEdge {
            from: from.to_string(),
            to: to.to_string(),
            points: [
                LayoutPoint {
                    x: parent.x,
                    y: parent.y,
                },
                LayoutPoint {
                    x: child.x,
                    y: child.y,
                },
            ],
            depth: child.depth,
            section: child.section,
        });
    }

    let bounds = Bounds::from_points(nodes.iter().flat_map(|n| {
        [
            (n.x - n.width / 2.0, n.y - n.height / 2.0),
            (n.x + n.width / 2.0, n.y + n.height / 2.0),
        ]
    }))
    .unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    });

    let mut content_scale = config.max_content_scale;
    if bounds.width() > 0.0 {
        content_scale = content_scale.min((container.width - config.fit_margin) / bounds.width());
    }
    if bounds.height() > 0.0 {
        content_scale = content_scale.min((container.height - config.fit_margin) / bounds.height());
    }
    // Degenerate containers still get a usable scale.
    let content_scale = if content_scale.is_finite() {
        content_scale.max(0.05)
    } else {
        config.max_content_scale
    };

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        max_depth,
        spacing,
        "mindmap layout pass"
    );

    Ok(MindMapLayout {
        nodes,
        edges,
        bounds,
        content_scale,
    })
}
