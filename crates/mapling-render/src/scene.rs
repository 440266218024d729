//! SVG scene renderer.
//!
//! Draws the current layout under the viewport transform. Style options are
//! pure repaints: flipping them re-renders from the same layout without a
//! layout pass. Appear transitions are SMIL fades on the elements whose ids
//! the caller passes in `appear`; rasterizers ignore them.

use crate::model::{LayoutEdge, LayoutNode, MindMapLayout};
use crate::viewport::ViewTransform;
use mapling_core::theme::{self, NodeChrome};
use rustc_hash::FxHashSet;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SceneOptions {
    pub width: f64,
    pub height: f64,
    /// Optional root `id` attribute for embedding several scenes in one
    /// document.
    pub diagram_id: Option<String>,
    /// Solid background; `None` leaves the canvas transparent.
    pub background: Option<String>,
    /// Tint node backgrounds by depth chrome instead of plain white.
    pub highlight_nodes: bool,
    /// Color connectors by branch instead of the neutral stroke.
    pub colored_edges: bool,
    pub transform: ViewTransform,
    pub content_scale: f64,
    pub root_font_size: f64,
    pub node_font_size: f64,
    /// Ids that became visible this pass; rendered with a fade-in.
    pub appear: FxHashSet<String>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            diagram_id: None,
            background: None,
            highlight_nodes: true,
            colored_edges: true,
            transform: ViewTransform::IDENTITY,
            content_scale: 1.0,
            root_font_size: 100.0,
            node_font_size: 80.0,
            appear: FxHashSet::default(),
        }
    }
}

const LINE_HEIGHT_FACTOR: f64 = 1.2;
const EDGE_STROKE_WIDTH: f64 = 4.0;
const NODE_CORNER_RADIUS: f64 = 10.0;
const TOGGLE_RADIUS: f64 = 18.0;
const TOGGLE_GAP: f64 = 10.0;
const APPEAR_FADE: &str = r#"<animate attributeName="opacity" values="0;1" dur="0.8s"/>"#;

pub fn render_scene(layout: &MindMapLayout, options: &SceneOptions) -> String {
    let mut out = String::with_capacity(1024 + layout.nodes.len() * 256);

    out.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg""#);
    if let Some(id) = &options.diagram_id {
        let _ = write!(out, r#" id="{}""#, escape_xml(id));
    }
    let _ = write!(
        out,
        r#" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        fmt_num(options.width),
        fmt_num(options.height),
        fmt_num(options.width),
        fmt_num(options.height),
    );

    if let Some(background) = &options.background {
        let _ = write!(
            out,
            r#"<rect class="background" width="{}" height="{}" fill="{}"/>"#,
            fmt_num(options.width),
            fmt_num(options.height),
            escape_xml(background),
        );
    }

    let t = options.transform;
    let _ = write!(
        out,
        r#"<g class="mindmap" transform="translate({} {}) scale({})">"#,
        fmt_num(t.tx),
        fmt_num(t.ty),
        fmt_num(t.k * options.content_scale),
    );

    out.push_str(r#"<g class="edges">"#);
    for edge in &layout.edges {
        write_edge(&mut out, edge, options);
    }
    out.push_str("</g>");

    out.push_str(r#"<g class="nodes">"#);
    for node in &layout.nodes {
        write_node(&mut out, node, options);
    }
    out.push_str("</g>");

    out.push_str("</g></svg>");
    out
}

fn write_edge(out: &mut String, edge: &LayoutEdge, options: &SceneOptions) {
    let [from, to] = edge.points;
    let mid_x = (from.x + to.x) / 2.0;

    let stroke = if options.colored_edges {
        theme::branch_color(edge.section)
    } else {
        theme::NEUTRAL
    };

    let _ = write!(out, r#"<path class="edge edge-depth-{}"#, edge.depth);
    if let Some(section) = edge.section {
        let _ = write!(out, " section-edge-{section}");
    }
    let _ = write!(
        out,
        r#"" d="M{},{}C{},{},{},{},{},{}" fill="none" stroke="{}" stroke-width="{}""#,
        fmt_num(from.x),
        fmt_num(from.y),
        fmt_num(mid_x),
        fmt_num(from.y),
        fmt_num(mid_x),
        fmt_num(to.y),
        fmt_num(to.x),
        fmt_num(to.y),
        stroke,
        fmt_num(EDGE_STROKE_WIDTH),
    );
    if options.appear.contains(&edge.to) {
        let _ = write!(out, ">{APPEAR_FADE}</path>");
    } else {
        out.push_str("/>");
    }
}

fn write_node(out: &mut String, node: &LayoutNode, options: &SceneOptions) {
    let chrome = theme::chrome_for_depth(node.depth);

    let _ = write!(out, r#"<g class="mindmap-node"#);
    match node.section {
        Some(section) => {
            let _ = write!(out, " section-{section}");
        }
        None => out.push_str(" section-root"),
    }
    let _ = write!(
        out,
        r#"" transform="translate({} {})">"#,
        fmt_num(node.x),
        fmt_num(node.y),
    );

    let fill = if options.highlight_nodes {
        chrome.background
    } else {
        "white"
    };
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" ry="{}" fill="{}"/>"#,
        fmt_num(-node.width / 2.0),
        fmt_num(-node.height / 2.0),
        fmt_num(node.width),
        fmt_num(node.height),
        fmt_num(NODE_CORNER_RADIUS),
        fmt_num(NODE_CORNER_RADIUS),
        fill,
    );

    let font_size = if node.depth == 0 {
        options.root_font_size
    } else {
        options.node_font_size
    };
    let font_weight = if node.depth == 0 { 700 } else { 500 };
    write_label(out, &node.label, font_size, font_weight, chrome.text);

    if node.has_children {
        write_toggle(out, node, chrome);
    }

    if options.appear.contains(&node.id) {
        out.push_str(APPEAR_FADE);
    }
    out.push_str("</g>");
}

fn write_label(out: &mut String, label: &str, font_size: f64, font_weight: u32, fill: &str) {
    let _ = write!(
        out,
        r#"<text text-anchor="middle" font-family="Helvetica,Arial,sans-serif" font-size="{}" font-weight="{font_weight}" fill="{fill}""#,
        fmt_num(font_size),
    );

    let lines: Vec<&str> = label.split('\n').collect();
    if lines.len() == 1 {
        let _ = write!(out, r#" dy="0.35em">{}</text>"#, escape_xml(label));
        return;
    }

    out.push('>');
    let line_height = font_size * LINE_HEIGHT_FACTOR;
    let top = -(lines.len() as f64 - 1.0) / 2.0 * line_height;
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="0" y="{}" dy="0.35em">{}</tspan>"#,
            fmt_num(top + i as f64 * line_height),
            escape_xml(line),
        );
    }
    out.push_str("</text>");
}

fn write_toggle(out: &mut String, node: &LayoutNode, chrome: NodeChrome) {
    let glyph = if node.collapsed { "+" } else { "\u{2212}" };
    let _ = write!(
        out,
        r#"<g class="toggle" transform="translate({} 0)">"#,
        fmt_num(node.width / 2.0 + TOGGLE_GAP),
    );
    let _ = write!(
        out,
        r#"<circle r="{}" fill="{}" stroke="{}" stroke-width="2" opacity="0.9"/>"#,
        fmt_num(TOGGLE_RADIUS),
        chrome.background,
        chrome.accent,
    );
    let _ = write!(
        out,
        r#"<text text-anchor="middle" dy="0.35em" font-size="24" fill="{}">{glyph}</text>"#,
        chrome.accent,
    );
    out.push_str("</g>");
}

/// Fixed 3-decimal output with trailing zeros trimmed (ties round half-up,
/// negatives included), the way path data is conventionally stringified.
fn fmt_num(v: f64) -> String {
    let mut out = String::new();
    if !v.is_finite() || v.abs() < 0.0005 {
        out.push('0');
        return out;
    }

    let k = (v * 1000.0 + 0.5).floor() as i64;
    if k == 0 {
        out.push('0');
        return out;
    }
    if k < 0 {
        out.push('-');
    }
    let abs = k.unsigned_abs();
    let _ = write!(out, "{}", abs / 1000);
    let mut frac = abs % 1000;
    if frac == 0 {
        return out;
    }
    let mut digits: usize = 3;
    while frac % 10 == 0 {
        frac /= 10;
        digits -= 1;
    }
    let _ = write!(out, ".{frac:0digits$}", digits = digits);
    out
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout;
    use crate::text::DeterministicTextMeasurer;
    use mapling_core::config::LayoutConfig;
    use mapling_core::geom::size;
    use mapling_core::tree::MindMapNode;
    use mapling_core::visible::CollapsedSet;

    fn sample_layout(collapsed: &CollapsedSet) -> MindMapLayout {
        let tree = MindMapNode::with_children(
            "root",
            "Root & Co",
            vec![
                MindMapNode::with_children(
                    "a",
                    "Branch <A>",
                    vec![MindMapNode::new("a1", "Leaf")],
                ),
                MindMapNode::new("b", "Branch B"),
            ],
        );
        layout(
            &tree,
            collapsed,
            size(1200.0, 800.0),
            &LayoutConfig::default(),
            &DeterministicTextMeasurer::default(),
        )
        .unwrap()
    }

    fn render(options: &SceneOptions) -> String {
        render_scene(&sample_layout(&CollapsedSet::new()), options)
    }

    #[test]
    fn scene_is_well_formed_xml_with_all_elements() {
        let svg = render(&SceneOptions::default());
        let doc = roxmltree::Document::parse(&svg).unwrap();

        let nodes = doc
            .descendants()
            .filter(|n| {
                n.attribute("class")
                    .is_some_and(|c| c.starts_with("mindmap-node"))
            })
            .count();
        assert_eq!(nodes, 4);

        let edges = doc
            .descendants()
            .filter(|n| n.attribute("class").is_some_and(|c| c.starts_with("edge ")))
            .count();
        assert_eq!(edges, 3);
    }

    #[test]
    fn labels_are_xml_escaped() {
        let svg = render(&SceneOptions::default());
        assert!(svg.contains("Root &amp; Co"));
        assert!(svg.contains("Branch &lt;A&gt;"));
        roxmltree::Document::parse(&svg).unwrap();
    }

    #[test]
    fn transform_composes_view_and_content_scale() {
        let svg = render(&SceneOptions {
            transform: ViewTransform {
                tx: 100.0,
                ty: 50.0,
                k: 0.5,
            },
            content_scale: 2.0,
            ..SceneOptions::default()
        });
        assert!(svg.contains(r#"transform="translate(100 50) scale(1)""#));
    }

    #[test]
    fn style_flips_repaint_without_touching_layout() {
        let layout = sample_layout(&CollapsedSet::new());
        let plain = render_scene(&layout, &SceneOptions {
            highlight_nodes: false,
            colored_edges: false,
            ..SceneOptions::default()
        });
        let styled = render_scene(&layout, &SceneOptions::default());

        assert!(plain.contains(r#"fill="white""#));
        assert!(plain.contains(r##"stroke="#64748B""##));
        // Branch 0 edge color only shows up in the styled render.
        assert!(styled.contains(r##"stroke="#3B82F6""##));
        assert!(!plain.contains(r##"stroke="#3B82F6""##));
    }

    #[test]
    fn toggle_affordance_follows_full_tree_children() {
        let mut collapsed = CollapsedSet::new();
        collapsed.toggle("a");
        let svg = render_scene(&sample_layout(&collapsed), &SceneOptions::default());
        // The collapsed branch keeps its affordance, now showing "+".
        assert!(svg.contains(r#"class="toggle""#));
        assert!(svg.contains(">+</text>"));
        // Leaf "b" contributes no toggle, so there are exactly two.
        assert_eq!(svg.matches(r#"class="toggle""#).count(), 2);
    }

    #[test]
    fn appear_set_adds_fade_ins() {
        let mut options = SceneOptions::default();
        options.appear.insert("a1".to_string());
        let svg = render(&options);
        assert_eq!(svg.matches("<animate").count(), 2); // node + its edge
        let none = render(&SceneOptions::default());
        assert!(!none.contains("<animate"));
    }

    #[test]
    fn background_is_optional() {
        let with = render(&SceneOptions {
            background: Some("white".to_string()),
            ..SceneOptions::default()
        });
        assert!(with.contains(r#"class="background""#));
        let without = render(&SceneOptions::default());
        assert!(!without.contains(r#"class="background""#));
    }

    #[test]
    fn fmt_num_trims_and_rounds() {
        assert_eq!(fmt_num(0.0), "0");
        assert_eq!(fmt_num(-0.0004), "0");
        assert_eq!(fmt_num(1.0), "1");
        assert_eq!(fmt_num(1.5), "1.5");
        assert_eq!(fmt_num(-2.25), "-2.25");
        assert_eq!(fmt_num(1.0004), "1");
        assert_eq!(fmt_num(1.2345), "1.235"); // JS-style: rounds toward +inf at the 3dp tie
        assert_eq!(fmt_num(10.05), "10.05");
    }
}
