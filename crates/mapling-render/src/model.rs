use indexmap::IndexMap;
use mapling_core::geom::{Point, point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        point(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

/// One visible node with its assigned center position and measured extent.
/// Created fresh per layout pass, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub depth: usize,
    /// Depth-1 ancestor branch index; `None` for the root.
    pub section: Option<usize>,
    /// Owns children in the full tree (expand affordance), even while
    /// collapsed.
    pub has_children: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
    /// Endpoint centers; the scene renderer derives the connector curve.
    pub points: [LayoutPoint; 2],
    /// Depth of the child endpoint.
    pub depth: usize,
    /// Branch section of the child endpoint.
    pub section: Option<usize>,
}

/// Complete output of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindMapLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    pub bounds: Bounds,
    /// Uniform scale fitting the content into the container minus the fit
    /// margin. Multiplies into the viewport transform, never replaces it.
    pub content_scale: f64,
}

impl MindMapLayout {
    /// Ordered id → position mapping, in visible pre-order.
    pub fn positions(&self) -> IndexMap<&str, Point> {
        self.nodes
            .iter()
            .map(|n| (n.id.as_str(), point(n.x, n.y)))
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_from_points_tracks_extremes() {
        let b = Bounds::from_points([(1.0, -2.0), (-3.0, 4.0), (0.5, 0.0)]).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (-3.0, -2.0, 1.0, 4.0));
        assert_eq!(b.width(), 4.0);
        assert_eq!(b.height(), 6.0);
        assert_eq!(b.center(), point(-1.0, 1.0));
    }

    #[test]
    fn bounds_from_no_points_is_none() {
        assert!(Bounds::from_points([]).is_none());
    }

    #[test]
    fn layout_output_round_trips_through_json() {
        let layout = MindMapLayout {
            nodes: vec![LayoutNode {
                id: "root".to_string(),
                label: "Root".to_string(),
                x: 0.0,
                y: 0.0,
                width: 120.0,
                height: 60.0,
                depth: 0,
                section: None,
                has_children: true,
                collapsed: false,
            }],
            edges: vec![LayoutEdge {
                from: "root".to_string(),
                to: "a".to_string(),
                points: [
                    LayoutPoint { x: 0.0, y: 0.0 },
                    LayoutPoint { x: 800.0, y: -150.0 },
                ],
                depth: 1,
                section: Some(0),
            }],
            bounds: Bounds {
                min_x: -60.0,
                min_y: -30.0,
                max_x: 860.0,
                max_y: 30.0,
            },
            content_scale: 1.25,
        };
        let json = serde_json::to_string(&layout).unwrap();
        let back: MindMapLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);
    }
}
