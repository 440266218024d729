#![forbid(unsafe_code)]

//! Headless layout and rendering for mapling mind maps.
//!
//! The pipeline is pure and wholesale: a layout pass consumes the source
//! tree plus collapse state and replaces the previous [`model::MindMapLayout`]
//! entirely; the scene renderer turns a layout into SVG under the viewport's
//! current transform. Nothing here owns mutable view state except the
//! [`viewport::ViewportController`].

pub mod layout;
pub mod model;
pub mod scene;
pub mod text;
pub mod viewport;

pub use layout::layout;
pub use model::{Bounds, LayoutEdge, LayoutNode, LayoutPoint, MindMapLayout};
pub use scene::{SceneOptions, render_scene};
pub use text::{DeterministicTextMeasurer, TextMeasurer, TextMetrics, TextStyle};
pub use viewport::{Mode, ViewTransform, ViewportController};
