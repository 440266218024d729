#![forbid(unsafe_code)]

//! `mapling` is a headless, interactive mind-map visualization engine.
//!
//! A [`MindMapView`] session owns one diagram: the source tree, collapse
//! state, viewport transform, and display options. Every structural change
//! (collapse toggle, settled resize, fullscreen transition) replaces the
//! layout wholesale; style flips repaint from the cached layout. Scenes are
//! SVG strings; the host adapter wires them to its display surface and feeds
//! back resize/fullscreen notifications.
//!
//! # Features
//!
//! - `raster`: enable fixed-resolution PNG export via pure-Rust SVG
//!   rasterization (`mapling::export`).

pub use mapling_core::*;
pub use mapling_render::{
    Bounds, DeterministicTextMeasurer, LayoutEdge, LayoutNode, MindMapLayout, Mode, SceneOptions,
    TextMeasurer, ViewTransform, ViewportController, render_scene,
};

pub mod view;
pub use view::{DisplayOptions, MindMapView, ViewError, ViewOptions};

#[cfg(feature = "raster")]
pub mod export;
#[cfg(feature = "raster")]
pub use export::{ExportArtifact, ExportError};
#[cfg(feature = "raster")]
pub use view::ExportJob;
