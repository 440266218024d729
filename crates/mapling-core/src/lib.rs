#![forbid(unsafe_code)]

//! Core data model for the `mapling` mind-map engine.
//!
//! This crate owns the source tree ([`MindMapNode`]), the collapse state and
//! visibility pass ([`visible::CollapsedSet`], [`visible::visible_nodes`]),
//! the deterministic branch/depth color theme, and the typed configuration
//! shared by the layout and view layers. It does no rendering.

pub mod config;
pub mod error;
pub mod geom;
pub mod theme;
pub mod tree;
pub mod visible;

pub use config::{ExportConfig, LayoutConfig, ViewConfig};
pub use error::{Error, Result};
pub use tree::MindMapNode;
pub use visible::{CollapsedSet, VisibleNode, visible_edges, visible_nodes};
