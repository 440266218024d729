//! Interactive mind-map view session.
//!
//! [`MindMapView`] is the single owner of the view's mutable state: the
//! collapse set, the viewport transform, and the display options. All
//! mutations go through its methods; a failed layout pass leaves the
//! previously rendered layout untouched.

use mapling_core::config::{ExportConfig, LayoutConfig, ViewConfig};
use mapling_core::geom::Size;
use mapling_core::tree::MindMapNode;
use mapling_core::visible::CollapsedSet;
use mapling_render::layout::layout;
use mapling_render::model::MindMapLayout;
use mapling_render::scene::{SceneOptions, render_scene};
use mapling_render::text::{DeterministicTextMeasurer, TextMeasurer};
use mapling_render::viewport::{Mode, ViewportController};
use rustc_hash::FxHashSet;
use std::sync::Arc;

#[cfg(feature = "raster")]
use crate::export::{self, ExportArtifact, ExportError};
#[cfg(feature = "raster")]
use mapling_render::viewport::ViewTransform;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error(transparent)]
    Tree(#[from] mapling_core::Error),

    #[error("fullscreen request denied by host")]
    FullscreenDenied,
}

/// Style switches. Both are pure repaints: flipping one never triggers a
/// layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    pub highlight_nodes: bool,
    pub colored_edges: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            highlight_nodes: true,
            colored_edges: true,
        }
    }
}

#[derive(Clone)]
pub struct ViewOptions {
    pub layout: LayoutConfig,
    pub view: ViewConfig,
    pub export: ExportConfig,
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            view: ViewConfig::default(),
            export: ExportConfig::default(),
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

/// Generation-stamped export snapshot. Finishing a job whose generation is
/// no longer current yields nothing, which is what makes re-triggered
/// exports restartable without double downloads.
#[cfg(feature = "raster")]
#[derive(Debug, Clone)]
pub struct ExportJob {
    generation: u64,
    svg: String,
}

#[cfg(feature = "raster")]
impl ExportJob {
    pub fn svg(&self) -> &str {
        &self.svg
    }
}

pub struct MindMapView {
    tree: MindMapNode,
    collapsed: CollapsedSet,
    viewport: ViewportController,
    display: DisplayOptions,
    options: ViewOptions,
    layout: MindMapLayout,
    layout_pass: u64,
    prev_visible: FxHashSet<String>,
    appear: FxHashSet<String>,
    export_generation: u64,
}

impl std::fmt::Debug for MindMapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MindMapView")
            .field("layout_pass", &self.layout_pass)
            .field("export_generation", &self.export_generation)
            .finish_non_exhaustive()
    }
}

impl MindMapView {
    pub fn new(tree: MindMapNode, container: Size) -> Result<Self, ViewError> {
        Self::with_options(tree, container, ViewOptions::default())
    }

    pub fn with_options(
        tree: MindMapNode,
        container: Size,
        options: ViewOptions,
    ) -> Result<Self, ViewError> {
        let mut viewport = ViewportController::new(options.view.clone(), container);
        let collapsed = CollapsedSet::new();
        let first = layout(
            &tree,
            &collapsed,
            viewport.container(),
            &options.layout,
            options.text_measurer.as_ref(),
        )?;
        viewport.fit_to_content(&first.bounds, first.content_scale);
        let prev_visible = first.nodes.iter().map(|n| n.id.clone()).collect();

        Ok(Self {
            tree,
            collapsed,
            viewport,
            display: DisplayOptions::default(),
            options,
            layout: first,
            layout_pass: 1,
            prev_visible,
            appear: FxHashSet::default(),
            export_generation: 0,
        })
    }

    pub fn tree(&self) -> &MindMapNode {
        &self.tree
    }

    pub fn collapsed(&self) -> &CollapsedSet {
        &self.collapsed
    }

    pub fn layout(&self) -> &MindMapLayout {
        &self.layout
    }

    /// Monotonic counter of completed layout passes; style repaints do not
    /// advance it.
    pub fn layout_pass(&self) -> u64 {
        self.layout_pass
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn display_options(&self) -> DisplayOptions {
        self.display
    }

    fn relayout(&mut self) -> Result<(), ViewError> {
        let next = match layout(
            &self.tree,
            &self.collapsed,
            self.viewport.container(),
            &self.options.layout,
            self.options.text_measurer.as_ref(),
        ) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(error = %err, "layout pass aborted; previous scene kept");
                return Err(err.into());
            }
        };

        let now: FxHashSet<String> = next.nodes.iter().map(|n| n.id.clone()).collect();
        self.appear = now.difference(&self.prev_visible).cloned().collect();
        self.prev_visible = now;
        self.viewport.fit_to_content(&next.bounds, next.content_scale);
        self.layout = next;
        self.layout_pass += 1;
        Ok(())
    }

    /// Collapses or expands the subtree under `id` and re-lays-out.
    ///
    /// Returns `Ok(false)` without any effect for a childless node; unknown
    /// ids are an error. If the layout pass fails the toggle is rolled back
    /// so the previous scene stays consistent.
    pub fn toggle_node(&mut self, id: &str) -> Result<bool, ViewError> {
        let Some(node) = self.tree.get(id) else {
            return Err(mapling_core::Error::UnknownNode { id: id.to_string() }.into());
        };
        if node.children.is_empty() {
            return Ok(false);
        }

        self.collapsed.toggle(id);
        if let Err(err) = self.relayout() {
            self.collapsed.toggle(id);
            return Err(err);
        }
        Ok(true)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.viewport.zoom_out()
    }

    pub fn zoom_level(&self) -> f64 {
        self.viewport.transform().k
    }

    pub fn toggle_pan(&mut self) -> Mode {
        self.viewport.toggle_pan()
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        self.viewport.pan_by(dx, dy)
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn set_highlight_nodes(&mut self, on: bool) {
        self.display.highlight_nodes = on;
    }

    pub fn set_colored_edges(&mut self, on: bool) {
        self.display.colored_edges = on;
    }

    /// Host notification of a container resize; takes effect once
    /// [`Self::poll_resize`] observes the debounce window elapsing.
    pub fn resize(&mut self, container: Size, now_ms: u64) {
        self.viewport.resize(container, now_ms);
    }

    /// Returns `Ok(true)` when a settled resize triggered a re-layout.
    pub fn poll_resize(&mut self, now_ms: u64) -> Result<bool, ViewError> {
        if self.viewport.poll_resize(now_ms).is_some() {
            self.relayout()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Host notification that fullscreen was entered at `screen` dimensions.
    pub fn fullscreen_entered(&mut self, screen: Size) -> Result<(), ViewError> {
        self.viewport.enter_fullscreen(screen);
        self.relayout()
    }

    /// Host notification that fullscreen ended. Dimensions and the transform
    /// active before entering are restored; without a snapshot the fresh fit
    /// transform stands.
    pub fn fullscreen_exited(&mut self) -> Result<(), ViewError> {
        let snapshot = self.viewport.exit_fullscreen();
        self.relayout()?;
        if let Some(transform) = snapshot {
            self.viewport.restore_transform(transform);
        }
        Ok(())
    }

    /// Host notification that a fullscreen request was denied. All view
    /// state stays as it was; the error is returned for surfacing as a
    /// transient notice.
    pub fn fullscreen_denied(&self) -> Result<(), ViewError> {
        tracing::warn!("fullscreen request denied by host");
        Err(ViewError::FullscreenDenied)
    }

    /// Renders the scene under the current viewport transform. Fade-ins for
    /// nodes revealed by the latest layout pass are emitted once.
    pub fn scene_svg(&mut self) -> String {
        let container = self.viewport.container();
        let options = SceneOptions {
            width: container.width,
            height: container.height,
            diagram_id: None,
            background: None,
            highlight_nodes: self.display.highlight_nodes,
            colored_edges: self.display.colored_edges,
            transform: self.viewport.transform(),
            content_scale: self.layout.content_scale,
            root_font_size: self.options.layout.root_font_size,
            node_font_size: self.options.layout.node_font_size,
            appear: std::mem::take(&mut self.appear),
        };
        render_scene(&self.layout, &options)
    }

    /// Captures a full-content export snapshot, independent of the live
    /// pan/zoom. Starting a new export supersedes any unfinished one.
    #[cfg(feature = "raster")]
    pub fn begin_export(&mut self) -> ExportJob {
        self.export_generation += 1;
        let bounds = self.layout.bounds;
        let options = SceneOptions {
            width: bounds.width().max(1.0),
            height: bounds.height().max(1.0),
            diagram_id: None,
            background: None,
            highlight_nodes: self.display.highlight_nodes,
            colored_edges: self.display.colored_edges,
            transform: ViewTransform {
                tx: -bounds.min_x,
                ty: -bounds.min_y,
                k: 1.0,
            },
            content_scale: 1.0,
            root_font_size: self.options.layout.root_font_size,
            node_font_size: self.options.layout.node_font_size,
            appear: FxHashSet::default(),
        };
        tracing::debug!(generation = self.export_generation, "export snapshot captured");
        ExportJob {
            generation: self.export_generation,
            svg: render_scene(&self.layout, &options),
        }
    }

    /// Rasterizes a captured snapshot. Returns `Ok(None)` when the job was
    /// superseded by a newer `begin_export`.
    #[cfg(feature = "raster")]
    pub fn finish_export(&self, job: ExportJob) -> Result<Option<ExportArtifact>, ExportError> {
        if job.generation != self.export_generation {
            tracing::debug!(
                job = job.generation,
                current = self.export_generation,
                "export superseded; dropping artifact"
            );
            return Ok(None);
        }
        let bytes = export::render_png(&job.svg, &self.options.export)?;
        Ok(Some(ExportArtifact {
            filename: self.options.export.filename.clone(),
            bytes,
        }))
    }

    /// One-shot export convenience for hosts without an async boundary.
    #[cfg(feature = "raster")]
    pub fn export_png(&mut self) -> Result<ExportArtifact, ExportError> {
        let job = self.begin_export();
        let bytes = export::render_png(job.svg(), &self.options.export)?;
        Ok(ExportArtifact {
            filename: self.options.export.filename.clone(),
            bytes,
        })
    }
}
