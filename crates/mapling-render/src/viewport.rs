//! View-transform state machine for the interactive scene.
//!
//! The controller is the only owner of the pan/zoom transform and of the
//! container dimensions; everything else (scene renderer, session) reads
//! them. Timestamps come from the host adapter in milliseconds so the
//! debounce logic stays deterministic under test.

use crate::model::Bounds;
use mapling_core::config::ViewConfig;
use mapling_core::geom::Size;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub tx: f64,
    pub ty: f64,
    pub k: f64,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        k: 1.0,
    };
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Navigate,
    Pan,
}

#[derive(Debug, Clone, Default)]
struct ResizeDebouncer {
    pending: Option<(Size, u64)>,
}

impl ResizeDebouncer {
    /// Coalesces with any pending request: the window restarts from `now_ms`.
    fn request(&mut self, size: Size, now_ms: u64, window_ms: u64) {
        self.pending = Some((size, now_ms.saturating_add(window_ms)));
    }

    fn poll(&mut self, now_ms: u64) -> Option<Size> {
        match self.pending {
            Some((size, deadline)) if now_ms >= deadline => {
                self.pending = None;
                Some(size)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewConfig,
    mode: Mode,
    transform: ViewTransform,
    fit: ViewTransform,
    container: Size,
    fullscreen: bool,
    /// Dimensions and transform to restore when leaving fullscreen.
    restore: Option<(Size, ViewTransform)>,
    resize: ResizeDebouncer,
}

impl ViewportController {
    pub fn new(config: ViewConfig, container: Size) -> Self {
        let min_height = config.min_height;
        Self {
            config,
            mode: Mode::Navigate,
            transform: ViewTransform::IDENTITY,
            fit: ViewTransform::IDENTITY,
            container: Size::new(container.width, container.height.max(min_height)),
            fullscreen: false,
            restore: None,
            resize: ResizeDebouncer::default(),
        }
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn toggle_pan(&mut self) -> Mode {
        self.mode = match self.mode {
            Mode::Navigate => Mode::Pan,
            Mode::Pan => Mode::Navigate,
        };
        self.mode
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Recomputes the fit-to-content transform for freshly laid-out bounds
    /// and adopts it as both the current transform and the reset target.
    /// Called after every successful layout pass.
    pub fn fit_to_content(&mut self, bounds: &Bounds, content_scale: f64) {
        let bw = bounds.width() * content_scale;
        let bh = bounds.height() * content_scale;

        let mut k = self.config.max_initial_scale;
        if bw > 0.0 {
            k = k.min(self.config.initial_fill * self.container.width / bw);
        }
        if bh > 0.0 {
            k = k.min(self.config.initial_fill * self.container.height / bh);
        }

        let center = bounds.center();
        self.fit = ViewTransform {
            tx: self.container.width / 2.0 - k * content_scale * center.x,
            ty: self.container.height / 2.0 - k * content_scale * center.y,
            k,
        };
        self.transform = self.fit;
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom_by(self.config.zoom_in_factor)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom_by(self.config.zoom_out_factor)
    }

    /// Translation is preserved: zoom anchors at the current pan position.
    /// At a scale boundary this is an exact no-op.
    fn zoom_by(&mut self, factor: f64) -> f64 {
        let k = (self.transform.k * factor).clamp(self.config.min_scale, self.config.max_scale);
        self.transform.k = k;
        k
    }

    /// Free-drag translation; only honored in [`Mode::Pan`].
    pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
        if self.mode != Mode::Pan {
            return false;
        }
        self.transform.tx += dx;
        self.transform.ty += dy;
        true
    }

    /// Returns to the fit transform computed at the last layout pass.
    pub fn reset(&mut self) {
        self.transform = self.fit;
    }

    /// Restores a previously captured transform (fullscreen exit), clamped
    /// to the configured scale range.
    pub fn restore_transform(&mut self, transform: ViewTransform) {
        self.transform = ViewTransform {
            k: transform
                .k
                .clamp(self.config.min_scale, self.config.max_scale),
            ..transform
        };
    }

    /// Registers a container resize; the new size only takes effect once
    /// [`Self::poll_resize`] observes the debounce window elapsing.
    pub fn resize(&mut self, size: Size, now_ms: u64) {
        self.resize
            .request(size, now_ms, self.config.resize_debounce_ms);
    }

    /// Surfaces the settled container size, if any. The caller must follow
    /// up with a re-layout.
    pub fn poll_resize(&mut self, now_ms: u64) -> Option<Size> {
        let size = self.resize.poll(now_ms)?;
        let size = if self.fullscreen {
            size
        } else {
            Size::new(size.width, size.height.max(self.config.min_height))
        };
        self.container = size;
        Some(size)
    }

    /// Adopts the screen dimensions, snapshotting the current state for the
    /// eventual exit. The caller must follow up with a re-layout.
    pub fn enter_fullscreen(&mut self, screen: Size) {
        if self.fullscreen {
            return;
        }
        self.restore = Some((self.container, self.transform));
        self.container = screen;
        self.fullscreen = true;
    }

    /// Restores the pre-fullscreen dimensions and returns the transform that
    /// was active then, if one was snapshotted. The caller re-layouts and
    /// then re-applies the returned transform.
    pub fn exit_fullscreen(&mut self) -> Option<ViewTransform> {
        if !self.fullscreen {
            return None;
        }
        self.fullscreen = false;
        match self.restore.take() {
            Some((size, transform)) => {
                self.container = size;
                Some(transform)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapling_core::geom::size;

    fn bounds() -> Bounds {
        Bounds {
            min_x: -400.0,
            min_y: -300.0,
            max_x: 400.0,
            max_y: 300.0,
        }
    }

    fn controller() -> ViewportController {
        let mut vp = ViewportController::new(ViewConfig::default(), size(1200.0, 800.0));
        vp.fit_to_content(&bounds(), 1.0);
        vp
    }

    #[test]
    fn fit_centers_the_content() {
        let vp = controller();
        let t = vp.transform();
        // Symmetric bounds center at the origin, so the fit translation is
        // the container center.
        assert_eq!((t.tx, t.ty), (600.0, 400.0));
        // 0.95 * 800 / 600 is the binding constraint, under the 1.5 cap.
        assert!((t.k - 0.95 * 800.0 / 600.0).abs() < 1e-9);
    }

    #[test]
    fn fit_scale_is_capped_for_tiny_content() {
        let mut vp = ViewportController::new(ViewConfig::default(), size(1200.0, 800.0));
        vp.fit_to_content(
            &Bounds {
                min_x: -1.0,
                min_y: -1.0,
                max_x: 1.0,
                max_y: 1.0,
            },
            1.0,
        );
        assert_eq!(vp.transform().k, 1.5);
    }

    #[test]
    fn zoom_clamps_and_is_idempotent_at_the_boundary() {
        let mut vp = controller();
        for _ in 0..32 {
            vp.zoom_in();
        }
        assert_eq!(vp.transform().k, 2.0);
        vp.zoom_in();
        assert_eq!(vp.transform().k, 2.0);

        for _ in 0..64 {
            vp.zoom_out();
        }
        assert_eq!(vp.transform().k, 0.1);
        vp.zoom_out();
        assert_eq!(vp.transform().k, 0.1);
    }

    #[test]
    fn zoom_preserves_translation() {
        let mut vp = controller();
        let before = vp.transform();
        vp.zoom_in();
        let after = vp.transform();
        assert_eq!((before.tx, before.ty), (after.tx, after.ty));
        assert!(after.k > before.k);
    }

    #[test]
    fn pan_only_applies_in_pan_mode() {
        let mut vp = controller();
        let before = vp.transform();
        assert!(!vp.pan_by(10.0, 10.0));
        assert_eq!(vp.transform(), before);

        assert_eq!(vp.toggle_pan(), Mode::Pan);
        assert!(vp.pan_by(10.0, -5.0));
        let t = vp.transform();
        assert_eq!((t.tx, t.ty), (before.tx + 10.0, before.ty - 5.0));

        assert_eq!(vp.toggle_pan(), Mode::Navigate);
        assert!(!vp.pan_by(100.0, 100.0));
    }

    #[test]
    fn reset_restores_the_fit_transform_after_any_sequence() {
        let mut vp = controller();
        let fit = vp.transform();
        vp.zoom_in();
        vp.set_mode(Mode::Pan);
        vp.pan_by(300.0, -200.0);
        vp.zoom_out();
        vp.reset();
        assert_eq!(vp.transform(), fit);
    }

    #[test]
    fn resize_is_debounced_and_coalesced() {
        let mut vp = controller();
        vp.resize(size(900.0, 900.0), 1_000);
        assert_eq!(vp.poll_resize(1_100), None);

        // A second request inside the window restarts it and wins.
        vp.resize(size(1000.0, 1000.0), 1_200);
        assert_eq!(vp.poll_resize(1_300), None);
        assert_eq!(vp.poll_resize(1_450), Some(size(1000.0, 1000.0)));

        // Nothing pending afterwards.
        assert_eq!(vp.poll_resize(2_000), None);
    }

    #[test]
    fn resize_enforces_the_minimum_height() {
        let mut vp = controller();
        vp.resize(size(600.0, 300.0), 0);
        assert_eq!(vp.poll_resize(250), Some(size(600.0, 800.0)));
        assert_eq!(vp.container(), size(600.0, 800.0));
    }

    #[test]
    fn fullscreen_round_trip_restores_dimensions_and_transform() {
        let mut vp = controller();
        vp.zoom_in();
        let before = vp.transform();
        let dims = vp.container();

        vp.enter_fullscreen(size(2560.0, 1440.0));
        assert!(vp.is_fullscreen());
        assert_eq!(vp.container(), size(2560.0, 1440.0));
        vp.fit_to_content(&bounds(), 1.0);
        vp.zoom_out();

        let snapshot = vp.exit_fullscreen().unwrap();
        assert!(!vp.is_fullscreen());
        assert_eq!(vp.container(), dims);
        vp.restore_transform(snapshot);
        assert_eq!(vp.transform(), before);
    }

    #[test]
    fn exit_without_enter_is_a_no_op() {
        let mut vp = controller();
        assert_eq!(vp.exit_fullscreen(), None);
    }
}
