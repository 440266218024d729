use serde::{Deserialize, Serialize};

/// Layout constants.
///
/// The spread multipliers are presentation values tuned for short AI-generated
/// labels; they are safe to re-tune per deployment because the layout engine
/// forces level coordinates to stay strictly monotonic regardless of the
/// values chosen here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Depth levels compress toward `container_width / depth_divisor` per
    /// generation.
    pub depth_divisor: f64,
    pub min_sibling_spacing: f64,
    pub max_sibling_spacing: f64,
    /// Vertical space reserved for surrounding chrome before sibling spacing
    /// is computed.
    pub vertical_reserve: f64,
    /// Magnitude multiplier for the depth-1 level (branch fan-out).
    pub first_level_spread: f64,
    pub second_deepest_spread: f64,
    pub deepest_spread: f64,
    /// Margin kept inside the container when deriving the content scale.
    pub fit_margin: f64,
    pub max_content_scale: f64,
    /// Padding added around the measured label extent.
    pub label_padding: f64,
    pub root_font_size: f64,
    pub node_font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            depth_divisor: 3.0,
            min_sibling_spacing: 150.0,
            max_sibling_spacing: 250.0,
            vertical_reserve: 100.0,
            first_level_spread: 2.0,
            second_deepest_spread: 1.6,
            deepest_spread: 1.25,
            fit_margin: 50.0,
            max_content_scale: 2.0,
            label_padding: 20.0,
            root_font_size: 100.0,
            node_font_size: 80.0,
        }
    }
}

/// Viewport behavior: fit transform, zoom clamps, resize debounce.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Fraction of the container the fit-to-content transform fills.
    pub initial_fill: f64,
    pub max_initial_scale: f64,
    pub zoom_in_factor: f64,
    pub zoom_out_factor: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub resize_debounce_ms: u64,
    /// Minimum non-fullscreen container height.
    pub min_height: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            initial_fill: 0.95,
            max_initial_scale: 1.5,
            zoom_in_factor: 1.2,
            zoom_out_factor: 0.8,
            min_scale: 0.1,
            max_scale: 2.0,
            resize_debounce_ms: 250,
            min_height: 800.0,
        }
    }
}

/// Raster export target. Output dimensions are fixed regardless of the
/// on-screen viewport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    /// Fraction of the target canvas the content may occupy.
    pub content_fill: f64,
    pub background: String,
    pub filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 3840,
            height: 2160,
            content_fill: 0.9,
            background: "white".to_string(),
            filename: "mindmap.png".to_string(),
        }
    }
}
