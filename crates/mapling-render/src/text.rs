use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_weight: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 80.0,
            font_weight: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Measures a label's extent so node boxes can be sized before rendering.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-stack-free measurer: east-asian-aware cell count times an average
/// glyph aspect. Reproducible across hosts, which keeps layout output and
/// golden tests stable.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    /// Average glyph width as a fraction of the font size; 0 means the
    /// default of 0.6.
    pub char_width_factor: f64,
    /// Line height as a fraction of the font size; 0 means the default of
    /// 1.2.
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };

        let font_size = style.font_size.max(1.0);
        let mut max_cells = 0usize;
        let mut line_count = 0usize;
        for line in text.split('\n') {
            max_cells = max_cells.max(UnicodeWidthStr::width(line));
            line_count += 1;
        }
        let line_count = line_count.max(1);

        TextMetrics {
            width: max_cells as f64 * font_size * char_width_factor,
            height: line_count as f64 * font_size * line_height_factor,
            line_count,
        }
    }
}
