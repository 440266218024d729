#![forbid(unsafe_code)]

//! Fixed-resolution raster export.
//!
//! Two-stage pipeline: the caller captures a full-content SVG snapshot of
//! the scene, then this module fits it into the target canvas (90% of
//! 3840×2160 by default), centers it over a solid background, and encodes
//! PNG. The live viewport transform never enters the computation.

use mapling_core::config::ExportConfig;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to parse scene SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster export")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color for raster export: {color}")]
    Background { color: String },
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Finished export, ready to hand to the host as a named download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
struct ContentBox {
    min_x: f32,
    min_y: f32,
    width: f32,
    height: f32,
}

pub fn render_png(svg: &str, config: &ExportConfig) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    // Keep output stable-ish across environments while still using system fonts.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| ExportError::SvgParse)?;
    let content = content_box(svg, &tree);

    let target_w = config.width.max(1);
    let target_h = config.height.max(1);
    let fill = config.content_fill.clamp(0.05, 1.0) as f32;

    let scale = (target_w as f32 / content.width).min(target_h as f32 / content.height) * fill;
    let offset_x = (target_w as f32 - content.width * scale) / 2.0 - content.min_x * scale;
    let offset_y = (target_h as f32 - content.height * scale) / 2.0 - content.min_y * scale;

    let mut pixmap = tiny_skia::Pixmap::new(target_w, target_h).ok_or(ExportError::PixmapAlloc)?;
    let Some(background) = parse_color(&config.background) else {
        return Err(ExportError::Background {
            color: config.background.clone(),
        });
    };
    pixmap.fill(background);

    let transform = tiny_skia::Transform::from_row(scale, 0.0, 0.0, scale, offset_x, offset_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    tracing::debug!(width = target_w, height = target_h, scale, "scene rasterized");
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

/// The box the export fits and centers: the root viewBox when present
/// (scene snapshots are sized to their content), otherwise the rendered
/// bounds as computed by usvg.
fn content_box(svg: &str, tree: &usvg::Tree) -> ContentBox {
    if let Some((width, height)) = parse_svg_viewbox(svg) {
        return ContentBox {
            min_x: 0.0,
            min_y: 0.0,
            width,
            height,
        };
    }

    let bbox = tree.root().abs_stroke_bounding_box();
    let w = bbox.width();
    let h = bbox.height();
    if w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0 {
        return ContentBox {
            min_x: bbox.x(),
            min_y: bbox.y(),
            width: w,
            height: h,
        };
    }

    let size = tree.size();
    ContentBox {
        min_x: 0.0,
        min_y: 0.0,
        width: size.width().max(1.0),
        height: size.height().max(1.0),
    }
}

fn parse_svg_viewbox(svg: &str) -> Option<(f32, f32)> {
    // Cheap, non-validating parse of the root `viewBox="minX minY w h"`;
    // sufficient for the SVG this engine emits.
    let i = svg.find("viewBox=\"")?;
    let rest = &svg[i + "viewBox=\"".len()..];
    let end = rest.find('"')?;
    let mut it = rest[..end].split_whitespace();
    let _min_x = it.next()?.parse::<f32>().ok()?;
    let _min_y = it.next()?.parse::<f32>().ok()?;
    let width = it.next()?.parse::<f32>().ok()?;
    let height = it.next()?.parse::<f32>().ok()?;
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Some((width, height))
    } else {
        None
    }
}

fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        8 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;

    #[test]
    fn render_png_produces_png_signature_at_target_size() {
        let bytes = render_png(SQUARE, &ExportConfig::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        assert_eq!((w, h), (3840, 2160));
    }

    #[test]
    fn output_size_tracks_the_config_not_the_source() {
        let config = ExportConfig {
            width: 64,
            height: 48,
            ..ExportConfig::default()
        };
        let bytes = render_png(SQUARE, &config).unwrap();
        let w = u32::from_be_bytes(bytes[16..20].try_into().unwrap());
        let h = u32::from_be_bytes(bytes[20..24].try_into().unwrap());
        assert_eq!((w, h), (64, 48));
    }

    #[test]
    fn malformed_svg_is_a_parse_error() {
        let err = render_png("<svg", &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::SvgParse));
    }

    #[test]
    fn unknown_background_is_rejected() {
        let config = ExportConfig {
            background: "no-such-color".to_string(),
            ..ExportConfig::default()
        };
        let err = render_png(SQUARE, &config).unwrap_err();
        assert!(matches!(err, ExportError::Background { .. }));
    }

    #[test]
    fn color_parsing_accepts_named_and_hex_forms() {
        assert!(parse_color("white").is_some());
        assert!(parse_color("transparent").is_some());
        assert!(parse_color("#fff").is_some());
        assert!(parse_color("#FFFFFF").is_some());
        assert!(parse_color("#ffffff80").is_some());
        assert!(parse_color("bogus").is_none());
        assert!(parse_color("#12345").is_none());
    }

    #[test]
    fn viewbox_parse_handles_the_common_form() {
        assert_eq!(
            parse_svg_viewbox(r#"<svg viewBox="0 0 120 80">"#),
            Some((120.0, 80.0))
        );
        assert_eq!(parse_svg_viewbox(r#"<svg width="10">"#), None);
        assert_eq!(parse_svg_viewbox(r#"<svg viewBox="0 0 0 80">"#), None);
    }
}
