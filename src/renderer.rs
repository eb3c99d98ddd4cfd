/// Raster output through tiny-skia.
pub mod cpu_renderer;
/// SVG document output.
pub mod svg_renderer;

use palette::Srgb;

pub use cpu_renderer::CpuRenderer;
pub use svg_renderer::SvgRenderer;

use crate::{
    outline::Point,
    path::ContourPath,
    reveal::RevealFrame,
};

/// Thinnest brush used for the reveal mask, in pixels.
pub const MIN_BRUSH_WIDTH: f32 = 1.2;

/// Width of the strokes that open the reveal mask.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StrokeWidth {
    /// Derived from the font size: `max(1.2, font_size * brush_width_factor)`.
    #[default]
    Auto,
    Px(f32),
}

impl StrokeWidth {
    /// Brush width in pixels for text of `font_size`.
    pub fn resolve(&self, font_size: f32, brush_width_factor: f32) -> f32 {
        match *self {
            Self::Auto => (font_size * brush_width_factor).max(MIN_BRUSH_WIDTH),
            Self::Px(width) => width.max(0.0),
        }
    }
}

/// Colours and pen settings shared by all renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStyle {
    /// Glyph fill. `None` draws no fill at all.
    pub fill_color: Option<Srgb<u8>>,
    /// Colour of the visible outline and of the pen tip.
    pub stroke_color: Srgb<u8>,
    /// Resolved width of the mask strokes, in pixels.
    pub brush_width: f32,
    /// Width of the visible outline. Zero hides it.
    pub outline_width: f32,
    pub show_pen_tip: bool,
    pub pen_radius: f32,
}

pub const DEFAULT_INK: Srgb<u8> = Srgb::new(0x1f, 0x29, 0x37);

impl Default for RevealStyle {
    fn default() -> Self {
        Self {
            fill_color: Some(DEFAULT_INK),
            stroke_color: DEFAULT_INK,
            brush_width: StrokeWidth::Auto.resolve(86.0, 0.5),
            outline_width: 0.0,
            show_pen_tip: true,
            pen_radius: 2.2,
        }
    }
}

/// Revealed part of each contour: `(contour, fraction)` for every contour
/// with visible progress. A missing frame reveals nothing.
pub(crate) fn revealed_contours<'a>(
    contours: &'a [ContourPath],
    frame: Option<&'a RevealFrame>,
) -> impl Iterator<Item = (&'a ContourPath, f32)> + 'a {
    let progress: &[f32] = match frame {
        Some(frame) => &frame.progress,
        None => &[],
    };
    contours
        .iter()
        .zip(progress.iter().copied())
        .filter(|(_, p)| *p > 0.0)
        .map(|(contour, p)| (contour, p.min(1.0)))
}

/// Pen position to draw, if any.
pub(crate) fn pen_tip(frame: Option<&RevealFrame>, style: &RevealStyle) -> Option<Point> {
    if !style.show_pen_tip || style.pen_radius <= 0.0 {
        return None;
    }
    frame.and_then(|f| f.pen)
}

pub(crate) fn hex_color(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}
