use palette::Srgb;
use tiny_skia::{
    FillRule, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use crate::{
    outline::{OutlineCommand, Point},
    renderer::{RevealStyle, pen_tip, revealed_contours},
    reveal::RevealFrame,
    text::{CompiledText, Viewport},
};

/// CPU renderer that rasterizes a reveal frame into an RGBA pixmap.
///
/// Glyph fills are drawn through a coverage mask built from the revealed
/// prefix of every contour, stroked with the brush width, so ink only appears
/// where the pen has already passed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CpuRenderer {
    scale: f32,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl CpuRenderer {
    /// Creates a renderer that maps one viewport unit to `scale` pixels.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self { scale }
    }

    /// Output pixels per viewport unit.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Pixel size of the output for `viewport`.
    pub fn image_size(&self, viewport: &Viewport) -> [u32; 2] {
        [
            (viewport.width() * self.scale).ceil().max(0.0) as u32,
            (viewport.height() * self.scale).ceil().max(0.0) as u32,
        ]
    }

    /// Renders `compiled` at the state described by `frame`.
    ///
    /// Without a frame nothing is revealed, but the pixmap still has the size
    /// of the viewport. Returns `None` when the viewport is empty.
    pub fn render(
        &self,
        compiled: &CompiledText,
        frame: Option<&RevealFrame>,
        style: &RevealStyle,
    ) -> Option<Pixmap> {
        let [width, height] = self.image_size(&compiled.viewport);
        let mut pixmap = Pixmap::new(width, height)?;

        if compiled.is_empty() {
            return Some(pixmap);
        }

        let transform = Transform::from_scale(self.scale, self.scale)
            .pre_translate(-compiled.viewport.min_x(), -compiled.viewport.min_y());
        let fully_revealed = frame.is_some_and(|f| f.fully_revealed);

        if let Some(fill_color) = style.fill_color {
            let paint = solid_paint(fill_color);
            if fully_revealed {
                for fill in &compiled.fills {
                    if let Some(path) = outline_path(&fill.commands) {
                        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                    }
                }
            } else {
                let mask = self.reveal_mask(compiled, frame, style, transform, [width, height])?;
                for fill in &compiled.fills {
                    if let Some(path) = outline_path(&fill.commands) {
                        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, Some(&mask));
                    }
                }
            }
        }

        if style.outline_width > 0.0 {
            let paint = solid_paint(style.stroke_color);
            let stroke = round_stroke(style.outline_width);
            if fully_revealed {
                for contour in &compiled.contours {
                    if let Some(path) = outline_path(&contour.commands) {
                        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                    }
                }
            } else {
                for (contour, progress) in revealed_contours(&compiled.contours, frame) {
                    let line = contour.polyline();
                    if let Some(path) = polyline_path(&line.prefix(progress * line.length())) {
                        pixmap.stroke_path(&path, &paint, &stroke, transform, None);
                    }
                }
            }
        }

        if let Some(pen) = pen_tip(frame, style) {
            if let Some(circle) = PathBuilder::from_circle(pen.x, pen.y, style.pen_radius) {
                let paint = solid_paint(style.stroke_color);
                pixmap.fill_path(&circle, &paint, FillRule::Winding, transform, None);
            }
        }

        Some(pixmap)
    }

    fn reveal_mask(
        &self,
        compiled: &CompiledText,
        frame: Option<&RevealFrame>,
        style: &RevealStyle,
        transform: Transform,
        [width, height]: [u32; 2],
    ) -> Option<Mask> {
        let mut mask = Mask::new(width, height)?;
        let brush = round_stroke(style.brush_width);

        for (contour, progress) in revealed_contours(&compiled.contours, frame) {
            let line = contour.polyline();
            let Some(prefix) = polyline_path(&line.prefix(progress * line.length())) else {
                continue;
            };
            // stroke in viewport space, resolution matched to the output scale
            if let Some(band) = prefix.stroke(&brush, self.scale) {
                mask.fill_path(&band, FillRule::Winding, true, transform);
            }
        }

        Some(mask)
    }
}

fn solid_paint(color: Srgb<u8>) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.red, color.green, color.blue, 255);
    paint.anti_alias = true;
    paint
}

fn round_stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    }
}

/// Converts outline commands into a tiny-skia path.
fn outline_path(commands: &[OutlineCommand]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for command in commands {
        match *command {
            OutlineCommand::MoveTo(p) => builder.move_to(p.x, p.y),
            OutlineCommand::LineTo(p) => builder.line_to(p.x, p.y),
            OutlineCommand::QuadTo { ctrl, to } => builder.quad_to(ctrl.x, ctrl.y, to.x, to.y),
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                builder.cubic_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y)
            }
            OutlineCommand::Close => builder.close(),
        }
    }
    builder.finish()
}

fn polyline_path(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut builder = PathBuilder::new();
    builder.move_to(first.x, first.y);
    for p in rest {
        builder.line_to(p.x, p.y);
    }
    builder.finish()
}
