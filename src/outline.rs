use std::sync::Arc;

use euclid::default::Point2D;

/// 2D point used by outlines and compiled paths.
pub type Point = Point2D<f32>;

/// One drawing command of a glyph outline.
///
/// A contour is the maximal run of commands between two `MoveTo` boundaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    CubicTo { ctrl1: Point, ctrl2: Point, to: Point },
    Close,
}

impl OutlineCommand {
    /// Point the pen rests on after this command. `Close` has no explicit endpoint.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            Self::MoveTo(p) | Self::LineTo(p) => Some(p),
            Self::QuadTo { to, .. } | Self::CubicTo { to, .. } => Some(to),
            Self::Close => None,
        }
    }

    /// Applies `f` to every point carried by the command.
    pub fn map_points(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            Self::MoveTo(p) => Self::MoveTo(f(p)),
            Self::LineTo(p) => Self::LineTo(f(p)),
            Self::QuadTo { ctrl, to } => Self::QuadTo {
                ctrl: f(ctrl),
                to: f(to),
            },
            Self::CubicTo { ctrl1, ctrl2, to } => Self::CubicTo {
                ctrl1: f(ctrl1),
                ctrl2: f(ctrl2),
                to: f(to),
            },
            Self::Close => Self::Close,
        }
    }
}

/// Outline of a single glyph in font units (Y axis up, origin on the baseline).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GlyphOutline {
    pub commands: Vec<OutlineCommand>,
    /// Advance width in font units, when the font provides one.
    pub advance_width: Option<f32>,
}

impl GlyphOutline {
    /// Whether the glyph draws nothing.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Anything that can hand out glyph outlines and advances for characters.
///
/// [`crate::font_handle::FontHandle`] is the production implementation. The
/// text compiler only talks to this trait so layout stays a pure function of
/// the source and the [`crate::text::LayoutSpec`].
pub trait GlyphSource {
    /// Font units per em, used to scale outlines to pixels.
    fn units_per_em(&self) -> f32;

    /// Outline for `ch`, or `None` when the font has no glyph mapped to it.
    fn glyph_outline(&self, ch: char) -> Option<Arc<GlyphOutline>>;

    /// Measured advance in pixels, used when the glyph has no native advance
    /// or is not mapped at all.
    fn measured_advance(&self, ch: char, font_size: f32) -> f32;
}

/// Collects `ttf-parser` outline callbacks into [`OutlineCommand`]s.
#[derive(Default)]
pub(crate) struct OutlineCollector {
    commands: Vec<OutlineCommand>,
}

impl OutlineCollector {
    pub(crate) fn finish(self) -> Vec<OutlineCommand> {
        self.commands
    }
}

impl ttf_parser::OutlineBuilder for OutlineCollector {
    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::MoveTo(Point::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(OutlineCommand::LineTo(Point::new(x, y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::QuadTo {
            ctrl: Point::new(x1, y1),
            to: Point::new(x, y),
        });
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.commands.push(OutlineCommand::CubicTo {
            ctrl1: Point::new(x1, y1),
            ctrl2: Point::new(x2, y2),
            to: Point::new(x, y),
        });
    }

    fn close(&mut self) {
        self.commands.push(OutlineCommand::Close);
    }
}
