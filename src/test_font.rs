//! Deterministic in-memory glyph source for unit tests.

use std::sync::Arc;

use crate::outline::{GlyphOutline, GlyphSource, OutlineCommand, Point};

pub(crate) const UNITS_PER_EM: f32 = 1000.0;
pub(crate) const UPPER_ADVANCE: f32 = 700.0;
pub(crate) const LOWER_ADVANCE: f32 = 500.0;
/// Measured fallback, in ems.
pub(crate) const FALLBACK_EM: f32 = 0.6;

/// Box-shaped glyphs with a handful of multi-contour and curved characters.
///
/// - `A`: outer triangle plus a counter (2 contours)
/// - `i`, `!`: stem plus dot (2 contours)
/// - `o`: quadratic ring, `c`: cubic arc
/// - `x`: outline without a native advance
/// - `\t`: mapped glyph with an empty outline
/// - anything outside ASCII letters/punctuation above is unmapped
pub(crate) struct StubFont;

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<OutlineCommand> {
    vec![
        OutlineCommand::MoveTo(Point::new(x0, y0)),
        OutlineCommand::LineTo(Point::new(x1, y0)),
        OutlineCommand::LineTo(Point::new(x1, y1)),
        OutlineCommand::LineTo(Point::new(x0, y1)),
        OutlineCommand::Close,
    ]
}

fn outline(commands: Vec<OutlineCommand>, advance: Option<f32>) -> Option<Arc<GlyphOutline>> {
    Some(Arc::new(GlyphOutline {
        commands,
        advance_width: advance,
    }))
}

impl GlyphSource for StubFont {
    fn units_per_em(&self) -> f32 {
        UNITS_PER_EM
    }

    fn glyph_outline(&self, ch: char) -> Option<Arc<GlyphOutline>> {
        match ch {
            'A' => {
                let commands = vec![
                    OutlineCommand::MoveTo(Point::new(0.0, 0.0)),
                    OutlineCommand::LineTo(Point::new(350.0, 700.0)),
                    OutlineCommand::LineTo(Point::new(700.0, 0.0)),
                    OutlineCommand::Close,
                    OutlineCommand::MoveTo(Point::new(250.0, 200.0)),
                    OutlineCommand::LineTo(Point::new(450.0, 200.0)),
                    OutlineCommand::LineTo(Point::new(350.0, 400.0)),
                    OutlineCommand::Close,
                ];
                outline(commands, Some(UPPER_ADVANCE))
            }
            'i' => {
                let mut commands = rect(200.0, 0.0, 300.0, 500.0);
                commands.extend(rect(200.0, 600.0, 300.0, 700.0));
                outline(commands, Some(LOWER_ADVANCE))
            }
            '!' => {
                let mut commands = rect(100.0, 200.0, 200.0, 700.0);
                commands.extend(rect(100.0, 0.0, 200.0, 100.0));
                outline(commands, Some(300.0))
            }
            'o' => {
                let commands = vec![
                    OutlineCommand::MoveTo(Point::new(250.0, 0.0)),
                    OutlineCommand::QuadTo {
                        ctrl: Point::new(450.0, 0.0),
                        to: Point::new(450.0, 250.0),
                    },
                    OutlineCommand::QuadTo {
                        ctrl: Point::new(450.0, 500.0),
                        to: Point::new(250.0, 500.0),
                    },
                    OutlineCommand::QuadTo {
                        ctrl: Point::new(50.0, 500.0),
                        to: Point::new(50.0, 250.0),
                    },
                    OutlineCommand::QuadTo {
                        ctrl: Point::new(50.0, 0.0),
                        to: Point::new(250.0, 0.0),
                    },
                    OutlineCommand::Close,
                ];
                outline(commands, Some(LOWER_ADVANCE))
            }
            'c' => {
                let commands = vec![
                    OutlineCommand::MoveTo(Point::new(450.0, 100.0)),
                    OutlineCommand::CubicTo {
                        ctrl1: Point::new(300.0, -50.0),
                        ctrl2: Point::new(50.0, 50.0),
                        to: Point::new(50.0, 250.0),
                    },
                    OutlineCommand::CubicTo {
                        ctrl1: Point::new(50.0, 450.0),
                        ctrl2: Point::new(300.0, 550.0),
                        to: Point::new(450.0, 400.0),
                    },
                ];
                outline(commands, Some(LOWER_ADVANCE))
            }
            'x' => outline(rect(50.0, 0.0, 450.0, 500.0), None),
            '.' => outline(rect(50.0, 0.0, 150.0, 100.0), Some(250.0)),
            '\t' => outline(Vec::new(), Some(300.0)),
            'A'..='Z' => outline(rect(50.0, 0.0, 650.0, 700.0), Some(UPPER_ADVANCE)),
            'a'..='z' => outline(rect(50.0, 0.0, 450.0, 500.0), Some(LOWER_ADVANCE)),
            _ => None,
        }
    }

    fn measured_advance(&self, _ch: char, font_size: f32) -> f32 {
        FALLBACK_EM * font_size
    }
}
