/// Arc-length estimation for outline command runs.
pub mod length;
/// Flattened contours with point-at-length queries.
pub mod polyline;

use std::fmt::Write;

pub use length::estimate_length;
pub use polyline::Polyline;

use crate::outline::{OutlineCommand, Point};

/// One pen-down to pen-up stroke of a laid-out glyph.
///
/// Coordinates are in viewport space (Y axis down). Contours are stored in
/// reading order and must be animated in that order.
#[derive(Clone, Debug, PartialEq)]
pub struct ContourPath {
    pub commands: Vec<OutlineCommand>,
    /// Estimated arc length, see [`estimate_length`].
    pub length: f32,
    /// Index of the [`GlyphFillPath`] this contour belongs to.
    pub glyph: usize,
    /// Source line (0-based).
    pub line: usize,
    /// Flattened `commands`, built once.
    polyline: Polyline,
}

impl ContourPath {
    /// Builds a contour, estimating its length and flattening it.
    pub fn new(commands: Vec<OutlineCommand>, glyph: usize, line: usize) -> Self {
        let length = estimate_length(&commands);
        let polyline = Polyline::from_commands(&commands);
        Self {
            commands,
            length,
            glyph,
            line,
            polyline,
        }
    }

    /// SVG path data (`d` attribute).
    pub fn to_svg_data(&self) -> String {
        svg_path_data(&self.commands)
    }

    /// The contour flattened for partial drawing and pen positions.
    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    /// Where the pen touches down.
    pub fn start_point(&self) -> Option<Point> {
        self.commands.first().and_then(OutlineCommand::end_point)
    }
}

/// All contours of one glyph merged into a single closed path, used for the
/// solid fill once the glyph has been "written".
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphFillPath {
    pub ch: char,
    pub line: usize,
    pub commands: Vec<OutlineCommand>,
}

impl GlyphFillPath {
    /// SVG path data (`d` attribute).
    pub fn to_svg_data(&self) -> String {
        svg_path_data(&self.commands)
    }
}

/// Splits a glyph outline into contours.
///
/// A new contour begins at every `MoveTo` after the first. Runs that do not
/// draw anything (a lone `MoveTo`, optionally closed) are dropped.
pub fn split_contours(commands: &[OutlineCommand]) -> Vec<Vec<OutlineCommand>> {
    let mut contours = Vec::new();
    let mut current: Vec<OutlineCommand> = Vec::new();

    for command in commands {
        if matches!(command, OutlineCommand::MoveTo(_)) && !current.is_empty() {
            push_contour(&mut contours, std::mem::take(&mut current));
        }
        current.push(*command);
    }
    push_contour(&mut contours, current);

    contours
}

fn push_contour(contours: &mut Vec<Vec<OutlineCommand>>, contour: Vec<OutlineCommand>) {
    let draws = contour.iter().any(|c| {
        matches!(
            c,
            OutlineCommand::LineTo(_) | OutlineCommand::QuadTo { .. } | OutlineCommand::CubicTo { .. }
        )
    });
    if draws {
        contours.push(contour);
    }
}

/// Formats commands as SVG path data, e.g. `M 0 0 L 10 0 Q 15 5 10 10 Z`.
pub fn svg_path_data(commands: &[OutlineCommand]) -> String {
    let mut d = String::new();

    for command in commands {
        if !d.is_empty() {
            d.push(' ');
        }
        match *command {
            OutlineCommand::MoveTo(p) => {
                d.push('M');
                push_point(&mut d, p);
            }
            OutlineCommand::LineTo(p) => {
                d.push('L');
                push_point(&mut d, p);
            }
            OutlineCommand::QuadTo { ctrl, to } => {
                d.push('Q');
                push_point(&mut d, ctrl);
                push_point(&mut d, to);
            }
            OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                d.push('C');
                push_point(&mut d, ctrl1);
                push_point(&mut d, ctrl2);
                push_point(&mut d, to);
            }
            OutlineCommand::Close => d.push('Z'),
        }
    }

    d
}

fn push_point(d: &mut String, p: Point) {
    d.push(' ');
    push_number(d, p.x);
    d.push(' ');
    push_number(d, p.y);
}

/// Writes a number rounded to three decimals without trailing zeros.
pub(crate) fn push_number(out: &mut String, value: f32) {
    let rounded = (value * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let _ = write!(out, "{}", rounded);
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn splits_at_every_move_after_the_first() {
        let commands = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::LineTo(p(1.0, 0.0)),
            OutlineCommand::Close,
            OutlineCommand::MoveTo(p(5.0, 5.0)),
            OutlineCommand::QuadTo {
                ctrl: p(6.0, 6.0),
                to: p(7.0, 5.0),
            },
            OutlineCommand::Close,
        ];
        let contours = split_contours(&commands);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].len(), 3);
        assert_eq!(contours[1][0], OutlineCommand::MoveTo(p(5.0, 5.0)));
    }

    #[test]
    fn drops_contours_that_draw_nothing() {
        let commands = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::MoveTo(p(1.0, 1.0)),
            OutlineCommand::Close,
            OutlineCommand::MoveTo(p(2.0, 2.0)),
            OutlineCommand::LineTo(p(3.0, 3.0)),
        ];
        let contours = split_contours(&commands);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0][0], OutlineCommand::MoveTo(p(2.0, 2.0)));
        assert!(split_contours(&[]).is_empty());
    }

    #[test]
    fn formats_svg_path_data() {
        let commands = [
            OutlineCommand::MoveTo(p(0.0, -0.0001)),
            OutlineCommand::LineTo(p(10.5, 0.0)),
            OutlineCommand::QuadTo {
                ctrl: p(15.0, 5.0),
                to: p(10.0, 10.0),
            },
            OutlineCommand::CubicTo {
                ctrl1: p(8.0, 12.0),
                ctrl2: p(2.25, 12.0),
                to: p(1.0 / 3.0, 10.0),
            },
            OutlineCommand::Close,
        ];
        assert_eq!(
            svg_path_data(&commands),
            "M 0 0 L 10.5 0 Q 15 5 10 10 C 8 12 2.25 12 0.333 10 Z"
        );
    }

    #[test]
    fn contour_carries_estimated_length() {
        let contour = ContourPath::new(
            vec![
                OutlineCommand::MoveTo(p(0.0, 0.0)),
                OutlineCommand::LineTo(p(0.0, 20.0)),
            ],
            3,
            1,
        );
        assert!((contour.length - 20.0).abs() < 1e-5);
        assert_eq!(contour.glyph, 3);
        assert_eq!(contour.start_point(), Some(p(0.0, 0.0)));
        assert_eq!(contour.to_svg_data(), "M 0 0 L 0 20");
    }

    #[test]
    fn contour_keeps_its_flattened_line() {
        let contour = ContourPath::new(
            vec![
                OutlineCommand::MoveTo(p(0.0, 0.0)),
                OutlineCommand::LineTo(p(10.0, 0.0)),
                OutlineCommand::LineTo(p(10.0, 5.0)),
            ],
            0,
            0,
        );
        assert!(std::ptr::eq(contour.polyline(), contour.polyline()));
        assert_eq!(contour.polyline().points().len(), 3);
        assert!((contour.polyline().length() - 15.0).abs() < 1e-5);
        assert_eq!(
            *contour.polyline(),
            Polyline::from_commands(&contour.commands)
        );
    }
}
