use crate::outline::{OutlineCommand, Point};

/// Chord-length multiplier for quadratic segments.
pub const QUAD_BOW: f32 = 1.15;
/// Chord-length multiplier for cubic segments.
pub const CUBIC_BOW: f32 = 1.3;

/// Estimates the arc length of a command run.
///
/// Sums straight-line distances between command endpoints and inflates curve
/// chords by [`QUAD_BOW`] / [`CUBIC_BOW`]. `Close` adds the distance back to the
/// subpath start. The result only drives timing proportions, so it is never
/// exact; it is always finite and non-negative.
pub fn estimate_length(commands: &[OutlineCommand]) -> f32 {
    let mut total = 0.0f32;
    let mut start: Option<Point> = None;
    let mut current: Option<Point> = None;

    for command in commands {
        match *command {
            OutlineCommand::MoveTo(p) => {
                start = Some(p);
                current = Some(p);
            }
            OutlineCommand::LineTo(to) => {
                total += chord(&mut start, current, to);
                current = Some(to);
            }
            OutlineCommand::QuadTo { to, .. } => {
                total += chord(&mut start, current, to) * QUAD_BOW;
                current = Some(to);
            }
            OutlineCommand::CubicTo { to, .. } => {
                total += chord(&mut start, current, to) * CUBIC_BOW;
                current = Some(to);
            }
            OutlineCommand::Close => {
                if let (Some(from), Some(to)) = (current, start) {
                    total += from.distance_to(to);
                }
                current = start;
            }
        }
    }

    if total.is_finite() { total.max(0.0) } else { 0.0 }
}

/// Distance from the current point to `to`. A drawing command without a
/// preceding `MoveTo` starts the subpath at its own endpoint.
fn chord(start: &mut Option<Point>, current: Option<Point>, to: Point) -> f32 {
    match current {
        Some(from) => from.distance_to(to),
        None => {
            *start = Some(to);
            0.0
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn straight_lines_are_exact() {
        let commands = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::LineTo(p(3.0, 4.0)),
            OutlineCommand::LineTo(p(3.0, 10.0)),
        ];
        assert!((estimate_length(&commands) - 11.0).abs() < 1e-5);
    }

    #[test]
    fn close_returns_to_start() {
        let commands = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::LineTo(p(10.0, 0.0)),
            OutlineCommand::LineTo(p(10.0, 10.0)),
            OutlineCommand::LineTo(p(0.0, 10.0)),
            OutlineCommand::Close,
        ];
        assert!((estimate_length(&commands) - 40.0).abs() < 1e-5);
    }

    #[test]
    fn curves_are_inflated() {
        let quad = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::QuadTo {
                ctrl: p(5.0, 5.0),
                to: p(10.0, 0.0),
            },
        ];
        let cubic = [
            OutlineCommand::MoveTo(p(0.0, 0.0)),
            OutlineCommand::CubicTo {
                ctrl1: p(3.0, 5.0),
                ctrl2: p(7.0, 5.0),
                to: p(10.0, 0.0),
            },
        ];
        assert!((estimate_length(&quad) - 10.0 * QUAD_BOW).abs() < 1e-4);
        assert!((estimate_length(&cubic) - 10.0 * CUBIC_BOW).abs() < 1e-4);
        assert!(CUBIC_BOW > QUAD_BOW && QUAD_BOW > 1.0);
    }

    #[test]
    fn degenerate_input_is_zero() {
        assert_eq!(estimate_length(&[]), 0.0);
        assert_eq!(estimate_length(&[OutlineCommand::MoveTo(p(1.0, 1.0))]), 0.0);
        assert_eq!(
            estimate_length(&[
                OutlineCommand::MoveTo(p(1.0, 1.0)),
                OutlineCommand::LineTo(p(1.0, 1.0)),
                OutlineCommand::Close,
            ]),
            0.0
        );
        assert_eq!(
            estimate_length(&[
                OutlineCommand::MoveTo(p(0.0, 0.0)),
                OutlineCommand::LineTo(p(f32::NAN, 0.0)),
            ]),
            0.0
        );
    }
}
