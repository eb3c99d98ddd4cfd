use crate::outline::{OutlineCommand, Point};

/// Samples taken per curve segment when flattening.
pub const CURVE_SAMPLES: usize = 16;

/// Flattened contour with cumulative arc lengths, used for point-at-length
/// queries (pen tip) and partial stroke drawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    points: Vec<Point>,
    /// `cumulative[i]` is the distance from `points[0]` to `points[i]`.
    cumulative: Vec<f32>,
}

impl Polyline {
    /// Flattens a single contour.
    ///
    /// Curves are sampled at [`CURVE_SAMPLES`] evenly spaced parameters. A
    /// `Close` appends the contour start so the closing edge is part of the line.
    pub fn from_commands(commands: &[OutlineCommand]) -> Self {
        let mut polyline = Self::default();
        let mut start: Option<Point> = None;

        for command in commands {
            match *command {
                OutlineCommand::MoveTo(p) => {
                    start = Some(p);
                    polyline.push(p);
                }
                OutlineCommand::LineTo(to) => polyline.push(to),
                OutlineCommand::QuadTo { ctrl, to } => {
                    let from = polyline.last_or(to);
                    for k in 1..=CURVE_SAMPLES {
                        let t = k as f32 / CURVE_SAMPLES as f32;
                        polyline.push(quad_point(from, ctrl, to, t));
                    }
                }
                OutlineCommand::CubicTo { ctrl1, ctrl2, to } => {
                    let from = polyline.last_or(to);
                    for k in 1..=CURVE_SAMPLES {
                        let t = k as f32 / CURVE_SAMPLES as f32;
                        polyline.push(cubic_point(from, ctrl1, ctrl2, to, t));
                    }
                }
                OutlineCommand::Close => {
                    if let Some(start) = start {
                        polyline.push(start);
                    }
                }
            }
        }

        polyline
    }

    /// Sampled points, starting at the contour start.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total flattened length.
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at `distance` along the line, clamped to both ends.
    pub fn point_at_length(&self, distance: f32) -> Option<Point> {
        let first = *self.points.first()?;
        if !(distance > 0.0) {
            return Some(first);
        }
        if distance >= self.length() {
            return self.points.last().copied();
        }

        // first index whose cumulative length reaches `distance`
        let idx = self.cumulative.partition_point(|&d| d < distance);
        let (d0, d1) = (self.cumulative[idx - 1], self.cumulative[idx]);
        let span = d1 - d0;
        let t = if span > 0.0 { (distance - d0) / span } else { 0.0 };
        Some(self.points[idx - 1].lerp(self.points[idx], t))
    }

    /// Point at `fraction` (0..=1) of the total length.
    pub fn point_at_fraction(&self, fraction: f32) -> Option<Point> {
        self.point_at_length(fraction.clamp(0.0, 1.0) * self.length())
    }

    /// Vertices covering the first `distance` units, ending exactly at the
    /// interpolated point.
    pub fn prefix(&self, distance: f32) -> Vec<Point> {
        if self.points.is_empty() || !(distance > 0.0) {
            return Vec::new();
        }
        if distance >= self.length() {
            return self.points.clone();
        }

        let idx = self.cumulative.partition_point(|&d| d < distance);
        let mut out = self.points[..idx].to_vec();
        if let Some(end) = self.point_at_length(distance) {
            out.push(end);
        }
        out
    }

    fn push(&mut self, p: Point) {
        let distance = match self.points.last() {
            Some(last) => {
                let step = last.distance_to(p);
                self.length() + if step.is_finite() { step } else { 0.0 }
            }
            None => 0.0,
        };
        self.points.push(p);
        self.cumulative.push(distance);
    }

    fn last_or(&self, fallback: Point) -> Point {
        self.points.last().copied().unwrap_or(fallback)
    }
}

fn quad_point(p0: Point, c: Point, p1: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    (p0.to_vector() * (mt * mt) + c.to_vector() * (2.0 * mt * t) + p1.to_vector() * (t * t))
        .to_point()
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    (p0.to_vector() * (mt * mt * mt)
        + c1.to_vector() * (3.0 * mt * mt * t)
        + c2.to_vector() * (3.0 * mt * t * t)
        + p1.to_vector() * (t * t * t))
        .to_point()
}
