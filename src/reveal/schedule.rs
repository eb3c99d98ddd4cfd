/// Shortest time a single contour may take, in seconds.
///
/// Tiny or degenerate contours (dots, zero-length runs) are floored to this so
/// they stay visible instead of flashing.
pub const MIN_CONTOUR_DURATION: f32 = 0.06;

/// Reference pen speed of the speed-based pacing, in pixels per second at
/// speed factor 1.
pub const BASE_PIXELS_PER_SECOND: f32 = 600.0;

/// Smallest accepted speed factor; lower factors draw no faster.
pub const MIN_SPEED_FACTOR: f32 = 0.1;

/// Pen speed in pixels per second for a relative speed factor.
pub fn pixels_per_second_for_factor(speed: f32) -> f32 {
    let speed = if speed.is_finite() { speed } else { 1.0 };
    BASE_PIXELS_PER_SECOND / speed.max(MIN_SPEED_FACTOR)
}

/// How the reveal time is distributed across contours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pacing {
    /// A fixed total split proportionally to contour length.
    TotalDuration { seconds: f32 },
    /// Every contour is drawn at a constant pen speed.
    PenSpeed { pixels_per_second: f32 },
}

impl Default for Pacing {
    fn default() -> Self {
        Self::TotalDuration { seconds: 3.0 }
    }
}

impl Pacing {
    /// Pen-speed pacing from a relative speed factor.
    ///
    /// The factor scales the time per pixel: 1.0 draws at 600 px/s, 2.0 at
    /// half that speed and 0.5 at twice it.
    pub fn from_speed_factor(speed: f32) -> Self {
        Self::PenSpeed {
            pixels_per_second: pixels_per_second_for_factor(speed),
        }
    }
}

/// When one contour starts and how long it takes, in seconds from the start
/// of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContourTiming {
    pub delay: f32,
    pub duration: f32,
}

impl ContourTiming {
    /// Time at which the contour is fully drawn.
    pub fn end(&self) -> f32 {
        self.delay + self.duration
    }
}

/// Per-contour timings of one reveal run, in traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RevealSchedule {
    timings: Vec<ContourTiming>,
    start_delay: f32,
}

impl RevealSchedule {
    /// Computes `(delay, duration)` for every contour.
    ///
    /// Contours play back to back, so each delay is the start delay plus the
    /// durations of all earlier contours. Durations are never below
    /// [`MIN_CONTOUR_DURATION`], except when the total is too short to give
    /// every contour the minimum; then the total is split evenly.
    pub fn allocate(lengths: &[f32], pacing: Pacing, start_delay: f32) -> Self {
        let start_delay = if start_delay.is_finite() {
            start_delay.max(0.0)
        } else {
            0.0
        };
        let lengths: Vec<f32> = lengths
            .iter()
            .map(|&l| if l.is_finite() { l.max(0.0) } else { 0.0 })
            .collect();

        let durations = match pacing {
            Pacing::TotalDuration { seconds } => proportional_durations(&lengths, seconds),
            Pacing::PenSpeed { pixels_per_second } => {
                if pixels_per_second.is_finite() && pixels_per_second > 0.0 {
                    lengths
                        .iter()
                        .map(|l| (l / pixels_per_second).max(MIN_CONTOUR_DURATION))
                        .collect()
                } else {
                    vec![MIN_CONTOUR_DURATION; lengths.len()]
                }
            }
        };

        let mut cursor = start_delay;
        let timings = durations
            .into_iter()
            .map(|duration| {
                let timing = ContourTiming {
                    delay: cursor,
                    duration,
                };
                cursor += duration;
                timing
            })
            .collect();

        Self {
            timings,
            start_delay,
        }
    }

    /// Timings in contour order.
    pub fn timings(&self) -> &[ContourTiming] {
        &self.timings
    }

    /// Number of contours.
    pub fn len(&self) -> usize {
        self.timings.len()
    }

    /// Whether there are no contours.
    pub fn is_empty(&self) -> bool {
        self.timings.is_empty()
    }

    /// Seconds before the first contour starts.
    pub fn start_delay(&self) -> f32 {
        self.start_delay
    }

    /// Sum of all contour durations.
    pub fn total_duration(&self) -> f32 {
        self.timings.iter().map(|t| t.duration).sum()
    }

    /// Time at which the last contour finishes, including the start delay.
    pub fn end_time(&self) -> f32 {
        self.timings
            .last()
            .map_or(self.start_delay, ContourTiming::end)
    }
}

/// Splits `total` across contours proportionally to their length, raising
/// short contours to the minimum and taking the difference from the rest.
fn proportional_durations(lengths: &[f32], total: f32) -> Vec<f32> {
    let n = lengths.len();
    if n == 0 {
        return Vec::new();
    }

    let total = if total.is_finite() && total > 0.0 {
        total
    } else {
        n as f32 * MIN_CONTOUR_DURATION
    };
    if n as f32 * MIN_CONTOUR_DURATION >= total {
        return vec![total / n as f32; n];
    }

    let mut floored = vec![false; n];
    loop {
        let free_count = floored.iter().filter(|f| !**f).count();
        let floored_count = n - free_count;
        if free_count == 0 {
            return vec![MIN_CONTOUR_DURATION; n];
        }

        let budget = total - floored_count as f32 * MIN_CONTOUR_DURATION;
        let free_length: f32 = lengths
            .iter()
            .zip(&floored)
            .filter(|(_, f)| !**f)
            .map(|(l, _)| *l)
            .sum();

        let share = |length: f32| {
            if free_length > 0.0 {
                budget * length / free_length
            } else {
                budget / free_count as f32
            }
        };

        let mut changed = false;
        for (i, &length) in lengths.iter().enumerate() {
            if !floored[i] && share(length) < MIN_CONTOUR_DURATION {
                floored[i] = true;
                changed = true;
            }
        }

        if !changed {
            return lengths
                .iter()
                .zip(&floored)
                .map(|(&length, &f)| if f { MIN_CONTOUR_DURATION } else { share(length) })
                .collect();
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn total(seconds: f32) -> Pacing {
        Pacing::TotalDuration { seconds }
    }

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn durations_sum_to_total_and_follow_length() {
        let schedule = RevealSchedule::allocate(&[100.0, 300.0, 600.0], total(2.0), 0.0);
        let durations: Vec<f32> = schedule.timings().iter().map(|t| t.duration).collect();

        assert_close(schedule.total_duration(), 2.0);
        assert_close(durations[0], 0.2);
        assert_close(durations[1], 0.6);
        assert_close(durations[2], 1.2);
    }

    #[test]
    fn contours_play_back_to_back() {
        let schedule = RevealSchedule::allocate(&[10.0, 0.0, 50.0, 5.0], total(3.0), 0.5);
        let timings = schedule.timings();

        assert_close(timings[0].delay, 0.5);
        for pair in timings.windows(2) {
            assert!(pair[1].delay >= pair[0].delay);
            assert_close(pair[1].delay, pair[0].end());
        }
        assert_close(schedule.end_time(), 3.5);
    }

    #[test]
    fn short_contours_are_floored() {
        let schedule = RevealSchedule::allocate(&[1.0, 0.0, 1000.0], total(1.0), 0.0);
        let timings = schedule.timings();

        assert_close(timings[0].duration, MIN_CONTOUR_DURATION);
        assert_close(timings[1].duration, MIN_CONTOUR_DURATION);
        assert_close(timings[2].duration, 1.0 - 2.0 * MIN_CONTOUR_DURATION);
        assert_close(schedule.total_duration(), 1.0);
    }

    #[test]
    fn flooring_cascades() {
        // After flooring the dot, the remaining budget pushes the medium
        // contour below the minimum as well.
        let schedule = RevealSchedule::allocate(&[0.0, 13.0, 87.0], total(0.5), 0.0);
        let durations: Vec<f32> = schedule.timings().iter().map(|t| t.duration).collect();

        assert!(durations.iter().all(|d| *d >= MIN_CONTOUR_DURATION - 1e-6));
        assert_close(schedule.total_duration(), 0.5);
        assert_close(durations[1], MIN_CONTOUR_DURATION);
        assert_close(durations[2], 0.5 - 2.0 * MIN_CONTOUR_DURATION);
    }

    #[test]
    fn zero_length_contours_split_evenly() {
        let schedule = RevealSchedule::allocate(&[0.0, 0.0, 0.0, 0.0], total(2.0), 0.0);
        for timing in schedule.timings() {
            assert_close(timing.duration, 0.5);
        }
    }

    #[test]
    fn too_short_total_splits_evenly() {
        let schedule = RevealSchedule::allocate(&[1.0, 100.0, 10.0], total(0.09), 0.0);
        for timing in schedule.timings() {
            assert_close(timing.duration, 0.03);
        }
        assert_close(schedule.total_duration(), 0.09);
    }

    #[test]
    fn invalid_inputs_never_yield_zero_durations() {
        let schedule = RevealSchedule::allocate(&[f32::NAN, -5.0], total(f32::NAN), f32::NAN);
        assert_eq!(schedule.start_delay(), 0.0);
        for timing in schedule.timings() {
            assert!(timing.duration > 0.0);
        }
    }

    #[test]
    fn pen_speed_pacing() {
        let pacing = Pacing::PenSpeed {
            pixels_per_second: 100.0,
        };
        let schedule = RevealSchedule::allocate(&[250.0, 1.0], pacing, 0.0);
        assert_close(schedule.timings()[0].duration, 2.5);
        assert_close(schedule.timings()[1].duration, MIN_CONTOUR_DURATION);
    }

    fn pixels_per_second(pacing: Pacing) -> f32 {
        match pacing {
            Pacing::PenSpeed { pixels_per_second } => pixels_per_second,
            other => panic!("expected pen speed, got {:?}", other),
        }
    }

    #[test]
    fn speed_factor_slows_the_pen() {
        assert_close(pixels_per_second(Pacing::from_speed_factor(1.0)), 600.0);
        assert_close(pixels_per_second(Pacing::from_speed_factor(2.0)), 300.0);
        assert_close(pixels_per_second(Pacing::from_speed_factor(0.5)), 1200.0);

        let fast = pixels_per_second(Pacing::from_speed_factor(0.7));
        assert!((fast - 857.142_8).abs() < 0.01, "{}", fast);
    }

    #[test]
    fn speed_factor_is_bounded() {
        let floor = pixels_per_second(Pacing::from_speed_factor(0.0));
        assert!((floor - 6000.0).abs() < 0.01, "{}", floor);
        assert_eq!(
            Pacing::from_speed_factor(-3.0),
            Pacing::from_speed_factor(MIN_SPEED_FACTOR)
        );
        assert_close(pixels_per_second(Pacing::from_speed_factor(f32::NAN)), 600.0);
    }

    #[test]
    fn empty_schedule() {
        let schedule = RevealSchedule::allocate(&[], total(3.0), 1.0);
        assert!(schedule.is_empty());
        assert_eq!(schedule.total_duration(), 0.0);
        assert_eq!(schedule.end_time(), 1.0);
    }
}
