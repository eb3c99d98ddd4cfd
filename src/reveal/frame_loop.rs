use std::{
    thread,
    time::{Duration, Instant},
};

use super::animator::{RevealFrame, RevealRun, TickOutcome};

/// Drives a [`RevealRun`] on the calling thread at a fixed refresh rate.
///
/// Each iteration ticks the run and hands the new frame to a callback. The
/// loop exits when the run completes, has nothing to draw, or is cancelled;
/// once cancellation is observed the callback is not invoked again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameLoop {
    interval: Duration,
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::with_fps(60)
    }
}

impl FrameLoop {
    /// Ticks `fps` times per second.
    pub fn with_fps(fps: u32) -> Self {
        Self::with_interval(Duration::from_secs(1) / fps.max(1))
    }

    /// Ticks once per `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Time between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs until the reveal ends. Returns the final outcome: `Completed`,
    /// `Finished`, `Idle` or `Cancelled`.
    pub fn run<F>(&self, run: &mut RevealRun, mut on_frame: F) -> TickOutcome
    where
        F: FnMut(&RevealFrame, TickOutcome),
    {
        loop {
            let frame_start = Instant::now();
            let outcome = run.tick(frame_start);

            match outcome {
                TickOutcome::Cancelled | TickOutcome::Idle => return outcome,
                TickOutcome::Completed | TickOutcome::Finished => {
                    on_frame(run.frame(), outcome);
                    return outcome;
                }
                TickOutcome::Animating => on_frame(run.frame(), outcome),
            }

            // checked again so a cancel issued by the callback never waits a frame
            if run.token().is_cancelled() {
                return run.tick(Instant::now());
            }

            let spent = frame_start.elapsed();
            if let Some(remaining) = self.interval.checked_sub(spent) {
                thread::sleep(remaining);
            }
        }
    }
}
