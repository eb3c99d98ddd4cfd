use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use crate::{
    outline::Point,
    path::{ContourPath, Polyline},
    text::CompiledText,
};

use super::schedule::{Pacing, RevealSchedule};

/// Shared stop flag of one reveal run.
///
/// Cloning yields a handle to the same flag; cancelling any clone stops the run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops every run holding this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) was called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Lifecycle of a reveal run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    /// Nothing to reveal.
    Idle,
    /// Timings computed, first tick not seen yet.
    Scheduled,
    Playing,
    /// Everything revealed; stays until the next restart.
    Done,
    Cancelled,
}

/// Result of advancing a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No contours, nothing to draw.
    Idle,
    /// The reveal is in progress; draw the new frame.
    Animating,
    /// The reveal has just finished. Reported once per run.
    Completed,
    /// The reveal finished on an earlier tick.
    Finished,
    /// The run was cancelled; the frame must not be drawn.
    Cancelled,
}

/// Visible state of a run at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealFrame {
    /// Revealed fraction (0..=1) of each contour, in contour order.
    pub progress: Vec<f32>,
    /// Pen-tip position, present only while a contour is being drawn.
    pub pen: Option<Point>,
    /// Contour currently being drawn.
    pub active: Option<usize>,
    /// The whole text is visible and no mask is needed.
    pub fully_revealed: bool,
}

impl RevealFrame {
    /// Nothing revealed yet.
    pub fn hidden(contours: usize) -> Self {
        Self {
            progress: vec![0.0; contours],
            pen: None,
            active: None,
            fully_revealed: false,
        }
    }

    /// End state: everything revealed, no pen.
    pub fn complete(contours: usize) -> Self {
        Self {
            progress: vec![1.0; contours],
            pen: None,
            active: None,
            fully_revealed: true,
        }
    }
}

/// Reveal-related settings of a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealOptions {
    pub pacing: Pacing,
    /// Seconds before the first contour starts.
    pub delay: f32,
    pub show_pen_tip: bool,
    /// Skip the animation and show the end state at once.
    pub reduced_motion: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            delay: 0.0,
            show_pen_tip: true,
            reduced_motion: false,
        }
    }
}

/// One playback of a compiled contour set.
///
/// Contours are revealed strictly one after another with linear pacing: the
/// next contour only starts advancing once the previous one has reached full
/// length. Time is measured from the first [`tick`](Self::tick).
#[derive(Debug)]
pub struct RevealRun {
    schedule: RevealSchedule,
    polylines: Vec<Polyline>,
    token: CancelToken,
    phase: RevealPhase,
    frame: RevealFrame,
    started_at: Option<Instant>,
    /// Index of the contour that is currently advancing.
    current: usize,
    show_pen_tip: bool,
    completion_pending: bool,
}

impl RevealRun {
    /// Schedules a run over `contours`; nothing moves before the first tick.
    pub fn new(contours: &[ContourPath], options: RevealOptions, token: CancelToken) -> Self {
        let count = contours.len();

        if count == 0 {
            return Self {
                schedule: RevealSchedule::default(),
                polylines: Vec::new(),
                token,
                phase: RevealPhase::Idle,
                frame: RevealFrame::hidden(0),
                started_at: None,
                current: 0,
                show_pen_tip: false,
                completion_pending: false,
            };
        }

        if options.reduced_motion {
            return Self {
                schedule: RevealSchedule::default(),
                polylines: Vec::new(),
                token,
                phase: RevealPhase::Done,
                frame: RevealFrame::complete(count),
                started_at: None,
                current: count,
                show_pen_tip: false,
                completion_pending: true,
            };
        }

        let lengths: Vec<f32> = contours.iter().map(|c| c.length).collect();
        let schedule = RevealSchedule::allocate(&lengths, options.pacing, options.delay);
        let polylines = if options.show_pen_tip {
            contours.iter().map(|c| c.polyline().clone()).collect()
        } else {
            Vec::new()
        };

        Self {
            schedule,
            polylines,
            token,
            phase: RevealPhase::Scheduled,
            frame: RevealFrame::hidden(count),
            started_at: None,
            current: 0,
            show_pen_tip: options.show_pen_tip,
            completion_pending: false,
        }
    }

    /// Current state.
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Reveal state of the latest tick.
    pub fn frame(&self) -> &RevealFrame {
        &self.frame
    }

    /// Timings of this run.
    pub fn schedule(&self) -> &RevealSchedule {
        &self.schedule
    }

    /// Stop flag of this run.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Stops this run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Advances the run to `now`.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let started_at = *self.started_at.get_or_insert(now);
        let elapsed = now.saturating_duration_since(started_at).as_secs_f32();
        self.advance_to(elapsed)
    }

    /// Advances the run to `elapsed` seconds after its start.
    ///
    /// Time only moves forward: a contour that has been completed stays
    /// completed even if an earlier time is passed later.
    pub fn advance_to(&mut self, elapsed: f32) -> TickOutcome {
        if self.check_cancelled() {
            return TickOutcome::Cancelled;
        }

        match self.phase {
            RevealPhase::Idle => return TickOutcome::Idle,
            RevealPhase::Cancelled => return TickOutcome::Cancelled,
            RevealPhase::Done => {
                return if std::mem::take(&mut self.completion_pending) {
                    TickOutcome::Completed
                } else {
                    TickOutcome::Finished
                };
            }
            RevealPhase::Scheduled => self.phase = RevealPhase::Playing,
            RevealPhase::Playing => {}
        }

        let count = self.schedule.len();
        while self.current < count && elapsed >= self.schedule.timings()[self.current].end() {
            self.frame.progress[self.current] = 1.0;
            self.current += 1;
            // stop between contours as well, not only at frame boundaries
            if self.check_cancelled() {
                return TickOutcome::Cancelled;
            }
        }

        if self.current >= count {
            self.phase = RevealPhase::Done;
            self.frame = RevealFrame::complete(count);
            return TickOutcome::Completed;
        }

        let timing = self.schedule.timings()[self.current];
        if elapsed < timing.delay {
            self.frame.active = None;
            self.frame.pen = None;
            return TickOutcome::Animating;
        }

        let progress = ((elapsed - timing.delay) / timing.duration).clamp(0.0, 1.0);
        self.frame.progress[self.current] = progress;
        self.frame.active = Some(self.current);
        self.frame.pen = if self.show_pen_tip {
            self.polylines
                .get(self.current)
                .and_then(|line| line.point_at_fraction(progress))
        } else {
            None
        };

        TickOutcome::Animating
    }

    fn check_cancelled(&mut self) -> bool {
        if self.phase == RevealPhase::Cancelled {
            return true;
        }
        if self.token.is_cancelled() {
            self.phase = RevealPhase::Cancelled;
            self.frame.pen = None;
            self.frame.active = None;
            self.completion_pending = false;
            return true;
        }
        false
    }
}

/// Owner of the current reveal run.
///
/// A restart always cancels the previous run before the new one is built, so
/// at most one run is live at a time.
#[derive(Debug, Default)]
pub struct RevealAnimator {
    run: Option<RevealRun>,
}

impl RevealAnimator {
    /// Creates an animator without a run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the current run and schedules a new one for `compiled`.
    ///
    /// Returns the stop flag of the new run.
    pub fn restart(&mut self, compiled: &CompiledText, options: RevealOptions) -> CancelToken {
        self.cancel();

        let token = CancelToken::new();
        let run = RevealRun::new(&compiled.contours, options, token.clone());
        log::debug!(
            "Reveal scheduled: {} contours over {:.3}s (reduced motion: {}).",
            compiled.contours.len(),
            run.schedule().end_time(),
            options.reduced_motion
        );
        self.run = Some(run);

        token
    }

    /// Stops the current run. The run stays in place in the `Cancelled` phase.
    pub fn cancel(&mut self) {
        if let Some(run) = self.run.as_mut() {
            if matches!(run.phase(), RevealPhase::Scheduled | RevealPhase::Playing) {
                log::debug!("Reveal cancelled.");
            }
            run.cancel();
            run.check_cancelled();
        }
    }

    /// Ticks the current run.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Idle;
        };

        let outcome = run.tick(now);
        if outcome == TickOutcome::Completed {
            log::debug!("Reveal completed.");
        }
        outcome
    }

    /// Phase of the current run, `Idle` without one.
    pub fn phase(&self) -> RevealPhase {
        self.run.as_ref().map_or(RevealPhase::Idle, RevealRun::phase)
    }

    /// Latest frame of the current run.
    pub fn frame(&self) -> Option<&RevealFrame> {
        self.run.as_ref().map(RevealRun::frame)
    }

    /// The current run, if any.
    pub fn run(&self) -> Option<&RevealRun> {
        self.run.as_ref()
    }

    /// Mutable access to the current run.
    pub fn run_mut(&mut self) -> Option<&mut RevealRun> {
        self.run.as_mut()
    }

    /// Stop flag of the current run.
    pub fn cancel_token(&self) -> Option<CancelToken> {
        self.run.as_ref().map(|run| run.token().clone())
    }
}
