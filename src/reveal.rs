/// Reveal run state machine and cancellation.
pub mod animator;
/// Blocking per-frame driver.
pub mod frame_loop;
/// Per-contour delay/duration allocation.
pub mod schedule;

pub use animator::{
    CancelToken, RevealAnimator, RevealFrame, RevealOptions, RevealPhase, RevealRun, TickOutcome,
};
pub use frame_loop::FrameLoop;
pub use schedule::{ContourTiming, MIN_CONTOUR_DURATION, Pacing, RevealSchedule};
