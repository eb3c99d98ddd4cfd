//! Reduced-motion preference of the host environment.

/// Environment variable consulted by [`EnvMotionQuery`].
pub const REDUCED_MOTION_ENV: &str = "FUDE_REDUCED_MOTION";

/// Source of the reduced-motion accessibility preference.
///
/// Queried once per restart of the reveal, never per frame.
pub trait MotionQuery: Send + Sync {
    fn prefers_reduced_motion(&self) -> bool;
}

/// Fixed preference.
impl MotionQuery for bool {
    fn prefers_reduced_motion(&self) -> bool {
        *self
    }
}

/// Reads the preference from an environment variable.
///
/// `1`, `true`, `yes`, `on` and `reduce` (case-insensitive) enable reduced
/// motion; anything else, or an unset variable, leaves animation on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvMotionQuery {
    variable: String,
}

impl Default for EnvMotionQuery {
    fn default() -> Self {
        Self::new(REDUCED_MOTION_ENV)
    }
}

impl EnvMotionQuery {
    /// Reads the preference from the environment variable `variable`.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
        }
    }
}

impl MotionQuery for EnvMotionQuery {
    fn prefers_reduced_motion(&self) -> bool {
        std::env::var(&self.variable).is_ok_and(|value| is_enabled(&value))
    }
}

fn is_enabled(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "reduce"
    )
}
