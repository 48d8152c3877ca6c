//! # Frame Clock
//!
//! Source of the per-frame delta. The runtime never reads wall-clock time
//! directly, so tests can drive it deterministically.

use std::time::Instant;

/// Supplies the elapsed seconds since the previous call.
pub trait Clock {
    /// Seconds since the previous call (or since construction).
    fn delta(&mut self) -> f32;
}

/// Monotonic wall clock.
#[derive(Debug)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    /// Starts measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self { last: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn delta(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        delta
    }
}

/// Clock that advances by a fixed amount per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualClock {
    step: f32,
    elapsed: f64,
}

impl ManualClock {
    /// Creates a clock returning `step` seconds per frame.
    #[must_use]
    pub const fn new(step: f32) -> Self {
        Self { step, elapsed: 0.0 }
    }

    /// Changes the per-frame step.
    pub fn set_step(&mut self, step: f32) {
        self.step = step;
    }

    /// Total seconds handed out so far.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

impl Clock for ManualClock {
    fn delta(&mut self) -> f32 {
        self.elapsed += f64::from(self.step);
        self.step
    }
}
