//! # Fixed Timestep
//!
//! Accumulates frame deltas and reports how many fixed updates are due.
//!
//! ## Design
//!
//! - Each frame adds its delta to the accumulator
//! - Every whole step in the accumulator is one fixed update
//! - At most `max_steps` run per frame; a larger backlog is dropped so a long
//!   stall cannot snowball into ever longer frames

use tracing::warn;

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// Seconds per fixed update.
    step: f32,
    /// Cap on updates per frame.
    max_steps: u32,
    /// Unconsumed time.
    accumulator: f32,
    /// Fixed updates handed out.
    total_steps: u64,
    /// Steps discarded by the per-frame cap.
    dropped_steps: u64,
}

impl FixedTimestep {
    /// Creates an accumulator running `updates_per_second` fixed updates.
    #[must_use]
    pub fn new(updates_per_second: f32, max_steps: u32) -> Self {
        Self {
            step: 1.0 / updates_per_second,
            max_steps,
            accumulator: 0.0,
            total_steps: 0,
            dropped_steps: 0,
        }
    }

    /// Adds a frame delta and returns the number of fixed updates to run.
    pub fn advance(&mut self, delta: f32) -> u32 {
        if delta.is_finite() && delta > 0.0 {
            self.accumulator += delta;
        }

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_steps {
            self.accumulator -= self.step;
            steps += 1;
        }

        if self.accumulator >= self.step {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let dropped = (self.accumulator / self.step) as u64;
            self.accumulator %= self.step;
            self.dropped_steps += dropped;
            warn!(dropped, max_steps = self.max_steps, "fixed update backlog dropped");
        }

        self.total_steps += u64::from(steps);
        steps
    }

    /// Seconds per fixed update.
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Time carried over to the next frame.
    #[must_use]
    pub const fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Fixed updates handed out so far.
    #[must_use]
    pub const fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Steps discarded by the per-frame cap.
    #[must_use]
    pub const fn dropped_steps(&self) -> u64 {
        self.dropped_steps
    }
}
