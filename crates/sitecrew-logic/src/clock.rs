//! Simulation time: fixed ticks scaled by a stepped speed ladder.
//!
//! The clock freezes on project completion. The finish time is latched so
//! the final report always shows the moment the last floor landed, and
//! speed/pause controls are refused once frozen.

use serde::{Deserialize, Serialize};

/// Selectable time multipliers, cycled in order.
pub const SPEED_OPTIONS: [f32; 9] = [0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0];

const DEFAULT_SPEED_INDEX: usize = 1; // 1.0×

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// Simulated seconds elapsed, accumulated at the scaled rate.
    pub elapsed: f64,
    speed_index: usize,
    pub paused: bool,
    pub complete: bool,
    /// Elapsed time at the moment of completion.
    pub finish_time: f64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            elapsed: 0.0,
            speed_index: DEFAULT_SPEED_INDEX,
            paused: false,
            complete: false,
            finish_time: 0.0,
        }
    }

    /// Current multiplier; pinned to zero once the project is complete.
    pub fn speed(&self) -> f32 {
        if self.complete {
            0.0
        } else {
            SPEED_OPTIONS[self.speed_index]
        }
    }

    /// Scale one tick of real time. Returns the simulated delta to feed the
    /// systems: zero while paused or after completion, so a frozen world
    /// cannot accrue progress.
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.paused || self.complete {
            return 0.0;
        }
        let scaled = dt * self.speed();
        self.elapsed += scaled as f64;
        scaled
    }

    /// Step to the next speed option, wrapping. Refused once complete.
    pub fn cycle_speed(&mut self) -> Option<f32> {
        if self.complete {
            return None;
        }
        self.speed_index = (self.speed_index + 1) % SPEED_OPTIONS.len();
        Some(self.speed())
    }

    /// Toggle pause. Refused once complete; returns the new paused flag.
    pub fn toggle_pause(&mut self) -> Option<bool> {
        if self.complete {
            return None;
        }
        self.paused = !self.paused;
        Some(self.paused)
    }

    /// Freeze the clock and latch the finish time. Idempotent.
    pub fn finish(&mut self) {
        if !self.complete {
            self.complete = true;
            self.finish_time = self.elapsed;
        }
    }

    /// The timestamp shown to observers: frozen at the finish once complete.
    pub fn display_time(&self) -> f64 {
        if self.complete {
            self.finish_time
        } else {
            self.elapsed
        }
    }
}

/// Render simulated seconds as `m:ss`.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
