//! Game clock: owns game time and the speed multiplier.
//!
//! Game time only moves forward. Real time is sampled by the host and
//! handed to `advance()`; the clock never reads the system clock itself,
//! except through `wall_clock_now()` which callers may use to get a sample.

use crate::{
    error::{SimError, SimResult},
    types::{GameTime, RealTime},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameClock {
    pub time:        GameTime,
    pub last_update: RealTime,
    speed:           f64,
}

impl GameClock {
    pub fn new(now: RealTime) -> Self {
        Self {
            time: 0.0,
            last_update: now,
            speed: 1.0,
        }
    }

    /// Advance game time to match the real-time sample `now`.
    /// Returns the game seconds that elapsed. A sample earlier than the
    /// previous one counts as zero elapsed time.
    pub fn advance(&mut self, now: RealTime) -> GameTime {
        let delta = (now - self.last_update).max(0.0);
        let elapsed = if delta.is_finite() { delta * self.speed } else { 0.0 };
        self.time += elapsed;
        if now.is_finite() && now > self.last_update {
            self.last_update = now;
        }
        elapsed
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Replace the speed multiplier. Takes effect on the next `advance()`.
    pub fn set_speed(&mut self, multiplier: f64) -> SimResult<()> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "speed multiplier must be > 0, got {multiplier}"
            )));
        }
        self.speed = multiplier;
        Ok(())
    }

    /// Restore from a save. The next `advance()` covers the gap since `last_update`.
    pub fn restore(&mut self, time: GameTime, last_update: RealTime) {
        self.time = time.max(0.0);
        self.last_update = last_update;
    }

    /// Move the real-time anchor to `now` without advancing game time.
    /// Used when the samples fed to `advance()` were synthetic and the next
    /// catch-up must start from a real wall-clock instant.
    pub fn rebase(&mut self, now: RealTime) {
        if now.is_finite() {
            self.last_update = now;
        }
    }
}

/// Sample the wall clock in fractional seconds since the Unix epoch.
pub fn wall_clock_now() -> RealTime {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_millis()) / 1000.0
}
