//! Simulation clock
//!
//! Game time in seconds since play began. Stops while paused and scales
//! with time dilation, so every deadline measured against it (instigator
//! timestamps, threshold regeneration) follows the game rather than the wall.

use crate::core::types::SimTime;

/// Lower and upper bounds for time dilation
pub const MIN_DILATION: f64 = 0.0;
pub const MAX_DILATION: f64 = 20.0;

/// Pausable, dilatable simulation clock
#[derive(Debug, Clone)]
pub struct SimClock {
    now: SimTime,
    dilation: f64,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            now: 0.0,
            dilation: 1.0,
            paused: false,
        }
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn dilation(&self) -> f64 {
        self.dilation
    }

    /// Set time dilation (clamped to [MIN_DILATION, MAX_DILATION])
    pub fn set_dilation(&mut self, dilation: f64) {
        self.dilation = dilation.clamp(MIN_DILATION, MAX_DILATION);
    }

    /// Advance by a real-time delta and return the new simulation time
    ///
    /// Negative deltas are ignored; the clock never runs backwards.
    pub fn advance(&mut self, real_dt: f64) -> SimTime {
        if !self.paused && real_dt > 0.0 {
            self.now += real_dt * self.dilation;
        }
        self.now
    }
}
