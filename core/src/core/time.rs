//! Simulation clock
//!
//! The engine has no internal notion of time: callers pass `current_time`
//! into every public operation and the clock simply remembers the latest
//! value. Completion timestamps and deadline comparisons all read from here,
//! so within one call every decision sees the same instant.

use serde::{Deserialize, Serialize};

/// Clock driven entirely by caller-supplied timestamps.
///
/// # Example
/// ```
/// use block_sim_core_rs::SimClock;
///
/// let mut clock = SimClock::new(0.0);
/// assert_eq!(clock.now(), 0.0);
///
/// clock.advance_to(0.25);
/// assert_eq!(clock.now(), 0.25);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimClock {
    /// Simulation start time in seconds
    init_time: f64,
    /// Elapsed seconds reported by the most recent caller
    elapsed: f64,
}

impl SimClock {
    /// Create a clock starting at `init_time` seconds.
    pub fn new(init_time: f64) -> Self {
        Self {
            init_time,
            elapsed: 0.0,
        }
    }

    /// Record the elapsed time reported by the caller.
    pub fn advance_to(&mut self, elapsed: f64) {
        self.elapsed = elapsed;
    }

    /// Current simulation time: start time plus reported elapsed time.
    pub fn now(&self) -> f64 {
        self.init_time + self.elapsed
    }

    pub fn init_time(&self) -> f64 {
        self.init_time
    }
}
