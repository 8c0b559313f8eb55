//! Simulation clock — owns the tick counter and the run/stop flag.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub running:      bool,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            running: true,
        }
    }

    /// Advance one tick. Returns the new tick number.
    /// Panics if called after stop(); callers must check.
    pub fn advance(&mut self) -> Tick {
        assert!(self.running, "advance() called on stopped clock");
        self.current_tick += 1;
        self.current_tick
    }

    /// Quit is terminal; there is no resume.
    pub fn stop(&mut self) { self.running = false; }
}
