//! Simulation clocks
//!
//! The driver asks a clock which events are due. `StepClock` is virtual and
//! only moves when told to, which keeps runs reproducible; the real-time
//! clock lives in `platform`.

use super::{Millis, SimTime};

/// Source of the current instant, in milliseconds since the simulation began
pub trait Clock {
    fn now(&self) -> SimTime;
}

/// Virtual clock advanced explicitly
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepClock {
    now: SimTime,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward to `t`. The clock never runs backwards.
    pub fn advance_to(&mut self, t: SimTime) {
        self.now = self.now.max(t);
    }

    pub fn advance_by(&mut self, dt: Millis) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for StepClock {
    fn now(&self) -> SimTime {
        self.now
    }
}
