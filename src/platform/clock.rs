//! Real-time clock

use std::time::Instant;

use crate::sim::{Clock, SimTime};

/// Milliseconds elapsed since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now(&self) -> SimTime {
        self.start.elapsed().as_millis() as SimTime
    }
}
