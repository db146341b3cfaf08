//! Platform abstraction layer
//!
//! Handles the host-facing side of time:
//! - Real-time clock
//! - Background pump that dispatches due events

pub mod clock;
pub mod pump;

pub use clock::WallClock;
pub use pump::PumpHandle;
