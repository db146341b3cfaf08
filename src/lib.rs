//! Bounce Box - a discrete-event ball simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, collision prediction, events, painter)
//! - `renderer`: Draw capability the simulation paints through
//! - `platform`: Clocks and the background scheduling pump
//! - `settings`: Scene configuration (walls, balls, paint interval)

pub mod error;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::SimConfig;

/// Simulation configuration constants
pub mod consts {
    use std::f64::consts::PI;

    /// Default interval between paint ticks (milliseconds)
    pub const DEFAULT_PAINT_INTERVAL_MS: u64 = 50;

    /// Default box: left/top corner and size
    pub const BOX_LEFT: f64 = 100.0;
    pub const BOX_TOP: f64 = 100.0;
    pub const BOX_WIDTH: f64 = 200.0;
    pub const BOX_HEIGHT: f64 = 200.0;

    /// Shooter defaults
    pub const SHOOTER_LENGTH: f64 = 10.0;
    pub const SHOOTER_WIDTH: f64 = 10.0;
    /// Angle the shooter turns per key press (radians)
    pub const SHOOTER_TURN: f64 = PI / 6.0;

    /// Pump sleep between dispatch passes (milliseconds)
    pub const PUMP_QUANTUM_MS: u64 = 10;

    /// Below this magnitude a denominator is treated as zero
    pub const EPSILON: f64 = 1e-12;
}
