//! Error types
//!
//! Geometry and collision prediction never fail: degenerate inputs simply
//! predict no collision. Only driver-level problems surface here.

use thiserror::Error;

use crate::sim::{ObjectId, SimTime};

#[derive(Error, Debug)]
pub enum SimError {
    #[error("{object} cannot compute a next event at t={at}ms")]
    NoFutureEventComputable { object: ObjectId, at: SimTime },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Simulation lock poisoned by a panicking handler")]
    PumpPoisoned,
}

pub type SimResult<T> = Result<T, SimError>;
