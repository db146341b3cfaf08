//! Deterministic simulation module
//!
//! All simulation logic lives here. This module is pure and deterministic:
//! - Time only moves through a `Clock`
//! - Stable iteration order (by body/wall index, then insertion order)
//! - No windowing or platform dependencies

pub mod actor;
pub mod clock;
pub mod collision;
pub mod driver;
pub mod event;
pub mod geometry;
pub mod painter;
pub mod state;

/// A duration in whole milliseconds
pub type Millis = u64;

/// An instant, in milliseconds since the simulation started
pub type SimTime = u64;

pub use actor::{ActiveObject, Context};
pub use clock::{Clock, StepClock};
pub use collision::{
    CollisionRef, Prediction, compute_all_collisions, next_collision, predict_body_collision,
    predict_segment_collision, predict_wall_collision,
};
pub use driver::Simulation;
pub use event::{Event, EventId, EventKind, EventQueue, Key, ObjectId};
pub use geometry::{Line, Point, Vector};
pub use painter::{Painter, PainterState};
pub use state::{Body, BodyId, BodyResponse, Shooter, Wall, WallExtent, WallId, World};
