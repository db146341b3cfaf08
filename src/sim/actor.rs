//! Active objects: entities whose state only changes when an event is
//! delivered to them
//!
//! A handler gets a `Context` for the duration of one delivery. Through it
//! the handler mutates the world, draws, and schedules its own future events.

use super::event::{Event, EventId, EventKind, EventQueue, ObjectId};
use super::state::World;
use super::{Millis, SimTime};
use crate::error::SimResult;
use crate::renderer::Renderer;

/// Everything a handler may touch while handling one event
pub struct Context<'a> {
    pub world: &'a mut World,
    pub renderer: &'a mut dyn Renderer,
    queue: &'a mut EventQueue,
    now: SimTime,
    me: ObjectId,
}

impl<'a> Context<'a> {
    pub fn new(
        world: &'a mut World,
        renderer: &'a mut dyn Renderer,
        queue: &'a mut EventQueue,
        now: SimTime,
        me: ObjectId,
    ) -> Self {
        Self {
            world,
            renderer,
            queue,
            now,
            me,
        }
    }

    /// Instant the handled event was scheduled for. New events are timed
    /// from here, not from the wall clock, so late delivery does not skew
    /// the physics.
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The object being delivered to
    pub fn me(&self) -> ObjectId {
        self.me
    }

    /// Schedule a one-off event for this object
    pub fn send_in(&mut self, delay: Millis, kind: EventKind) -> EventId {
        self.queue.schedule(self.me, self.now.saturating_add(delay), kind)
    }

    /// Schedule the next recurring event, replacing any that is still pending
    pub fn rearm(&mut self, delay: Millis, kind: EventKind) -> EventId {
        let dropped = self.queue.cancel_rearm(self.me);
        if dropped > 0 {
            log::debug!("{}: replaced {} pending event(s)", self.me, dropped);
        }
        self.queue.schedule(self.me, self.now.saturating_add(delay), kind)
    }
}

/// An entity driven by event delivery
pub trait ActiveObject: Send {
    fn name(&self) -> &'static str;

    /// Current state, for diagnostics
    fn state_name(&self) -> &'static str;

    /// Called once when the simulation starts
    fn start(&mut self, ctx: &mut Context<'_>) -> SimResult<()>;

    /// React to one delivered event
    fn handle(&mut self, event: &Event, ctx: &mut Context<'_>) -> SimResult<()>;
}
