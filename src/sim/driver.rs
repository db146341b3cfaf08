//! Simulation driver
//!
//! Owns the world, the pending events, the clock and the renderer, and
//! delivers due events one at a time to the active object each one targets.
//! A handler always runs to completion before the next event is popped.

use super::actor::{ActiveObject, Context};
use super::clock::{Clock, StepClock};
use super::event::{Event, EventId, EventKind, EventQueue, Key, ObjectId};
use super::painter::Painter;
use super::state::World;
use super::{Millis, SimTime};
use crate::error::SimResult;
use crate::renderer::Renderer;
use crate::settings::SimConfig;

pub struct Simulation<C: Clock, R: Renderer> {
    world: World,
    queue: EventQueue,
    clock: C,
    renderer: R,
    objects: Vec<Box<dyn ActiveObject>>,
    /// Receiver of keyboard input
    painter: Option<ObjectId>,
    dispatched: u64,
}

impl<C: Clock, R: Renderer> Simulation<C, R> {
    /// An empty simulation with no active objects
    pub fn new(world: World, clock: C, renderer: R) -> Self {
        Self {
            world,
            queue: EventQueue::new(),
            clock,
            renderer,
            objects: Vec::new(),
            painter: None,
            dispatched: 0,
        }
    }

    /// The standard setup: the configured world driven by one painter
    pub fn with_painter(config: &SimConfig, clock: C, renderer: R) -> SimResult<Self> {
        config.validate()?;
        let mut sim = Self::new(config.build_world(), clock, renderer);
        let id = sim.register(Box::new(Painter::new(config.paint_interval_ms)));
        sim.painter = Some(id);
        Ok(sim)
    }

    pub fn register(&mut self, object: Box<dyn ActiveObject>) -> ObjectId {
        let id = ObjectId(self.objects.len());
        log::debug!("registered {} as {}", object.name(), id);
        self.objects.push(object);
        id
    }

    /// Let every object arm its first event
    pub fn start(&mut self) -> SimResult<()> {
        let now = self.clock.now();
        for (i, object) in self.objects.iter_mut().enumerate() {
            let mut ctx = Context::new(
                &mut self.world,
                &mut self.renderer,
                &mut self.queue,
                now,
                ObjectId(i),
            );
            object.start(&mut ctx)?;
        }
        log::info!(
            "simulation started at t={}ms with {} bodies, {} walls, {} pending event(s)",
            now,
            self.world.bodies.len(),
            self.world.walls.len(),
            self.queue.len()
        );
        Ok(())
    }

    fn deliver(&mut self, event: Event) -> SimResult<()> {
        let Some(object) = self.objects.get_mut(event.target.0) else {
            log::warn!("dropping {} for unknown {}", event.kind.name(), event.target);
            return Ok(());
        };
        log::debug!(
            "t={}ms deliver {} to {} ({})",
            event.at,
            event.kind.name(),
            object.name(),
            object.state_name()
        );
        let mut ctx = Context::new(
            &mut self.world,
            &mut self.renderer,
            &mut self.queue,
            event.at,
            event.target,
        );
        object.handle(&event, &mut ctx)?;
        self.dispatched += 1;
        Ok(())
    }

    /// Deliver at most one due event; returns its kind
    pub fn step(&mut self) -> SimResult<Option<EventKind>> {
        match self.queue.pop_next_due(self.clock.now()) {
            Some(event) => {
                let kind = event.kind;
                self.deliver(event)?;
                Ok(Some(kind))
            }
            None => Ok(None),
        }
    }

    /// Deliver every event due now, including ones that become due while
    /// handling; returns how many were delivered
    pub fn dispatch_due(&mut self) -> SimResult<usize> {
        let mut count = 0;
        while self.step()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Queue a key press for the painter, due immediately
    pub fn post_key(&mut self, key: Key) -> Option<EventId> {
        let target = self.painter?;
        Some(
            self.queue
                .schedule(target, self.clock.now(), EventKind::InputKey(key)),
        )
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn painter_id(&self) -> Option<ObjectId> {
        self.painter
    }

    /// State of a registered object, for diagnostics
    pub fn object_state(&self, id: ObjectId) -> Option<&'static str> {
        self.objects.get(id.0).map(|o| o.state_name())
    }

    /// Events delivered so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl<R: Renderer> Simulation<StepClock, R> {
    /// Jump the virtual clock from event to event up to `horizon`, then
    /// leave it at `horizon`. Returns how many events were delivered.
    pub fn run_until(&mut self, horizon: SimTime) -> SimResult<usize> {
        let mut count = 0;
        while let Some(at) = self.queue.peek_time() {
            if at > horizon {
                break;
            }
            self.clock.advance_to(at);
            if self.step()?.is_some() {
                count += 1;
            }
        }
        self.clock.advance_to(horizon);
        Ok(count)
    }

    pub fn run_for(&mut self, duration: Millis) -> SimResult<usize> {
        let horizon = self.clock.now().saturating_add(duration);
        self.run_until(horizon)
    }

    /// Move the clock without delivering anything. Events passed over stay
    /// queued and are delivered late by the next `step` or `dispatch_due`.
    pub fn advance_clock_to(&mut self, t: SimTime) {
        self.clock.advance_to(t);
    }

    /// Deliver the earliest pending event whatever its time
    pub fn step_next(&mut self) -> SimResult<Option<EventKind>> {
        let Some(at) = self.queue.peek_time() else {
            return Ok(None);
        };
        self.clock.advance_to(at);
        self.step()
    }
}
