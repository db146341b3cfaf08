//! The painter: the active object that keeps the simulation moving
//!
//! Every handled collision or paint tick advances all bodies by the
//! simulated time carried in the event, applies the collision response, and
//! arms exactly one follow-up event: the next predicted collision if it comes
//! strictly before the next paint, otherwise the paint itself.

use super::actor::{ActiveObject, Context};
use super::collision::{self, CollisionRef};
use super::event::{Event, EventKind, Key};
use super::state::BodyId;
use super::{Millis, SimTime};
use crate::error::{SimError, SimResult};

/// Painter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PainterState {
    /// Not started, or stalled after failing to arm
    Idle,
    /// The pending event is a collision
    AwaitingCollision,
    /// The pending event is a paint tick
    AwaitingPaint,
}

impl PainterState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PainterState::Idle => "idle",
            PainterState::AwaitingCollision => "awaiting-collision",
            PainterState::AwaitingPaint => "awaiting-paint",
        }
    }
}

/// Which handler a delivered event maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reaction {
    Collide,
    Paint,
    Turn,
}

/// Transition table. Unlisted pairs are ignored: an event that is not the
/// one the painter is waiting for is stale.
fn reaction(state: PainterState, kind: &EventKind) -> Option<Reaction> {
    use PainterState::*;
    match (state, kind) {
        (_, EventKind::InputKey(_)) => Some(Reaction::Turn),
        (AwaitingCollision, EventKind::WallCollision { .. })
        | (AwaitingCollision, EventKind::BodyCollision { .. }) => Some(Reaction::Collide),
        (AwaitingPaint, EventKind::PaintTick { .. }) => Some(Reaction::Paint),
        (Idle, _) | (AwaitingCollision, EventKind::PaintTick { .. }) => None,
        (AwaitingPaint, EventKind::WallCollision { .. })
        | (AwaitingPaint, EventKind::BodyCollision { .. }) => None,
    }
}

#[derive(Debug, Clone)]
pub struct Painter {
    state: PainterState,
    /// `None` runs headless: no paint ticks at all
    paint_interval: Option<Millis>,
    time_to_next_paint: Millis,
    /// Collisions handled at `handled_at`. None of them is predicted again
    /// until time moves on, unless one of its bodies changed velocity since.
    handled: Vec<CollisionRef>,
    handled_at: SimTime,
    frames: u64,
    collisions: u64,
}

impl Painter {
    pub fn new(paint_interval: Option<Millis>) -> Self {
        Self {
            state: PainterState::Idle,
            paint_interval,
            time_to_next_paint: paint_interval.unwrap_or(0),
            handled: Vec::new(),
            handled_at: 0,
            frames: 0,
            collisions: 0,
        }
    }

    pub fn state(&self) -> PainterState {
        self.state
    }

    pub fn time_to_next_paint(&self) -> Millis {
        self.time_to_next_paint
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    /// Predict and schedule the single next event
    fn arm_next(&mut self, ctx: &mut Context<'_>) -> SimResult<()> {
        let next = collision::next_collision(ctx.world, &self.handled);
        log::trace!("{}: next collision {:?}", ctx.me(), next);

        match (next, self.paint_interval) {
            (Some(p), Some(_)) if p.delay < self.time_to_next_paint => {
                self.time_to_next_paint -= p.delay;
                ctx.rearm(p.delay, collision_event(p.collision, p.delay));
                self.state = PainterState::AwaitingCollision;
            }
            (Some(p), None) => {
                ctx.rearm(p.delay, collision_event(p.collision, p.delay));
                self.state = PainterState::AwaitingCollision;
            }
            (_, Some(_)) => {
                let delay = self.time_to_next_paint;
                ctx.rearm(delay, EventKind::PaintTick { elapsed: delay });
                self.state = PainterState::AwaitingPaint;
            }
            (None, None) => {
                self.state = PainterState::Idle;
                return Err(SimError::NoFutureEventComputable {
                    object: ctx.me(),
                    at: ctx.now(),
                });
            }
        }
        Ok(())
    }

    fn on_collision(&mut self, kind: &EventKind, ctx: &mut Context<'_>) -> SimResult<()> {
        let (collision, elapsed) = match *kind {
            EventKind::WallCollision {
                body,
                wall,
                elapsed,
            } => (CollisionRef::Wall { body, wall }, elapsed),
            EventKind::BodyCollision { a, b, elapsed } => (CollisionRef::bodies(a, b), elapsed),
            _ => return Ok(()),
        };

        if ctx.now() != self.handled_at {
            self.handled.clear();
            self.handled_at = ctx.now();
        }

        ctx.world.advance_all(elapsed);
        let involved: [BodyId; 2] = match collision {
            CollisionRef::Wall { body, .. } => [body, body],
            CollisionRef::Bodies { a, b } => [a, b],
        };
        let before = involved.map(|id| ctx.world.body(id).map(|b| b.velocity));
        let applied = match collision {
            CollisionRef::Wall { body, wall } => ctx.world.reflect(body, wall),
            CollisionRef::Bodies { a, b } => ctx.world.resolve_bodies(a, b),
        };
        if !applied {
            log::warn!("{}: collision {:?} refers to a missing body or wall", ctx.me(), collision);
        }

        // A body with a new velocity has fresh predictions
        for (id, old) in involved.into_iter().zip(before) {
            if ctx.world.body(id).map(|b| b.velocity) != old {
                self.handled.retain(|c| !c.involves(id));
            }
        }
        self.handled.push(collision);
        self.collisions += 1;
        self.arm_next(ctx)
    }

    fn on_paint(&mut self, elapsed: Millis, ctx: &mut Context<'_>) -> SimResult<()> {
        if let Some(interval) = self.paint_interval {
            self.time_to_next_paint = interval;
        }

        ctx.renderer.clear();
        ctx.world.advance_all(elapsed);
        for wall in &ctx.world.walls {
            let l = wall.line;
            ctx.renderer.draw_line(l.begin.x, l.begin.y, l.end.x, l.end.y);
        }
        for body in &ctx.world.bodies {
            ctx.renderer
                .draw_circle(body.position.x, body.position.y, body.radius);
        }
        let outline = ctx.world.shooter.outline();
        for i in 0..outline.len() {
            let (p, q) = (outline[i], outline[(i + 1) % outline.len()]);
            ctx.renderer.draw_line(p.x, p.y, q.x, q.y);
        }
        ctx.renderer.present();
        self.frames += 1;

        self.handled.clear();
        self.handled_at = ctx.now();
        self.arm_next(ctx)
    }

    fn on_key(&mut self, key: Key, ctx: &mut Context<'_>) {
        match key {
            Key::Left => ctx.world.shooter.turn_left(),
            Key::Right => ctx.world.shooter.turn_right(),
        }
        log::debug!("shooter angle {:.3}", ctx.world.shooter.angle);
    }
}

fn collision_event(collision: CollisionRef, elapsed: Millis) -> EventKind {
    match collision {
        CollisionRef::Wall { body, wall } => EventKind::WallCollision {
            body,
            wall,
            elapsed,
        },
        CollisionRef::Bodies { a, b } => EventKind::BodyCollision { a, b, elapsed },
    }
}

impl ActiveObject for Painter {
    fn name(&self) -> &'static str {
        "painter"
    }

    fn state_name(&self) -> &'static str {
        self.state.as_str()
    }

    fn start(&mut self, ctx: &mut Context<'_>) -> SimResult<()> {
        self.time_to_next_paint = self.paint_interval.unwrap_or(0);
        self.handled.clear();
        self.handled_at = ctx.now();
        self.arm_next(ctx)
    }

    fn handle(&mut self, event: &Event, ctx: &mut Context<'_>) -> SimResult<()> {
        let Some(reaction) = reaction(self.state, &event.kind) else {
            log::trace!(
                "{}: ignoring {} in state {}",
                ctx.me(),
                event.kind.name(),
                self.state.as_str()
            );
            return Ok(());
        };

        match (reaction, event.kind) {
            (Reaction::Collide, kind) => self.on_collision(&kind, ctx),
            (Reaction::Paint, EventKind::PaintTick { elapsed }) => self.on_paint(elapsed, ctx),
            (Reaction::Turn, EventKind::InputKey(key)) => {
                self.on_key(key, ctx);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawCommand, RecordingRenderer};
    use crate::sim::event::{EventQueue, ObjectId};
    use crate::sim::geometry::{Point, Vector};
    use crate::sim::state::{Body, BodyId, Wall, WallId, World};

    const ME: ObjectId = ObjectId(0);

    /// One ball heading for a wall 8 units away at 10 units/s (800ms)
    fn lane() -> World {
        World::new(
            vec![Wall::new(9.0, -10.0, 9.0, 10.0)],
            vec![Body::new(Point::ZERO, Vector::new(10.0, 0.0), 1.0)],
        )
    }

    struct Harness {
        world: World,
        renderer: RecordingRenderer,
        queue: EventQueue,
    }

    impl Harness {
        fn new(world: World) -> Self {
            Self {
                world,
                renderer: RecordingRenderer::new(),
                queue: EventQueue::new(),
            }
        }

        fn start(&mut self, painter: &mut Painter) -> SimResult<()> {
            let mut ctx = Context::new(&mut self.world, &mut self.renderer, &mut self.queue, 0, ME);
            painter.start(&mut ctx)
        }

        /// Deliver the earliest pending event
        fn deliver(&mut self, painter: &mut Painter) -> SimResult<Event> {
            let event = self.queue.pop_next().expect("an event is pending");
            let mut ctx =
                Context::new(&mut self.world, &mut self.renderer, &mut self.queue, event.at, ME);
            painter.handle(&event, &mut ctx)?;
            Ok(event)
        }
    }

    #[test]
    fn test_transition_table() {
        use PainterState::*;
        let paint = EventKind::PaintTick { elapsed: 1 };
        let wall = EventKind::WallCollision {
            body: BodyId(0),
            wall: WallId(0),
            elapsed: 1,
        };
        let key = EventKind::InputKey(Key::Left);

        assert_eq!(reaction(Idle, &paint), None);
        assert_eq!(reaction(Idle, &wall), None);
        assert_eq!(reaction(Idle, &key), Some(Reaction::Turn));
        assert_eq!(reaction(AwaitingCollision, &wall), Some(Reaction::Collide));
        assert_eq!(reaction(AwaitingCollision, &paint), None);
        assert_eq!(reaction(AwaitingPaint, &paint), Some(Reaction::Paint));
        assert_eq!(reaction(AwaitingPaint, &wall), None);
    }

    #[test]
    fn test_paint_comes_first_when_collision_is_later() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(50));
        h.start(&mut painter).unwrap();

        assert_eq!(painter.state(), PainterState::AwaitingPaint);
        let e = h.queue.peek().unwrap();
        assert_eq!(e.at, 50);
        assert_eq!(e.kind, EventKind::PaintTick { elapsed: 50 });
    }

    #[test]
    fn test_collision_scheduled_when_strictly_before_paint() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(1000));
        h.start(&mut painter).unwrap();

        assert_eq!(painter.state(), PainterState::AwaitingCollision);
        assert_eq!(painter.time_to_next_paint(), 200);
        let e = h.queue.peek().unwrap();
        assert_eq!(e.at, 800);
        assert_eq!(
            e.kind,
            EventKind::WallCollision {
                body: BodyId(0),
                wall: WallId(0),
                elapsed: 800
            }
        );
    }

    #[test]
    fn test_collision_equal_to_paint_yields_paint() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(800));
        h.start(&mut painter).unwrap();
        assert_eq!(painter.state(), PainterState::AwaitingPaint);
        assert_eq!(h.queue.peek_time(), Some(800));
    }

    #[test]
    fn test_wall_collision_reflects_and_rearms() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(1000));
        h.start(&mut painter).unwrap();

        h.deliver(&mut painter).unwrap();
        let ball = &h.world.bodies[0];
        assert!((ball.position.x - 8.0).abs() < 1e-9);
        assert!((ball.velocity.x + 10.0).abs() < 1e-9);
        assert_eq!(painter.collisions(), 1);

        // Nothing else to hit: the remaining 200ms go to the paint tick
        assert_eq!(painter.state(), PainterState::AwaitingPaint);
        assert_eq!(h.queue.len(), 1);
        let e = h.queue.peek().unwrap();
        assert_eq!(e.at, 1000);
        assert_eq!(e.kind, EventKind::PaintTick { elapsed: 200 });
    }

    #[test]
    fn test_corner_hit_takes_both_walls_in_one_instant() {
        let world = World::new(
            vec![
                Wall::new(9.0, -10.0, 9.0, 10.0),
                Wall::new(-10.0, 9.0, 10.0, 9.0),
                Wall::new(-9.0, -10.0, -9.0, 10.0),
                Wall::new(-10.0, -9.0, 10.0, -9.0),
            ],
            vec![Body::new(Point::ZERO, Vector::new(10.0, 10.0), 1.0)],
        );
        let mut h = Harness::new(world);
        let mut painter = Painter::new(None);
        h.start(&mut painter).unwrap();

        let first = h.deliver(&mut painter).unwrap();
        let second = h.deliver(&mut painter).unwrap();
        assert_eq!((first.at, second.at), (800, 800));
        assert_eq!(
            second.kind,
            EventKind::WallCollision {
                body: BodyId(0),
                wall: WallId(1),
                elapsed: 0
            }
        );
        assert_eq!(h.world.bodies[0].velocity, Vector::new(-10.0, -10.0));

        // Neither corner wall comes back at the same instant
        let e = h.queue.peek().unwrap();
        assert_eq!(e.at, 2400);
        assert!(matches!(e.kind, EventKind::WallCollision { wall: WallId(2), .. }));
        assert_eq!(painter.collisions(), 2);
    }

    #[test]
    fn test_paint_draws_scene_and_resets_interval() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(50));
        h.start(&mut painter).unwrap();
        h.deliver(&mut painter).unwrap();

        assert_eq!(painter.frames(), 1);
        assert_eq!(h.renderer.frames, 1);
        // 1 wall + 3 shooter edges
        assert_eq!(h.renderer.lines().count(), 4);
        assert_eq!(
            h.renderer.circles().next(),
            Some(&DrawCommand::Circle { x: 0.5, y: 0.0, r: 1.0 })
        );
        assert_eq!(painter.time_to_next_paint(), 50);
        assert_eq!(h.queue.peek_time(), Some(100));
    }

    #[test]
    fn test_exactly_one_pending_rearm_after_each_delivery() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(30));
        h.start(&mut painter).unwrap();
        for _ in 0..100 {
            h.deliver(&mut painter).unwrap();
            assert_eq!(h.queue.pending_rearm(ME), 1);
        }
    }

    #[test]
    fn test_key_turns_shooter_without_rearming() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(50));
        h.start(&mut painter).unwrap();
        h.queue.schedule(ME, 10, EventKind::InputKey(Key::Right));

        let e = h.deliver(&mut painter).unwrap();
        assert_eq!(e.kind, EventKind::InputKey(Key::Right));
        assert!(h.world.shooter.angle > 0.0);
        assert_eq!(painter.state(), PainterState::AwaitingPaint);
        assert_eq!(h.queue.len(), 1);
        // Bodies only move on collision/paint
        assert_eq!(h.world.bodies[0].position, Point::ZERO);
    }

    #[test]
    fn test_stale_event_is_ignored() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(Some(50));
        h.start(&mut painter).unwrap();
        h.queue.schedule(
            ME,
            5,
            EventKind::WallCollision {
                body: BodyId(0),
                wall: WallId(0),
                elapsed: 5,
            },
        );
        h.deliver(&mut painter).unwrap();
        assert_eq!(h.world.bodies[0].position, Point::ZERO);
        assert_eq!(painter.collisions(), 0);
    }

    #[test]
    fn test_headless_without_collisions_is_an_error() {
        let world = World::new(
            Vec::new(),
            vec![Body::new(Point::ZERO, Vector::new(1.0, 0.0), 1.0)],
        );
        let mut h = Harness::new(world);
        let mut painter = Painter::new(None);
        let err = h.start(&mut painter).unwrap_err();
        assert!(matches!(
            err,
            SimError::NoFutureEventComputable { object: ME, at: 0 }
        ));
        assert_eq!(painter.state(), PainterState::Idle);
        assert!(h.queue.is_empty());
    }

    #[test]
    fn test_headless_schedules_collisions_only() {
        let mut h = Harness::new(lane());
        let mut painter = Painter::new(None);
        h.start(&mut painter).unwrap();
        assert_eq!(painter.state(), PainterState::AwaitingCollision);
        assert_eq!(h.queue.peek_time(), Some(800));
    }
}
