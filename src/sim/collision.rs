//! Continuous collision prediction for moving circles
//!
//! Instead of testing for overlap every tick, each pair is solved
//! analytically for the instant the boundaries touch. Positions are affine in
//! time between events, so a wall contact is a linear equation and a body
//! contact a quadratic one.
//!
//! Times are floored to whole milliseconds. A reported collision therefore
//! never lies after the true contact, and the simulation reacts up to a
//! millisecond early rather than letting a body sink into a wall.

use super::geometry::{self, Line};
use super::state::{Body, BodyId, WallExtent, WallId, World};
use super::Millis;
use crate::consts::EPSILON;

/// What a predicted collision involves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionRef {
    Wall { body: BodyId, wall: WallId },
    /// Always stored with `a < b`
    Bodies { a: BodyId, b: BodyId },
}

impl CollisionRef {
    pub fn bodies(x: BodyId, y: BodyId) -> Self {
        if x <= y {
            CollisionRef::Bodies { a: x, b: y }
        } else {
            CollisionRef::Bodies { a: y, b: x }
        }
    }

    /// Whether `body` takes part in this collision
    pub fn involves(&self, body: BodyId) -> bool {
        match *self {
            CollisionRef::Wall { body: b, .. } => b == body,
            CollisionRef::Bodies { a, b } => a == body || b == body,
        }
    }
}

/// A collision expected `delay` milliseconds from now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub delay: Millis,
    pub collision: CollisionRef,
}

/// Roots closer to zero than this (ms) count as "touching now"
const TOUCH_MS: f64 = 1e-6;

/// Pick the contact time from the two crossing times of a body's reach.
///
/// Normally the earlier positive root. A body already touching and still
/// approaching collides now, and a body already overlapping reports the
/// time it clears the contact. A body just leaving contact has nothing ahead.
fn first_contact(roots: [f64; 2]) -> Option<f64> {
    let [r0, r1] = roots;
    if !r0.is_finite() || !r1.is_finite() {
        return None;
    }
    let (lo, hi) = if r0 <= r1 { (r0, r1) } else { (r1, r0) };
    if lo > 0.0 {
        Some(lo)
    } else if lo > -TOUCH_MS && hi > TOUCH_MS {
        Some(0.0)
    } else if hi > TOUCH_MS {
        Some(hi)
    } else {
        None
    }
}

/// Whole milliseconds, or `None` when the delay does not fit a `Millis`
#[inline]
fn to_millis(ms: f64) -> Option<Millis> {
    let floored = ms.floor();
    if floored.is_finite() && floored >= 0.0 && floored < Millis::MAX as f64 {
        Some(floored as Millis)
    } else {
        None
    }
}

/// Exact time (ms, unfloored) at which the body's center reaches distance
/// `radius` from the infinite line through the wall
fn wall_contact_ms(body: &Body, wall: &Line) -> Option<f64> {
    if wall.is_degenerate() {
        return None;
    }
    let dir = wall.direction();
    let reach = body.radius * dir.length();
    // Signed distance (scaled by wall length) and its rate of change
    let offset = geometry::cross(dir, geometry::difference(wall.begin, body.position));
    let rate = geometry::cross(dir, body.velocity);
    if rate.abs() < EPSILON {
        // Moving parallel to the wall
        return None;
    }
    first_contact([
        1000.0 * (reach - offset) / rate,
        1000.0 * (-reach - offset) / rate,
    ])
}

/// Time until `body` touches the line through `wall`, treating the wall as
/// infinitely long
pub fn predict_wall_collision(body: &Body, wall: &Line) -> Option<Millis> {
    wall_contact_ms(body, wall).and_then(to_millis)
}

/// Like `predict_wall_collision`, but a contact whose touching point lies
/// beyond either endpoint does not count
pub fn predict_segment_collision(body: &Body, wall: &Line) -> Option<Millis> {
    let ms = wall_contact_ms(body, wall)?;
    let center = geometry::translate(body.position, body.velocity * (ms / 1000.0));
    let param = wall.closest_param(center)?;
    if (0.0..=1.0).contains(&param) {
        to_millis(ms)
    } else {
        None
    }
}

/// Time until two moving circles first touch
pub fn predict_body_collision(a: &Body, b: &Body) -> Option<Millis> {
    let dp = geometry::difference(a.position, b.position);
    let dv = b.velocity - a.velocity;
    let reach = a.radius + b.radius;

    // |dp + dv t|² = reach²
    let qa = dv.dot(dv);
    if qa < EPSILON {
        // No relative motion, the gap never changes
        return None;
    }
    let qb = 2.0 * dp.dot(dv);
    let qc = dp.dot(dp) - reach * reach;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return None;
    }
    let root = disc.sqrt();
    first_contact([
        1000.0 * (-qb - root) / (2.0 * qa),
        1000.0 * (-qb + root) / (2.0 * qa),
    ])
    .and_then(to_millis)
}

fn predict_wall(body: &Body, wall: &Line, extent: WallExtent) -> Option<Millis> {
    match extent {
        WallExtent::Infinite => predict_wall_collision(body, wall),
        WallExtent::Segment => predict_segment_collision(body, wall),
    }
}

/// Every future collision of one body: against each wall, then each other
/// body, in index order
pub fn compute_all_collisions(world: &World, id: BodyId) -> Vec<Prediction> {
    let Some(body) = world.body(id) else {
        return Vec::new();
    };

    let walls = world.walls.iter().enumerate().filter_map(|(i, wall)| {
        predict_wall(body, &wall.line, world.wall_extent).map(|delay| Prediction {
            delay,
            collision: CollisionRef::Wall {
                body: id,
                wall: WallId(i),
            },
        })
    });

    let bodies = world
        .bodies
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != id.0)
        .filter_map(|(j, other)| {
            predict_body_collision(body, other).map(|delay| Prediction {
                delay,
                collision: CollisionRef::bodies(id, BodyId(j)),
            })
        });

    walls.chain(bodies).collect()
}

/// The soonest collision anywhere in the world, skipping everything in
/// `exclude`.
///
/// Each body pair is considered once. On equal delays the first in body
/// order wins, walls before bodies.
pub fn next_collision(world: &World, exclude: &[CollisionRef]) -> Option<Prediction> {
    (0..world.bodies.len())
        .flat_map(|i| {
            compute_all_collisions(world, BodyId(i))
                .into_iter()
                .filter(move |p| match p.collision {
                    CollisionRef::Bodies { a, .. } => a.0 == i,
                    CollisionRef::Wall { .. } => true,
                })
        })
        .filter(|p| !exclude.contains(&p.collision))
        .min_by_key(|p| p.delay)
}
