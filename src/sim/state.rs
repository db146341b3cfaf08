//! World state and core simulation types
//!
//! The `World` owns every wall and body; handlers and predictors borrow it
//! explicitly. Bodies are addressed by index, which is also the stable
//! iteration order used to break ties.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::{self, Line, Point, Vector};
use super::Millis;
use crate::consts::*;

/// Index of a body in `World::bodies`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub usize);

/// Index of a wall in `World::walls`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for WallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wall#{}", self.0)
    }
}

/// How wall collisions are predicted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WallExtent {
    /// Walls extend infinitely along their line
    #[default]
    Infinite,
    /// Only contacts within the segment's endpoints count
    Segment,
}

/// What happens when two bodies touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BodyResponse {
    /// Detected, but the bodies keep their velocities
    #[default]
    PassThrough,
    /// Elastic exchange along the contact normal, mass proportional to r²
    Elastic,
}

/// A moving circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Point,
    /// Units per second
    pub velocity: Vector,
    pub radius: f64,
}

impl Body {
    pub fn new(position: Point, velocity: Vector, radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// Move along the current velocity for `elapsed` milliseconds
    pub fn advance(&mut self, elapsed: Millis) {
        self.position = geometry::translate(
            self.position,
            self.velocity * (elapsed as f64 / 1000.0),
        );
    }

    /// Elastic reflection: keep the component along the wall, negate the
    /// component along its normal. A degenerate wall leaves velocity alone.
    pub fn reflect_off_wall(&mut self, wall: &Line) {
        if wall.is_degenerate() {
            return;
        }
        let w = wall.direction();
        let along = geometry::project(self.velocity, w);
        let across = geometry::project(self.velocity, geometry::normal(w));
        self.velocity = along - across;
    }

    /// Mass stand-in for collision response
    #[inline]
    pub fn mass(&self) -> f64 {
        self.radius * self.radius
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass() * self.velocity.length_squared()
    }

    /// Elastic response between two touching bodies. Only approaching bodies
    /// exchange momentum, so a pair that is already separating is left alone.
    pub fn resolve_body_collision(a: &mut Body, b: &mut Body) {
        let Some(n) = geometry::try_normalize(geometry::difference(a.position, b.position)) else {
            return;
        };
        let closing = (a.velocity - b.velocity).dot(n);
        if closing <= 0.0 {
            return;
        }
        let (ma, mb) = (a.mass(), b.mass());
        let total = ma + mb;
        if total < EPSILON {
            return;
        }
        a.velocity -= n * (2.0 * mb / total * closing);
        b.velocity += n * (2.0 * ma / total * closing);
    }
}

/// A static wall segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub line: Line,
}

impl Wall {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            line: Line::from_coords(x0, y0, x1, y1),
        }
    }
}

/// The turret drawn at the box center; turned by key input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shooter {
    /// Radians, 0 = pointing up (screen coordinates)
    pub angle: f64,
    pub length: f64,
    pub width: f64,
    pub pivot: Point,
}

impl Default for Shooter {
    fn default() -> Self {
        Self {
            angle: 0.0,
            length: SHOOTER_LENGTH,
            width: SHOOTER_WIDTH,
            pivot: Point::new(BOX_LEFT + BOX_WIDTH / 2.0, BOX_TOP + BOX_HEIGHT / 2.0),
        }
    }
}

impl Shooter {
    pub fn turn_left(&mut self) {
        self.angle -= SHOOTER_TURN;
    }

    pub fn turn_right(&mut self) {
        self.angle += SHOOTER_TURN;
    }

    /// Triangle vertices in world space: rotated about the local origin,
    /// then moved to the pivot
    pub fn outline(&self) -> [Point; 3] {
        let local = [
            Point::new(-self.width / 2.0, self.length / 2.0),
            Point::new(self.width / 2.0, self.length / 2.0),
            Point::new(0.0, -self.length / 2.0),
        ];
        local.map(|p| {
            geometry::translate(geometry::rotate(p, Point::ZERO, self.angle), self.pivot)
        })
    }
}

/// Everything the simulation mutates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub walls: Vec<Wall>,
    pub bodies: Vec<Body>,
    pub shooter: Shooter,
    #[serde(default)]
    pub wall_extent: WallExtent,
    #[serde(default)]
    pub body_response: BodyResponse,
}

impl World {
    pub fn new(walls: Vec<Wall>, bodies: Vec<Body>) -> Self {
        Self {
            walls,
            bodies,
            shooter: Shooter::default(),
            wall_extent: WallExtent::default(),
            body_response: BodyResponse::default(),
        }
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0)
    }

    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.get(id.0)
    }

    /// Advance every body by the same elapsed time
    pub fn advance_all(&mut self, elapsed: Millis) {
        for body in &mut self.bodies {
            body.advance(elapsed);
        }
    }

    /// Reflect one body off one wall. Returns false if either id is stale.
    pub fn reflect(&mut self, body: BodyId, wall: WallId) -> bool {
        let Some(line) = self.walls.get(wall.0).map(|w| w.line) else {
            return false;
        };
        match self.bodies.get_mut(body.0) {
            Some(b) => {
                b.reflect_off_wall(&line);
                true
            }
            None => false,
        }
    }

    /// Apply the configured body-body response. Returns false if the ids
    /// are stale or identical.
    pub fn resolve_bodies(&mut self, a: BodyId, b: BodyId) -> bool {
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        if lo == hi || hi >= self.bodies.len() {
            return false;
        }
        if self.body_response == BodyResponse::PassThrough {
            return true;
        }
        let (head, tail) = self.bodies.split_at_mut(hi);
        Body::resolve_body_collision(&mut head[lo], &mut tail[0]);
        true
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_advance_uses_milliseconds() {
        let mut body = Body::new(Point::new(1.0, 1.0), Vector::new(10.0, -20.0), 1.0);
        body.advance(500);
        assert!((body.position.x - 6.0).abs() < TOL);
        assert!((body.position.y + 9.0).abs() < TOL);

        body.advance(0);
        assert!((body.position.x - 6.0).abs() < TOL);
    }

    #[test]
    fn test_reflect_off_vertical_wall() {
        let wall = Line::from_coords(9.0, -10.0, 9.0, 10.0);
        let mut body = Body::new(Point::ZERO, Vector::new(10.0, 3.0), 1.0);
        body.reflect_off_wall(&wall);
        assert!((body.velocity.x + 10.0).abs() < TOL);
        assert!((body.velocity.y - 3.0).abs() < TOL);
    }

    #[test]
    fn test_reflect_off_diagonal_wall() {
        // 45° wall turns a rightward velocity into a vertical one
        let wall = Line::from_coords(0.0, 0.0, 1.0, 1.0);
        let mut body = Body::new(Point::ZERO, Vector::new(4.0, 0.0), 1.0);
        body.reflect_off_wall(&wall);
        assert!(body.velocity.x.abs() < TOL);
        assert!((body.velocity.y - 4.0).abs() < TOL);
    }

    #[test]
    fn test_reflect_off_degenerate_wall_is_noop() {
        let wall = Line::from_coords(2.0, 2.0, 2.0, 2.0);
        let mut body = Body::new(Point::ZERO, Vector::new(4.0, 1.0), 1.0);
        body.reflect_off_wall(&wall);
        assert_eq!(body.velocity, Vector::new(4.0, 1.0));
    }

    #[test]
    fn test_elastic_equal_mass_head_on_swaps_velocities() {
        let mut a = Body::new(Point::new(0.0, 0.0), Vector::new(5.0, 0.0), 1.0);
        let mut b = Body::new(Point::new(2.0, 0.0), Vector::new(-3.0, 0.0), 1.0);
        Body::resolve_body_collision(&mut a, &mut b);
        assert!((a.velocity.x + 3.0).abs() < TOL);
        assert!((b.velocity.x - 5.0).abs() < TOL);
    }

    #[test]
    fn test_elastic_conserves_momentum_and_energy() {
        let mut a = Body::new(Point::new(0.0, 0.0), Vector::new(7.0, 2.0), 2.0);
        let mut b = Body::new(Point::new(3.0, 1.0), Vector::new(-1.0, 0.5), 1.0);
        let momentum = a.velocity * a.mass() + b.velocity * b.mass();
        let energy = a.kinetic_energy() + b.kinetic_energy();

        Body::resolve_body_collision(&mut a, &mut b);

        let after = a.velocity * a.mass() + b.velocity * b.mass();
        assert!((after - momentum).length() < 1e-9);
        assert!((a.kinetic_energy() + b.kinetic_energy() - energy).abs() < 1e-9);
    }

    #[test]
    fn test_separating_bodies_are_untouched() {
        let mut a = Body::new(Point::new(0.0, 0.0), Vector::new(-5.0, 0.0), 1.0);
        let mut b = Body::new(Point::new(2.0, 0.0), Vector::new(5.0, 0.0), 1.0);
        Body::resolve_body_collision(&mut a, &mut b);
        assert_eq!(a.velocity, Vector::new(-5.0, 0.0));
        assert_eq!(b.velocity, Vector::new(5.0, 0.0));
    }

    #[test]
    fn test_pass_through_leaves_velocities() {
        let mut world = World::new(
            Vec::new(),
            vec![
                Body::new(Point::new(0.0, 0.0), Vector::new(5.0, 0.0), 1.0),
                Body::new(Point::new(2.0, 0.0), Vector::new(-5.0, 0.0), 1.0),
            ],
        );
        world.body_response = BodyResponse::PassThrough;
        assert!(world.resolve_bodies(BodyId(1), BodyId(0)));
        assert_eq!(world.bodies[0].velocity, Vector::new(5.0, 0.0));

        world.body_response = BodyResponse::Elastic;
        assert!(world.resolve_bodies(BodyId(1), BodyId(0)));
        assert!((world.bodies[0].velocity.x + 5.0).abs() < TOL);

        assert!(!world.resolve_bodies(BodyId(0), BodyId(0)));
        assert!(!world.resolve_bodies(BodyId(0), BodyId(7)));
    }

    #[test]
    fn test_shooter_outline_turns() {
        let mut shooter = Shooter {
            pivot: Point::new(10.0, 10.0),
            ..Default::default()
        };
        let tip = shooter.outline()[2];
        assert!((tip.x - 10.0).abs() < TOL);
        assert!((tip.y - 5.0).abs() < TOL);

        for _ in 0..3 {
            shooter.turn_right();
        }
        // Quarter turn clockwise on screen: tip now points along +x
        let tip = shooter.outline()[2];
        assert!((tip.x - 15.0).abs() < TOL);
        assert!((tip.y - 10.0).abs() < TOL);

        shooter.turn_left();
        assert!((shooter.angle - 2.0 * SHOOTER_TURN).abs() < TOL);
    }
}
