//! 2D geometry primitives for walls and moving bodies
//!
//! Points and vectors are both `DVec2`; the aliases only document intent.
//! A wall is a `Line` from `begin` to `end`. All operations are pure.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;

/// A location in the plane
pub type Point = DVec2;

/// A displacement or direction (velocities are in units/second)
pub type Vector = DVec2;

/// A static line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub begin: Point,
    pub end: Point,
}

impl Line {
    pub fn new(begin: Point, end: Point) -> Self {
        Self { begin, end }
    }

    pub fn from_coords(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Direction from `begin` to `end` (not normalized)
    #[inline]
    pub fn direction(&self) -> Vector {
        difference(self.begin, self.end)
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Perpendicular to the line direction (not normalized)
    #[inline]
    pub fn normal(&self) -> Vector {
        normal(self.direction())
    }

    /// A wall with no extent has no direction to reflect against
    pub fn is_degenerate(&self) -> bool {
        let len = self.length();
        !len.is_finite() || len < EPSILON
    }

    /// Parameter of the orthogonal projection of `p` on the infinite line:
    /// 0 at `begin`, 1 at `end`.
    pub fn closest_param(&self, p: Point) -> Option<f64> {
        let dir = self.direction();
        let len_sq = dir.length_squared();
        if len_sq < EPSILON {
            return None;
        }
        Some(difference(self.begin, p).dot(dir) / len_sq)
    }
}

/// Move a point by a vector
#[inline]
pub fn translate(p: Point, v: Vector) -> Point {
    p + v
}

/// Vector pointing from `from` to `to`
#[inline]
pub fn difference(from: Point, to: Point) -> Vector {
    to - from
}

/// Euclidean distance `|a - b|`
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    difference(a, b).length()
}

/// Perpendicular vector (90° counter-clockwise)
#[inline]
pub fn normal(v: Vector) -> Vector {
    Vector::new(-v.y, v.x)
}

/// Unit vector, or `None` for zero or non-finite length
pub fn try_normalize(v: Vector) -> Option<Vector> {
    let len = v.length();
    if !len.is_finite() || len < EPSILON {
        None
    } else {
        Some(v / len)
    }
}

/// Projection of `v` onto `onto`; zero when `onto` has no length
pub fn project(v: Vector, onto: Vector) -> Vector {
    let len_sq = onto.length_squared();
    if len_sq < EPSILON {
        return Vector::ZERO;
    }
    onto * (v.dot(onto) / len_sq)
}

/// Unsigned angle between two vectors (radians), `None` if either is zero
pub fn angle_between(a: Vector, b: Vector) -> Option<f64> {
    let denom = a.length() * b.length();
    if denom < EPSILON {
        return None;
    }
    Some((a.dot(b) / denom).clamp(-1.0, 1.0).acos())
}

/// Rotate `p` around `origin` by `theta` radians (counter-clockwise)
pub fn rotate(p: Point, origin: Point, theta: f64) -> Point {
    let (sin, cos) = theta.sin_cos();
    let d = difference(origin, p);
    origin + Vector::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// 2D cross product (z component)
#[inline]
pub fn cross(a: Vector, b: Vector) -> f64 {
    a.x * b.y - a.y * b.x
}
