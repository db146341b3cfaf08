//! Scene configuration
//!
//! Walls, balls and timing supplied by the host as plain data. Stored as
//! JSON so scenes can be kept next to the binary and reloaded.

use std::fs;
use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::sim::geometry::{Line, Point, Vector};
use crate::sim::{Body, BodyResponse, Millis, Shooter, Wall, WallExtent, World};

/// A wall segment from (x0, y0) to (x1, y1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSpec {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl WallSpec {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    fn line(&self) -> Line {
        Line::from_coords(self.x0, self.y0, self.x1, self.y1)
    }
}

/// A ball: center, velocity (units/second) and radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
}

impl BodySpec {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, radius: f64) -> Self {
        Self { x, y, vx, vy, radius }
    }
}

fn default_paint_interval() -> Option<Millis> {
    Some(DEFAULT_PAINT_INTERVAL_MS)
}

/// Everything needed to build a `World` and its painter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub walls: Vec<WallSpec>,
    pub bodies: Vec<BodySpec>,

    /// Milliseconds between paint ticks; `null` runs headless
    #[serde(default = "default_paint_interval")]
    pub paint_interval_ms: Option<Millis>,

    #[serde(default)]
    pub shooter: Shooter,

    // === Open behaviors ===
    /// Whether wall contacts past a segment's ends count
    #[serde(default)]
    pub wall_extent: WallExtent,
    /// Whether touching balls exchange momentum
    #[serde(default)]
    pub body_response: BodyResponse,
}

/// Four walls enclosing the rectangle, clockwise from the top edge
pub fn box_walls(left: f64, top: f64, width: f64, height: f64) -> Vec<WallSpec> {
    let (x0, y0) = (left, top);
    let (x1, y1) = (left + width, top + height);
    vec![
        WallSpec::new(x0, y0, x1, y0),
        WallSpec::new(x1, y0, x1, y1),
        WallSpec::new(x1, y1, x0, y1),
        WallSpec::new(x0, y1, x0, y0),
    ]
}

impl Default for SimConfig {
    /// The classic demo: five balls in a 200×200 box
    fn default() -> Self {
        Self {
            walls: box_walls(BOX_LEFT, BOX_TOP, BOX_WIDTH, BOX_HEIGHT),
            bodies: vec![
                BodySpec::new(200.0, 200.0, 200.0, 120.0, 10.0),
                BodySpec::new(150.0, 150.0, 100.0, 60.0, 15.0),
                BodySpec::new(250.0, 150.0, -50.0, -5.0, 20.0),
                BodySpec::new(250.0, 250.0, -100.0, 0.0, 25.0),
                BodySpec::new(150.0, 250.0, 0.0, 100.0, 30.0),
            ],
            paint_interval_ms: default_paint_interval(),
            shooter: Shooter::default(),
            wall_extent: WallExtent::default(),
            body_response: BodyResponse::default(),
        }
    }
}

impl SimConfig {
    /// A seeded scene of `count` non-overlapping balls in the default box.
    /// Balls that cannot be placed after a bounded number of tries are
    /// skipped, so the result may hold fewer.
    pub fn random_box(seed: u64, count: usize) -> Self {
        const MAX_TRIES: usize = 100;
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut bodies: Vec<BodySpec> = Vec::with_capacity(count);

        for _ in 0..count {
            for _ in 0..MAX_TRIES {
                let radius: f64 = rng.random_range(4.0..12.0);
                let x = rng.random_range(BOX_LEFT + radius + 1.0..BOX_LEFT + BOX_WIDTH - radius - 1.0);
                let y = rng.random_range(BOX_TOP + radius + 1.0..BOX_TOP + BOX_HEIGHT - radius - 1.0);
                let overlaps = bodies.iter().any(|b| {
                    let gap = Point::new(b.x, b.y).distance(Point::new(x, y));
                    gap <= b.radius + radius + 1.0
                });
                if overlaps {
                    continue;
                }
                let heading = rng.random_range(0.0..std::f64::consts::TAU);
                let speed = rng.random_range(40.0..200.0);
                bodies.push(BodySpec::new(
                    x,
                    y,
                    speed * heading.cos(),
                    speed * heading.sin(),
                    radius,
                ));
                break;
            }
        }

        if bodies.len() < count {
            log::warn!("random_box: placed {} of {} balls", bodies.len(), count);
        }

        Self {
            bodies,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a scene file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!(
            "Loaded scene from {}: {} walls, {} balls",
            path.display(),
            config.walls.len(),
            config.bodies.len()
        );
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Scene saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Reject scenes the predictor cannot make sense of
    pub fn validate(&self) -> SimResult<()> {
        if self.paint_interval_ms == Some(0) {
            return Err(SimError::InvalidConfig(
                "paint_interval_ms must be positive (use null for headless)".into(),
            ));
        }
        for (i, w) in self.walls.iter().enumerate() {
            let finite = [w.x0, w.y0, w.x1, w.y1].iter().all(|v| v.is_finite());
            if !finite || w.line().is_degenerate() {
                return Err(SimError::InvalidConfig(format!(
                    "wall {i} is degenerate or not finite"
                )));
            }
        }
        for (i, b) in self.bodies.iter().enumerate() {
            if ![b.x, b.y, b.vx, b.vy].iter().all(|v| v.is_finite()) {
                return Err(SimError::InvalidConfig(format!("ball {i} is not finite")));
            }
            if !(b.radius.is_finite() && b.radius > 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "ball {i} radius must be positive, got {}",
                    b.radius
                )));
            }
        }
        Ok(())
    }

    pub fn build_world(&self) -> World {
        let walls = self
            .walls
            .iter()
            .map(|w| Wall::new(w.x0, w.y0, w.x1, w.y1))
            .collect();
        let bodies = self
            .bodies
            .iter()
            .map(|b| Body::new(Point::new(b.x, b.y), Vector::new(b.vx, b.vy), b.radius))
            .collect();
        let mut world = World::new(walls, bodies);
        world.shooter = self.shooter.clone();
        world.wall_extent = self.wall_extent;
        world.body_response = self.body_response;
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_is_valid() {
        let config = SimConfig::default();
        config.validate().unwrap();
        let world = config.build_world();
        assert_eq!(world.walls.len(), 4);
        assert_eq!(world.bodies.len(), 5);
        assert_eq!(world.shooter.pivot, Point::new(200.0, 200.0));
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let json = r#"{
            "walls": [{"x0": 0, "y0": 0, "x1": 10, "y1": 0}],
            "bodies": [{"x": 5, "y": 5, "vx": 1, "vy": 0, "radius": 1}]
        }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.paint_interval_ms, Some(DEFAULT_PAINT_INTERVAL_MS));
        assert_eq!(config.wall_extent, WallExtent::Infinite);
        assert_eq!(config.body_response, BodyResponse::PassThrough);
    }

    #[test]
    fn test_json_headless_and_options() {
        let json = r#"{
            "walls": [],
            "bodies": [],
            "paint_interval_ms": null,
            "wall_extent": "segment",
            "body_response": "elastic"
        }"#;
        let config = SimConfig::from_json(json).unwrap();
        assert_eq!(config.paint_interval_ms, None);
        assert_eq!(config.wall_extent, WallExtent::Segment);
        assert_eq!(config.body_response, BodyResponse::Elastic);
    }

    #[test]
    fn test_json_round_trip_preserves_scene() {
        let mut config = SimConfig::default();
        config.paint_interval_ms = Some(20);
        config.shooter.angle = 1.5;
        let back = SimConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_scenes_are_rejected() {
        let mut zero_paint = SimConfig::default();
        zero_paint.paint_interval_ms = Some(0);
        assert!(matches!(zero_paint.validate(), Err(SimError::InvalidConfig(_))));

        let mut flat_wall = SimConfig::default();
        flat_wall.walls.push(WallSpec::new(1.0, 1.0, 1.0, 1.0));
        assert!(matches!(flat_wall.validate(), Err(SimError::InvalidConfig(_))));

        let mut bad_ball = SimConfig::default();
        bad_ball.bodies[0].radius = 0.0;
        assert!(matches!(bad_ball.validate(), Err(SimError::InvalidConfig(_))));

        let mut nan_ball = SimConfig::default();
        nan_ball.bodies[1].vx = f64::NAN;
        assert!(matches!(nan_ball.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(SimError::Json(_))
        ));
    }

    #[test]
    fn test_random_box_is_deterministic_and_inside() {
        let a = SimConfig::random_box(42, 8);
        let b = SimConfig::random_box(42, 8);
        assert_eq!(a, b);
        assert_eq!(a.bodies.len(), 8);
        for body in &a.bodies {
            assert!(body.x - body.radius > BOX_LEFT);
            assert!(body.x + body.radius < BOX_LEFT + BOX_WIDTH);
            assert!(body.y - body.radius > BOX_TOP);
            assert!(body.y + body.radius < BOX_TOP + BOX_HEIGHT);
        }
        assert_ne!(a, SimConfig::random_box(43, 8));
    }
}
