//! Static world description
//!
//! A square world with a handful of buildings. Read-only for the whole run.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::TRACK_SIZE;

/// Axis-aligned building footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            width,
            height,
        }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let max = self.pos + self.size();
        point.x >= self.pos.x && point.x <= max.x && point.y >= self.pos.y && point.y <= max.y
    }
}

/// Buildings placed in the reference city
pub const CITY_BLOCKS: [Obstacle; 5] = [
    Obstacle::new(500.0, 500.0, 200.0, 200.0),
    Obstacle::new(1500.0, 800.0, 300.0, 100.0),
    Obstacle::new(1000.0, 2500.0, 150.0, 400.0),
    Obstacle::new(3000.0, 3000.0, 500.0, 200.0),
    Obstacle::new(2500.0, 1500.0, 200.0, 200.0),
];

/// World bounds and static hazards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldModel {
    /// Side length of the square world, origin at (0, 0)
    pub side: f32,
    /// Visual-only: the collision evaluator does not test against these
    pub obstacles: Vec<Obstacle>,
}

impl Default for WorldModel {
    fn default() -> Self {
        Self {
            side: TRACK_SIZE,
            obstacles: CITY_BLOCKS.to_vec(),
        }
    }
}

impl WorldModel {
    /// Empty square world (no buildings)
    pub fn open(side: f32) -> Self {
        Self {
            side,
            obstacles: Vec::new(),
        }
    }

    /// Whether `pos` lies inside the playable region inset by `margin`
    pub fn within_margin(&self, pos: Vec2, margin: f32) -> bool {
        let lo = margin;
        let hi = self.side - margin;
        pos.x >= lo && pos.x <= hi && pos.y >= lo && pos.y <= hi
    }

    /// Clamp a position onto the world square
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(Vec2::ZERO, Vec2::splat(self.side))
    }
}
