//! Boundary collision and response
//!
//! The world edge is padded by a margin. Leaving the padded region fast is a crash:
//! damage scales with speed and the car bounces back at half speed. Slow contact is
//! a touch with no damage. Position is always clamped onto the world square.
//!
//! Buildings are not collided.

use serde::{Deserialize, Serialize};

use super::vehicle::VehicleState;
use super::world::WorldModel;
use crate::tuning::Tuning;

/// Transient damage report for the session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrashEvent {
    pub damage: f32,
}

/// Result of evaluating one tick's position against the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    pub state: VehicleState,
    pub crash: Option<CrashEvent>,
}

/// Check the car against the world bounds and apply the bounce response
///
/// After a bounce `speed` is the post-bounce `|vel|`, not the impact speed; a run
/// that ends on an impact records the rebound speed in its stats.
pub fn evaluate(state: &VehicleState, world: &WorldModel, tuning: &Tuning) -> CollisionResult {
    let mut next = *state;
    let mut crash = None;

    if !world.within_margin(next.pos, tuning.boundary_margin)
        && next.speed > tuning.crash_speed_threshold
    {
        crash = Some(CrashEvent {
            damage: next.speed * tuning.damage_per_speed,
        });
        next.vel *= tuning.bounce_factor;
        next.speed = next.vel.length();
    }

    next.pos = world.clamp(next.pos);

    CollisionResult { state: next, crash }
}
