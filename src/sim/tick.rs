//! Fixed timestep simulation tick
//!
//! Input read, integrate, collide. The caller owns the state and publishes the
//! returned vehicle as the next snapshot.

use super::collision::{CrashEvent, evaluate};
use super::input::InputSnapshot;
use super::vehicle::{Integrator, VehicleState};
use super::world::WorldModel;

/// Everything one tick produces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub vehicle: VehicleState,
    pub crash: Option<CrashEvent>,
}

/// Advance the car by one fixed timestep
pub fn step(
    prev: &VehicleState,
    input: &InputSnapshot,
    world: &WorldModel,
    integrator: &Integrator,
) -> TickOutcome {
    let integrated = integrator.step(prev, input);
    let collision = evaluate(&integrated, world, &integrator.tuning);
    TickOutcome {
        vehicle: collision.state,
        crash: collision.crash,
    }
}
