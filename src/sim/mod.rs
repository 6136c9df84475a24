//! Deterministic simulation module
//!
//! All driving logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - State in, state out (no shared mutable state)
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod tick;
pub mod vehicle;
pub mod world;

pub use collision::{CollisionResult, CrashEvent, evaluate};
pub use input::{InputSampler, InputSnapshot, KeyCode};
pub use tick::{TickOutcome, step};
pub use vehicle::{Integrator, VehicleColor, VehicleState};
pub use world::{CITY_BLOCKS, Obstacle, WorldModel};
