//! Nitro Pulse - a top-down 2D driving simulator
//!
//! Core modules:
//! - `sim`: Fixed-step vehicle simulation (input, kinematics, world, collision)
//! - `renderer`: Camera-following scene recording and WebGPU presentation
//! - `session`: Run lifecycle (menu, mission/free-roam runs, health, countdown)
//! - `mission`: Mission provider boundary with a fixed fallback
//! - `tuning`: Data-driven driving constants
//! - `runtime`: Native tokio driver (frame + countdown tickers)

pub mod hud;
pub mod mission;
pub mod renderer;
#[cfg(not(target_arch = "wasm32"))]
pub mod runtime;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use mission::{Mission, PlayerStats};
pub use session::{EndReason, Screen, Session};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Throttle acceleration (units/tick²)
    pub const ACCELERATION: f32 = 0.15;
    /// Reverse throttle authority relative to forward
    pub const REVERSE_RATIO: f32 = 0.5;
    /// Hard speed ceiling (units/tick)
    pub const MAX_SPEED: f32 = 8.0;
    /// Full steering authority (rad/tick)
    pub const STEER_SPEED: f32 = 0.04;
    /// Speed at which steering reaches full authority
    pub const MIN_STEER_SPEED: f32 = 0.5;
    /// Rolling resistance, applied every tick
    pub const FRICTION: f32 = 0.98;
    /// Per-tick velocity decay while the handbrake is held
    pub const HANDBRAKE_DECAY: f32 = 0.95;

    /// Side length of the square world
    pub const TRACK_SIZE: f32 = 4000.0;
    /// Inset from the world edge where crash detection starts
    pub const BOUNDARY_MARGIN: f32 = 100.0;
    /// Impacts at or below this speed are gentle touches
    pub const CRASH_SPEED_THRESHOLD: f32 = 2.0;
    /// Damage dealt per unit of impact speed
    pub const DAMAGE_PER_SPEED: f32 = 2.0;
    /// Velocity multiplier applied on a boundary crash
    pub const BOUNCE_FACTOR: f32 = -0.5;

    /// Vehicle integrity bounds
    pub const MAX_HEALTH: f32 = 100.0;
    /// Spawn point for every run
    pub const SPAWN_X: f32 = 2000.0;
    pub const SPAWN_Y: f32 = 2000.0;

    /// Car body footprint (length along heading, width across)
    pub const CAR_LENGTH: f32 = 50.0;
    pub const CAR_WIDTH: f32 = 30.0;

    /// Reference grid spacing (world units)
    pub const GRID_SPACING: f32 = 200.0;

    /// Frame cadence of the native driver (~60 Hz)
    pub const FRAME_INTERVAL_MS: u64 = 16;
    /// Mission countdown cadence
    pub const COUNTDOWN_INTERVAL_MS: u64 = 1000;

    /// Speed units to km/h for the dashboard
    pub const SPEED_TO_KMH: f32 = 20.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return angle;
    }
    angle = angle.rem_euclid(TAU);
    if angle >= PI {
        angle -= TAU;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps_accumulated_heading() {
        assert!((normalize_angle(0.0)).abs() < 1e-6);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(1.5 * PI) - (-PI / 2.0)).abs() < 1e-4);
        assert!((normalize_angle(-PI / 2.0 - 4.0 * PI) - (-PI / 2.0)).abs() < 1e-4);
    }
}
