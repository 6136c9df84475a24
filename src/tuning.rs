//! Data-driven driving tuning
//!
//! Keep gameplay feel separate from runtime configuration (frame cadence, endpoints).

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Integrator and collision constants, as data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Forward throttle acceleration (units/tick²)
    pub acceleration: f32,
    /// Reverse authority as a fraction of forward
    pub reverse_ratio: f32,
    /// Speed ceiling (units/tick)
    pub max_speed: f32,
    /// Full-authority steering rate (rad/tick)
    pub steer_speed: f32,
    /// Speed at which steering saturates
    pub min_steer_speed: f32,
    /// Rolling resistance multiplier
    pub friction: f32,
    /// Handbrake decay multiplier
    pub handbrake_decay: f32,
    /// Inset from the world edge that triggers crash detection
    pub boundary_margin: f32,
    /// Minimum impact speed for a crash
    pub crash_speed_threshold: f32,
    /// Damage per unit of impact speed
    pub damage_per_speed: f32,
    /// Velocity multiplier on a boundary crash
    pub bounce_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            acceleration: ACCELERATION,
            reverse_ratio: REVERSE_RATIO,
            max_speed: MAX_SPEED,
            steer_speed: STEER_SPEED,
            min_steer_speed: MIN_STEER_SPEED,
            friction: FRICTION,
            handbrake_decay: HANDBRAKE_DECAY,
            boundary_margin: BOUNDARY_MARGIN,
            crash_speed_threshold: CRASH_SPEED_THRESHOLD,
            damage_per_speed: DAMAGE_PER_SPEED,
            bounce_factor: BOUNCE_FACTOR,
        }
    }
}

impl Tuning {
    /// Speed the car settles at with throttle held, before the ceiling applies
    pub fn equilibrium_speed(&self) -> f32 {
        self.acceleration * self.friction / (1.0 - self.friction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fall_back_to_reference() {
        let tuning: Tuning = serde_json::from_str(r#"{"friction": 0.9}"#).unwrap();
        assert_eq!(tuning.friction, 0.9);
        assert_eq!(tuning.max_speed, MAX_SPEED);
        assert_eq!(tuning.acceleration, ACCELERATION);
    }

    #[test]
    fn test_reference_equilibrium_below_ceiling() {
        let tuning = Tuning::default();
        assert!(tuning.equilibrium_speed() < tuning.max_speed);
    }
}
