//! Vehicle state and the kinematics integrator
//!
//! One call to [`Integrator::step`] advances the car by exactly one frame. There is
//! no delta-time: the tuned constants are per-tick quantities.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::input::InputSnapshot;
use crate::consts::*;
use crate::tuning::Tuning;

/// Paint scheme, picked by run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VehicleColor {
    /// Mission runs
    #[default]
    Primary,
    /// Free roam
    Secondary,
}

/// Complete state of the player's car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// World position
    pub pos: Vec2,
    /// Displacement per tick
    pub vel: Vec2,
    /// Heading in radians (unbounded)
    pub angle: f32,
    /// Always `vel.length()` after integration
    pub speed: f32,
    /// Integrity in [0, 100]
    pub health: f32,
    pub color: VehicleColor,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::spawn(VehicleColor::Primary)
    }
}

impl VehicleState {
    /// A fresh car at the spawn point, at rest, facing +x
    pub fn spawn(color: VehicleColor) -> Self {
        Self::at_rest(Vec2::new(SPAWN_X, SPAWN_Y), color)
    }

    pub fn at_rest(pos: Vec2, color: VehicleColor) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            speed: 0.0,
            health: MAX_HEALTH,
            color,
        }
    }

    /// Unit vector along the heading
    #[inline]
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Apply damage, clamping integrity at zero
    pub fn damaged(self, amount: f32) -> Self {
        Self {
            health: (self.health - amount.max(0.0)).clamp(0.0, MAX_HEALTH),
            ..self
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Fixed-step kinematics for one car
#[derive(Debug, Clone, Copy, Default)]
pub struct Integrator {
    pub tuning: Tuning,
}

impl Integrator {
    pub fn new(tuning: Tuning) -> Self {
        Self { tuning }
    }

    /// Steering authority at a given speed: 0 at rest, 1 from `min_steer_speed` up
    pub fn steer_factor(&self, speed: f32) -> f32 {
        (speed.abs() / self.tuning.min_steer_speed).min(1.0)
    }

    /// Throttle acceleration for this tick. Forward wins over reverse.
    fn throttle(&self, input: &InputSnapshot) -> f32 {
        if input.forward {
            self.tuning.acceleration
        } else if input.reverse {
            -self.tuning.acceleration * self.tuning.reverse_ratio
        } else {
            0.0
        }
    }

    /// Advance one tick. Pure: the previous state is left untouched.
    pub fn step(&self, prev: &VehicleState, input: &InputSnapshot) -> VehicleState {
        let t = &self.tuning;
        let mut vel = prev.vel;

        let mut accel = self.throttle(input);
        let steering = input.steer_sign() * t.steer_speed * self.steer_factor(prev.speed);

        // Handbrake overrides throttle
        if input.handbrake {
            vel *= t.handbrake_decay;
            accel = 0.0;
        }

        let angle = prev.angle + steering;
        let dir = Vec2::new(angle.cos(), angle.sin());

        vel += dir * accel;
        vel *= t.friction;

        let mut speed = vel.length();
        if speed > t.max_speed {
            vel *= t.max_speed / speed;
            speed = t.max_speed;
        }

        VehicleState {
            pos: prev.pos + vel,
            vel,
            angle,
            speed,
            ..*prev
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn moving(vel: Vec2) -> VehicleState {
        VehicleState {
            vel,
            speed: vel.length(),
            ..VehicleState::at_rest(Vec2::ZERO, VehicleColor::Primary)
        }
    }

    fn forward() -> InputSnapshot {
        InputSnapshot {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_straight_line_acceleration() {
        let integrator = Integrator::default();
        let mut car = VehicleState::at_rest(Vec2::ZERO, VehicleColor::Primary);
        let mut last_speed = car.speed;

        for _ in 0..100 {
            car = integrator.step(&car, &forward());
            assert!(car.speed > last_speed, "speed must keep rising");
            last_speed = car.speed;
        }

        let tuning = Tuning::default();
        let ceiling = (tuning.acceleration / (1.0 - tuning.friction)).min(tuning.max_speed);
        assert!(car.speed < ceiling);
        assert!(car.speed > 0.8 * tuning.equilibrium_speed());
        assert!(car.pos.x > 0.0);
        assert!(car.pos.y.abs() < 1e-4);
        assert_eq!(car.angle, 0.0);
    }

    #[test]
    fn test_steering_at_rest_is_zero() {
        let integrator = Integrator::default();
        let car = VehicleState::at_rest(Vec2::new(10.0, 10.0), VehicleColor::Primary);
        for input in [
            InputSnapshot {
                left: true,
                ..Default::default()
            },
            InputSnapshot {
                right: true,
                forward: true,
                ..Default::default()
            },
        ] {
            let next = integrator.step(&car, &input);
            assert_eq!(next.angle, car.angle);
        }
        assert_eq!(integrator.steer_factor(0.0), 0.0);
    }

    #[test]
    fn test_steer_factor_saturates() {
        let integrator = Integrator::default();
        assert!((integrator.steer_factor(0.25) - 0.5).abs() < 1e-6);
        assert_eq!(integrator.steer_factor(0.5), 1.0);
        assert_eq!(integrator.steer_factor(7.0), 1.0);
    }

    #[test]
    fn test_steering_direction_and_cancel() {
        let integrator = Integrator::default();
        let car = moving(Vec2::new(3.0, 0.0));

        let left = integrator.step(
            &car,
            &InputSnapshot {
                left: true,
                ..Default::default()
            },
        );
        assert!((left.angle + STEER_SPEED).abs() < 1e-6);

        let right = integrator.step(
            &car,
            &InputSnapshot {
                right: true,
                ..Default::default()
            },
        );
        assert!((right.angle - STEER_SPEED).abs() < 1e-6);

        let both = integrator.step(
            &car,
            &InputSnapshot {
                left: true,
                right: true,
                ..Default::default()
            },
        );
        assert_eq!(both.angle, 0.0);
    }

    #[test]
    fn test_forward_wins_over_reverse() {
        let integrator = Integrator::default();
        let car = VehicleState::at_rest(Vec2::ZERO, VehicleColor::Primary);
        let both = InputSnapshot {
            forward: true,
            reverse: true,
            ..Default::default()
        };
        let next = integrator.step(&car, &both);
        assert!((next.vel.x - ACCELERATION * FRICTION).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_has_half_authority() {
        let integrator = Integrator::default();
        let car = VehicleState::at_rest(Vec2::ZERO, VehicleColor::Primary);
        let next = integrator.step(
            &car,
            &InputSnapshot {
                reverse: true,
                ..Default::default()
            },
        );
        assert!((next.vel.x + ACCELERATION * 0.5 * FRICTION).abs() < 1e-6);
    }

    #[test]
    fn test_handbrake_overrides_throttle() {
        let integrator = Integrator::default();
        let car = moving(Vec2::new(4.0, 0.0));
        let input = InputSnapshot {
            forward: true,
            handbrake: true,
            ..Default::default()
        };
        let next = integrator.step(&car, &input);
        assert!((next.vel.x - 4.0 * HANDBRAKE_DECAY * FRICTION).abs() < 1e-5);
    }

    #[test]
    fn test_step_does_not_touch_health_or_color() {
        let integrator = Integrator::default();
        let car = VehicleState {
            health: 42.0,
            color: VehicleColor::Secondary,
            ..moving(Vec2::new(1.0, 1.0))
        };
        let next = integrator.step(&car, &forward());
        assert_eq!(next.health, 42.0);
        assert_eq!(next.color, VehicleColor::Secondary);
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let car = VehicleState::default().damaged(30.0).damaged(500.0);
        assert_eq!(car.health, 0.0);
        assert!(car.is_destroyed());
        // Negative damage never heals
        assert_eq!(VehicleState::default().damaged(-10.0).health, MAX_HEALTH);
    }

    proptest! {
        #[test]
        fn prop_friction_decay(vx in -5.0f32..5.0, vy in -5.0f32..5.0, ticks in 1usize..200) {
            prop_assume!(Vec2::new(vx, vy).length() > 0.01);
            let integrator = Integrator::default();
            let mut car = moving(Vec2::new(vx, vy));
            let initial = car.speed;
            let mut last = initial;
            for _ in 0..ticks {
                car = integrator.step(&car, &InputSnapshot::default());
                prop_assert!(car.speed < last);
                prop_assert!(car.speed > 0.0);
                last = car.speed;
            }
            let expected = initial * FRICTION.powi(ticks as i32);
            prop_assert!((car.speed - expected).abs() <= expected * 1e-3 + 1e-6);
        }

        #[test]
        fn prop_speed_never_exceeds_ceiling(
            vx in -20.0f32..20.0,
            vy in -20.0f32..20.0,
            angle in -10.0f32..10.0,
            fwd in any::<bool>(),
            rev in any::<bool>(),
            left in any::<bool>(),
            right in any::<bool>(),
            ticks in 1usize..300,
        ) {
            let integrator = Integrator::default();
            let mut car = VehicleState { angle, ..moving(Vec2::new(vx, vy)) };
            let input = InputSnapshot { forward: fwd, reverse: rev, left, right, handbrake: false };
            for _ in 0..ticks {
                car = integrator.step(&car, &input);
                prop_assert!(car.speed <= MAX_SPEED);
                prop_assert!((car.speed - car.vel.length()).abs() < 1e-3);
            }
        }
    }
}
