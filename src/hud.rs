//! Heads-up readouts
//!
//! Pure formatting of session state. The shell copies these strings into the DOM.

use crate::consts::{MAX_HEALTH, SPEED_TO_KMH};
use crate::normalize_angle;
use crate::session::{Screen, Session};
use crate::sim::VehicleState;

/// Speedometer full scale
pub const SPEED_BAR_MAX_KMH: u32 = 160;
/// Integrity at or below this is drawn as critical
pub const CRITICAL_HEALTH: f32 = 40.0;

/// Active mission card
#[derive(Debug, Clone, PartialEq)]
pub struct MissionCard {
    pub title: String,
    pub objective: String,
    pub difficulty: &'static str,
    pub timer: String,
}

/// Everything the dashboard shows for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudReadout {
    pub speed_kmh: u32,
    /// Speedometer fill in [0, 1]
    pub speed_bar: f32,
    pub integrity: String,
    /// Integrity fill in [0, 1]
    pub integrity_bar: f32,
    pub critical: bool,
    pub mission: Option<MissionCard>,
    pub debug: Option<String>,
}

impl HudReadout {
    pub fn from_session(session: &Session, show_debug: bool) -> Self {
        let car = session.vehicle();
        let speed_kmh = speed_kmh(car.speed);
        let mission = session.mission().map(|m| MissionCard {
            title: m.title.clone(),
            objective: m.objective.clone(),
            difficulty: m.difficulty.as_str(),
            timer: format_timer(session.time_left()),
        });

        Self {
            speed_kmh,
            speed_bar: speed_bar(speed_kmh),
            integrity: format!("{}%", car.health.max(0.0).ceil() as u32),
            integrity_bar: (car.health / MAX_HEALTH).clamp(0.0, 1.0),
            critical: car.health <= CRITICAL_HEALTH,
            mission,
            debug: show_debug.then(|| debug_line(car, session.frame())),
        }
    }
}

pub fn speed_kmh(speed: f32) -> u32 {
    (speed * SPEED_TO_KMH).floor().max(0.0) as u32
}

pub fn speed_bar(kmh: u32) -> f32 {
    (kmh as f32 / SPEED_BAR_MAX_KMH as f32).min(1.0)
}

/// Seconds as `m:ss`
pub fn format_timer(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn debug_line(car: &VehicleState, frame: u64) -> String {
    format!(
        "pos ({:.0}, {:.0}) hdg {:.0}° v {:.2} frame {}",
        car.pos.x,
        car.pos.y,
        normalize_angle(car.angle).to_degrees(),
        car.speed,
        frame
    )
}

/// Game-over headline
pub fn game_over_headline(session: &Session) -> Option<&'static str> {
    if session.screen() != Screen::GameOver {
        return None;
    }
    Some(if session.vehicle().is_destroyed() {
        "VEHICLE CRITICAL FAILURE"
    } else {
        "MISSION OBJECTIVE FAILED"
    })
}
