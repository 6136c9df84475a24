//! Session controller
//!
//! Owns the screen flow, the live vehicle, the mission countdown and the player
//! stats. The frame and countdown drivers call into it; nothing else mutates it.

use serde::{Deserialize, Serialize};

use crate::mission::{Mission, PlayerStats};
use crate::sim::{
    CrashEvent, InputSnapshot, Integrator, VehicleColor, VehicleState, WorldModel, step,
};
use crate::tuning::Tuning;

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    #[default]
    Menu,
    /// Waiting on the mission provider; no loop is running
    MissionSelect,
    Playing,
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    VehicleDestroyed,
    TimeUp,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::VehicleDestroyed => "Vehicle destroyed",
            EndReason::TimeUp => "Time up",
        }
    }
}

/// Kind of run in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Mission,
    FreeRoam,
}

#[derive(Debug, Clone)]
pub struct Session {
    screen: Screen,
    vehicle: VehicleState,
    mission: Option<Mission>,
    /// Seconds left on the mission countdown
    time_left: u32,
    stats: PlayerStats,
    end_reason: Option<EndReason>,
    integrator: Integrator,
    /// Frames stepped in the current run
    frame: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Tuning::default())
    }
}

impl Session {
    pub fn new(tuning: Tuning) -> Self {
        Self {
            screen: Screen::Menu,
            vehicle: VehicleState::default(),
            mission: None,
            time_left: 0,
            stats: PlayerStats::default(),
            end_reason: None,
            integrator: Integrator::new(tuning),
            frame: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn vehicle(&self) -> &VehicleState {
        &self.vehicle
    }

    pub fn mission(&self) -> Option<&Mission> {
        self.mission.as_ref()
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn stats(&self) -> &PlayerStats {
        &self.stats
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn tuning(&self) -> &Tuning {
        &self.integrator.tuning
    }

    pub fn is_playing(&self) -> bool {
        self.screen == Screen::Playing
    }

    /// Mode of the current or last run
    pub fn run_mode(&self) -> RunMode {
        if self.mission.is_some() {
            RunMode::Mission
        } else {
            RunMode::FreeRoam
        }
    }

    /// Whether the countdown driver should be running
    pub fn has_countdown(&self) -> bool {
        self.is_playing() && self.mission.is_some()
    }

    /// Menu to mission select. Returns false from any other screen.
    pub fn begin_mission_request(&mut self) -> bool {
        if self.screen != Screen::Menu {
            return false;
        }
        self.screen = Screen::MissionSelect;
        true
    }

    /// Start a timed run
    pub fn start_mission(&mut self, mission: Mission) {
        log::info!("Run started: mission '{}' ({}s)", mission.title, mission.time_limit);
        self.time_left = mission.time_limit;
        self.mission = Some(mission);
        self.reset_run(VehicleColor::Primary);
    }

    /// Start an untimed run with no objective
    pub fn start_free_roam(&mut self) {
        log::info!("Run started: free roam");
        self.time_left = 0;
        self.mission = None;
        self.reset_run(VehicleColor::Secondary);
    }

    fn reset_run(&mut self, color: VehicleColor) {
        self.vehicle = VehicleState::spawn(color);
        self.end_reason = None;
        self.frame = 0;
        self.screen = Screen::Playing;
    }

    /// One frame of driving. No-op unless playing.
    pub fn advance_frame(
        &mut self,
        input: &InputSnapshot,
        world: &WorldModel,
    ) -> Option<CrashEvent> {
        if !self.is_playing() {
            return None;
        }

        let outcome = step(&self.vehicle, input, world, &self.integrator);
        self.vehicle = outcome.vehicle;
        self.frame += 1;

        if let Some(crash) = outcome.crash {
            self.vehicle = self.vehicle.damaged(crash.damage);
            log::debug!(
                "Crash at ({:.0}, {:.0}): -{:.1}, integrity {:.1}",
                self.vehicle.pos.x,
                self.vehicle.pos.y,
                crash.damage,
                self.vehicle.health
            );
            if self.vehicle.is_destroyed() {
                self.end_run(EndReason::VehicleDestroyed);
            }
        }

        outcome.crash
    }

    /// One countdown second. Returns true if this ended the run.
    pub fn countdown_second(&mut self) -> bool {
        if !self.has_countdown() || self.time_left == 0 {
            return false;
        }
        if self.time_left <= 1 {
            self.time_left = 0;
            self.end_run(EndReason::TimeUp);
            return true;
        }
        self.time_left -= 1;
        false
    }

    /// Drop whatever is happening and go back to the menu
    pub fn abort(&mut self) {
        if self.screen == Screen::Playing {
            log::info!("Run aborted after {} frames", self.frame);
        }
        self.screen = Screen::Menu;
        self.end_reason = None;
    }

    /// Leave the game-over screen. Returns false from any other screen.
    pub fn return_to_menu(&mut self) -> bool {
        if self.screen != Screen::GameOver {
            return false;
        }
        self.screen = Screen::Menu;
        true
    }

    fn end_run(&mut self, reason: EndReason) {
        self.screen = Screen::GameOver;
        self.end_reason = Some(reason);
        self.stats.record_run(self.vehicle.speed, self.vehicle.health);
        log::info!(
            "Run ended: {} after {} frames (avg speed {:.2}, crashes {})",
            reason.as_str(),
            self.frame,
            self.stats.avg_speed,
            self.stats.crashes
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn forward() -> InputSnapshot {
        InputSnapshot {
            forward: true,
            ..Default::default()
        }
    }

    fn short_mission(seconds: u32) -> Mission {
        Mission {
            time_limit: seconds,
            ..Mission::fallback()
        }
    }

    #[test]
    fn test_screen_flow() {
        let mut session = Session::default();
        assert_eq!(session.screen(), Screen::Menu);
        assert!(session.begin_mission_request());
        assert_eq!(session.screen(), Screen::MissionSelect);
        assert!(!session.begin_mission_request());

        session.start_mission(Mission::fallback());
        assert_eq!(session.screen(), Screen::Playing);
        assert!(!session.return_to_menu());

        session.abort();
        assert_eq!(session.screen(), Screen::Menu);
    }

    #[test]
    fn test_mission_start_resets_vehicle() {
        let mut session = Session::default();
        session.start_free_roam();
        let world = WorldModel::default();
        for _ in 0..50 {
            session.advance_frame(&forward(), &world);
        }
        assert!(session.vehicle().speed > 0.0);

        session.start_mission(Mission::fallback());
        let car = session.vehicle();
        assert_eq!(car.pos, Vec2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.health, MAX_HEALTH);
        assert_eq!(car.color, VehicleColor::Primary);
        assert_eq!(session.time_left(), 30);
        assert_eq!(session.frame(), 0);
        assert_eq!(session.run_mode(), RunMode::Mission);
    }

    #[test]
    fn test_free_roam_has_no_countdown() {
        let mut session = Session::default();
        session.start_free_roam();
        assert_eq!(session.vehicle().color, VehicleColor::Secondary);
        assert!(session.mission().is_none());
        assert!(!session.has_countdown());
        assert!(!session.countdown_second());
        assert!(session.is_playing());
    }

    #[test]
    fn test_advance_is_noop_outside_play() {
        let mut session = Session::default();
        let world = WorldModel::default();
        let before = *session.vehicle();
        assert!(session.advance_frame(&forward(), &world).is_none());
        assert_eq!(*session.vehicle(), before);
        assert_eq!(session.frame(), 0);
    }

    #[test]
    fn test_countdown_reaches_time_up() {
        let mut session = Session::default();
        session.start_mission(short_mission(3));

        assert!(!session.countdown_second());
        assert_eq!(session.time_left(), 2);
        assert!(!session.countdown_second());
        assert_eq!(session.time_left(), 1);
        assert!(session.countdown_second());
        assert_eq!(session.time_left(), 0);
        assert_eq!(session.screen(), Screen::GameOver);
        assert_eq!(session.end_reason(), Some(EndReason::TimeUp));

        // Nothing ticks once the run is over
        assert!(!session.countdown_second());
        assert!(session.return_to_menu());
        assert_eq!(session.screen(), Screen::Menu);
    }

    #[test]
    fn test_time_up_records_stats() {
        let mut session = Session::default();
        session.start_mission(short_mission(1));
        assert!(session.countdown_second());
        // Ended at rest and unharmed
        assert_eq!(session.stats().avg_speed, 0.0);
        assert_eq!(session.stats().crashes, 0);
    }

    #[test]
    fn test_wall_crashes_destroy_vehicle() {
        let mut session = Session::default();
        let world = WorldModel::default();
        session.start_mission(Mission::fallback());

        let mut crashes = 0;
        let mut last_health = MAX_HEALTH;
        for _ in 0..5000 {
            if !session.is_playing() {
                break;
            }
            if let Some(crash) = session.advance_frame(&forward(), &world) {
                assert!(crash.damage > 0.0);
                crashes += 1;
            }
            assert!(session.vehicle().health <= last_health);
            last_health = session.vehicle().health;
        }

        assert!(crashes > 1);
        assert_eq!(session.screen(), Screen::GameOver);
        assert_eq!(session.end_reason(), Some(EndReason::VehicleDestroyed));
        assert_eq!(session.vehicle().health, 0.0);
        assert_eq!(session.stats().crashes, 1);

        // Frozen after the run ends
        let frame = session.frame();
        assert!(session.advance_frame(&forward(), &world).is_none());
        assert_eq!(session.frame(), frame);
    }

    #[test]
    fn test_abort_from_any_screen() {
        for setup in [0, 1, 2] {
            let mut session = Session::default();
            match setup {
                0 => {
                    session.begin_mission_request();
                }
                1 => session.start_free_roam(),
                _ => {
                    session.start_mission(short_mission(1));
                    session.countdown_second();
                }
            }
            session.abort();
            assert_eq!(session.screen(), Screen::Menu);
            assert!(session.end_reason().is_none());
        }
    }

    fn any_input() -> impl Strategy<Value = InputSnapshot> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(forward, reverse, left, right, handbrake)| InputSnapshot {
                forward,
                reverse,
                left,
                right,
                handbrake,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_health_is_monotone_and_bounded(inputs in prop::collection::vec(any_input(), 1..600)) {
            let mut session = Session::default();
            let world = WorldModel::open(600.0);
            session.start_free_roam();
            let mut last = session.vehicle().health;
            for input in &inputs {
                session.advance_frame(input, &world);
                let car = session.vehicle();
                prop_assert!(car.health <= last);
                prop_assert!((0.0..=MAX_HEALTH).contains(&car.health));
                prop_assert!(car.speed <= MAX_SPEED + 1e-4);
                last = car.health;
            }
        }
    }
}
