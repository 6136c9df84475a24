//! Mission provider boundary
//!
//! Missions come from an external generator. The session only ever sees a valid
//! [`Mission`]: any failure (unreachable service, bad payload) is logged and replaced
//! by a fixed fallback. One attempt per session start, no retries.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mission difficulty tag (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// A timed objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub objective: String,
    pub difficulty: Difficulty,
    pub target_speed: f32,
    /// Seconds on the countdown
    pub time_limit: u32,
}

impl Mission {
    /// Offered whenever the generator cannot deliver
    pub fn fallback() -> Self {
        Self {
            id: "fallback".to_string(),
            title: "Neon Streets Dash".to_string(),
            objective: "Maintain a speed above 5 units for 30 seconds without crashing."
                .to_string(),
            difficulty: Difficulty::Medium,
            target_speed: 5.0,
            time_limit: 30,
        }
    }
}

/// Mission payload as produced by a generator (no id yet)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionBrief {
    pub title: String,
    pub objective: String,
    pub difficulty: Difficulty,
    pub target_speed: f64,
    pub time_limit: f64,
}

impl MissionBrief {
    /// Check ranges and assign an id
    pub fn into_mission(self, id: String) -> Result<Mission, MissionError> {
        if self.title.trim().is_empty() {
            return Err(MissionError::Malformed("empty title".into()));
        }
        if !self.target_speed.is_finite() || self.target_speed < 0.0 {
            return Err(MissionError::Malformed(format!(
                "target speed {} out of range",
                self.target_speed
            )));
        }
        if !self.time_limit.is_finite()
            || self.time_limit < 1.0
            || self.time_limit > u32::MAX as f64
        {
            return Err(MissionError::Malformed(format!(
                "time limit {} out of range",
                self.time_limit
            )));
        }
        Ok(Mission {
            id,
            title: self.title,
            objective: self.objective,
            difficulty: self.difficulty,
            target_speed: self.target_speed as f32,
            time_limit: self.time_limit.round() as u32,
        })
    }
}

/// Driving history fed to the generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub avg_speed: f32,
    pub crashes: u32,
}

impl PlayerStats {
    /// Fold a finished run into the running stats
    pub fn record_run(&mut self, final_speed: f32, final_health: f32) {
        self.avg_speed = (self.avg_speed + final_speed) / 2.0;
        if final_health < crate::consts::MAX_HEALTH {
            self.crashes += 1;
        }
    }
}

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("mission service unavailable: {0}")]
    Unavailable(String),
    #[error("malformed mission payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for MissionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MissionError::Malformed(err.to_string())
        } else {
            MissionError::Unavailable(err.to_string())
        }
    }
}

/// Anything that can produce a mission brief
#[async_trait(?Send)]
pub trait MissionSource {
    async fn generate(&self, stats: &PlayerStats) -> Result<MissionBrief, MissionError>;
}

/// Used when no generator endpoint is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineMissionSource;

#[async_trait(?Send)]
impl MissionSource for OfflineMissionSource {
    async fn generate(&self, _stats: &PlayerStats) -> Result<MissionBrief, MissionError> {
        Err(MissionError::Unavailable("no mission endpoint configured".into()))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MissionRequest<'a> {
    prompt: &'a str,
    avg_speed: f32,
    crashes: u32,
}

/// Prompt sent to the generator
pub fn mission_prompt(stats: &PlayerStats) -> String {
    format!(
        "Generate a high-octane driving mission for a 2D top-down simulator.\n\
         Player status: Average speed {:.1}, Total crashes {}.\n\
         Make the mission sound exciting and slightly cinematic.",
        stats.avg_speed, stats.crashes
    )
}

/// Thin reqwest client for a JSON mission generator
#[derive(Debug, Clone)]
pub struct HttpMissionSource {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpMissionSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, MissionError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(timeout);
        #[cfg(target_arch = "wasm32")]
        let _ = timeout;
        let http = builder.build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl MissionSource for HttpMissionSource {
    async fn generate(&self, stats: &PlayerStats) -> Result<MissionBrief, MissionError> {
        let prompt = mission_prompt(stats);
        let response = self
            .http
            .post(&self.endpoint)
            .json(&MissionRequest {
                prompt: &prompt,
                avg_speed: stats.avg_speed,
                crashes: stats.crashes,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MissionError::Unavailable(format!("status {status}")));
        }

        let body = response.text().await?;
        serde_json::from_str::<MissionBrief>(&body)
            .map_err(|e| MissionError::Malformed(e.to_string()))
    }
}

/// Short random mission id (base 36)
pub fn random_mission_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Ask the source once; fall back to [`Mission::fallback`] on any failure
pub async fn request_mission(source: &dyn MissionSource, stats: &PlayerStats) -> Mission {
    let result = source
        .generate(stats)
        .await
        .and_then(|brief| brief.into_mission(random_mission_id(&mut rand::rng())));

    match result {
        Ok(mission) => {
            log::info!(
                "Mission '{}' ({}, {}s)",
                mission.title,
                mission.difficulty.as_str(),
                mission.time_limit
            );
            mission
        }
        Err(err) => {
            log::warn!("Mission generation failed, using fallback: {err}");
            Mission::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Failing;

    #[async_trait(?Send)]
    impl MissionSource for Failing {
        async fn generate(&self, _stats: &PlayerStats) -> Result<MissionBrief, MissionError> {
            Err(MissionError::Unavailable("connection refused".into()))
        }
    }

    struct Canned {
        brief: MissionBrief,
        calls: Cell<u32>,
    }

    #[async_trait(?Send)]
    impl MissionSource for Canned {
        async fn generate(&self, _stats: &PlayerStats) -> Result<MissionBrief, MissionError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.brief.clone())
        }
    }

    fn brief() -> MissionBrief {
        MissionBrief {
            title: "Harbor Run".into(),
            objective: "Reach the docks".into(),
            difficulty: Difficulty::Hard,
            target_speed: 6.5,
            time_limit: 45.0,
        }
    }

    #[tokio::test]
    async fn test_failure_returns_fallback() {
        let mission = request_mission(&Failing, &PlayerStats::default()).await;
        assert_eq!(mission, Mission::fallback());
        assert_eq!(mission.title, "Neon Streets Dash");
        assert_eq!(mission.time_limit, 30);
    }

    #[tokio::test]
    async fn test_offline_source_returns_fallback() {
        let mission = request_mission(&OfflineMissionSource, &PlayerStats::default()).await;
        assert_eq!(mission, Mission::fallback());
    }

    #[tokio::test]
    async fn test_success_gets_fresh_id_and_single_attempt() {
        let source = Canned {
            brief: brief(),
            calls: Cell::new(0),
        };
        let mission = request_mission(&source, &PlayerStats::default()).await;
        assert_eq!(source.calls.get(), 1);
        assert_eq!(mission.title, "Harbor Run");
        assert_eq!(mission.time_limit, 45);
        assert_eq!(mission.id.len(), 9);
        assert_ne!(mission.id, "fallback");
    }

    #[tokio::test]
    async fn test_invalid_brief_falls_back() {
        let source = Canned {
            brief: MissionBrief {
                time_limit: 0.0,
                ..brief()
            },
            calls: Cell::new(0),
        };
        let mission = request_mission(&source, &PlayerStats::default()).await;
        assert_eq!(mission, Mission::fallback());
    }

    #[test]
    fn test_brief_validation() {
        assert!(brief().into_mission("x".into()).is_ok());
        let bad_speed = MissionBrief {
            target_speed: f64::NAN,
            ..brief()
        };
        assert!(matches!(
            bad_speed.into_mission("x".into()),
            Err(MissionError::Malformed(_))
        ));
        let blank = MissionBrief {
            title: "  ".into(),
            ..brief()
        };
        assert!(blank.into_mission("x".into()).is_err());
    }

    #[test]
    fn test_payload_schema() {
        let json = r#"{"title":"Night Shift","objective":"Stay fast","difficulty":"Easy","targetSpeed":4,"timeLimit":60}"#;
        let brief: MissionBrief = serde_json::from_str(json).unwrap();
        assert_eq!(brief.difficulty, Difficulty::Easy);
        assert_eq!(brief.time_limit, 60.0);

        let wrong = r#"{"title":"Night Shift","difficulty":"Insane"}"#;
        assert!(serde_json::from_str::<MissionBrief>(wrong).is_err());
    }

    #[test]
    fn test_prompt_mentions_stats() {
        let prompt = mission_prompt(&PlayerStats {
            avg_speed: 3.25,
            crashes: 2,
        });
        assert!(prompt.contains("Average speed 3.2") || prompt.contains("Average speed 3.3"));
        assert!(prompt.contains("Total crashes 2"));
    }

    #[test]
    fn test_record_run() {
        let mut stats = PlayerStats::default();
        stats.record_run(6.0, 100.0);
        assert_eq!(stats.avg_speed, 3.0);
        assert_eq!(stats.crashes, 0);
        stats.record_run(2.0, 80.0);
        assert_eq!(stats.avg_speed, 2.5);
        assert_eq!(stats.crashes, 1);
    }

    #[test]
    fn test_random_id_alphabet() {
        let id = random_mission_id(&mut rand::rng());
        assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }
}
