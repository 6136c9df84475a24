//! Player settings and preferences
//!
//! Persisted in LocalStorage in the browser. Native builds read an optional JSON file
//! named by `NITRO_PULSE_SETTINGS` and then apply environment overrides.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mission::{HttpMissionSource, MissionSource, OfflineMissionSource};
use crate::tuning::Tuning;

pub const SETTINGS_PATH_VAR: &str = "NITRO_PULSE_SETTINGS";
pub const MISSION_URL_VAR: &str = "NITRO_PULSE_MISSION_URL";
pub const MISSION_TIMEOUT_VAR: &str = "NITRO_PULSE_MISSION_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the position/heading debug line on the HUD
    pub show_debug: bool,

    /// Handling overrides; missing fields keep reference values
    pub tuning: Tuning,

    // === Mission generator ===
    /// POST endpoint; `None` means offline (always the fallback mission)
    pub mission_endpoint: Option<String>,
    pub mission_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_debug: false,
            tuning: Tuning::default(),
            mission_endpoint: None,
            mission_timeout_ms: 1500,
        }
    }
}

impl Settings {
    pub fn mission_timeout(&self) -> Duration {
        Duration::from_millis(self.mission_timeout_ms)
    }

    /// Mission source for the configured endpoint
    pub fn mission_source(&self) -> Box<dyn MissionSource> {
        match self.mission_endpoint.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                match HttpMissionSource::new(url, self.mission_timeout()) {
                    Ok(source) => return Box::new(source),
                    Err(e) => log::warn!("Mission client unavailable: {e}"),
                }
            }
            _ => {}
        }
        Box::new(OfflineMissionSource)
    }

    /// Apply `NITRO_PULSE_*` overrides from a variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(MISSION_URL_VAR) {
            self.mission_endpoint = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(ms) = lookup(MISSION_TIMEOUT_VAR).and_then(|v| v.trim().parse().ok()) {
            self.mission_timeout_ms = ms;
        }
    }

    /// Flip the HUD debug line. Returns the new state.
    pub fn toggle_debug(&mut self) -> bool {
        self.show_debug = !self.show_debug;
        self.show_debug
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "nitro_pulse_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match self.to_json() {
                Ok(json) => {
                    let _ = storage.set_item(Self::STORAGE_KEY, &json);
                    log::info!("Settings saved");
                }
                Err(e) => log::warn!("Settings not saved: {e}"),
            }
        }
    }

    /// Settings file (if any) plus environment overrides
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut settings = match std::env::var(SETTINGS_PATH_VAR) {
            Ok(path) => Self::load_from_path(&path),
            Err(_) => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok());
        settings
    }

    /// Read a settings file, writing the defaults there if it does not exist yet.
    /// An unreadable or invalid file is left alone and the defaults are used.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> Self {
        let path = path.as_ref();
        match Self::load_file(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(SettingsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                match settings.save_file(path) {
                    Ok(()) => log::info!("Wrote default settings to {}", path.display()),
                    Err(e) => log::warn!("Settings not saved: {e}"),
                }
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: impl AsRef<std::path::Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"show_debug":true,"tuning":{"max_speed":6.0}}"#).unwrap();
        assert!(settings.show_debug);
        assert_eq!(settings.tuning.max_speed, 6.0);
        assert_eq!(settings.tuning.friction, Tuning::default().friction);
        assert_eq!(settings.mission_endpoint, None);
        assert_eq!(settings.mission_timeout_ms, 1500);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (MISSION_URL_VAR, "http://127.0.0.1:9000/mission"),
            (MISSION_TIMEOUT_VAR, " 250 "),
        ]
        .into_iter()
        .collect();
        let mut settings = Settings::default();
        settings.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(
            settings.mission_endpoint.as_deref(),
            Some("http://127.0.0.1:9000/mission")
        );
        assert_eq!(settings.mission_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_blank_url_and_bad_timeout_are_ignored() {
        let mut settings = Settings {
            mission_endpoint: Some("http://old".into()),
            ..Settings::default()
        };
        settings.apply_overrides(|k| match k {
            MISSION_URL_VAR => Some("  ".into()),
            MISSION_TIMEOUT_VAR => Some("soon".into()),
            _ => None,
        });
        assert_eq!(settings.mission_endpoint, None);
        assert_eq!(settings.mission_timeout_ms, 1500);
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "nitro-pulse-settings-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            show_debug: true,
            mission_endpoint: Some("http://localhost:8080".into()),
            ..Settings::default()
        };
        settings.save_file(&path).unwrap();
        let loaded = Settings::load_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_toggle_debug() {
        let mut settings = Settings::default();
        assert!(settings.toggle_debug());
        assert!(settings.show_debug);
        assert!(!settings.toggle_debug());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_gets_defaults_written() {
        let path = std::env::temp_dir().join(format!(
            "nitro-pulse-fresh-{}.json",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let settings = Settings::load_from_path(&path);
        let written = Settings::load_file(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(settings, Settings::default());
        assert_eq!(written.unwrap(), Settings::default());
    }

    #[test]
    fn test_invalid_file_is_not_overwritten() {
        let path = std::env::temp_dir().join(format!(
            "nitro-pulse-broken-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, "{oops").unwrap();

        let settings = Settings::load_from_path(&path);
        let contents = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(settings, Settings::default());
        assert_eq!(contents, "{oops");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = Settings::load_file("/nonexistent/nitro-pulse/settings.json");
        assert!(matches!(result, Err(SettingsError::Io(_))));
    }
}
