//! Game settings and preferences
//!
//! Persisted as JSON next to the binary, separate from gameplay tuning.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Gameplay ===
    /// Let the AI play (demo mode)
    pub autopilot: bool,
    /// Tuning preset name (`arcade` or `classic`)
    pub preset: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            autopilot: true,
            preset: "arcade".to_string(),
        }
    }
}

impl Settings {
    /// Default settings file name
    pub const FILE_NAME: &'static str = "lane_dash_settings.json";

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let Ok(json) = std::fs::read_to_string(path) else {
            log::info!("Using default settings");
            return Self::default();
        };
        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Settings file {} invalid ({e}), using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save(&self, path: &Path) {
        let json = match serde_json::to_string_pretty(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize settings: {e}");
                return;
            }
        };
        match std::fs::write(path, json) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings to {}: {e}", path.display()),
        }
    }
}
