//! Player preferences
//!
//! Persisted separately from high scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence;

/// Volume restored when unmuting
pub const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display name; `None` until the player picks one
    pub username: Option<String>,
    /// Sound volume (0.0 - 1.0); 0 means muted
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: None,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl Settings {
    const STORAGE_KEY: &'static str = "settings";

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Set the display name; blank names are rejected
    pub fn set_username(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.username = Some(name.to_string());
        true
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn is_muted(&self) -> bool {
        self.volume <= 0.0
    }

    /// Muted goes back to the default volume; anything else mutes
    pub fn toggle_mute(&mut self) {
        self.volume = if self.is_muted() { DEFAULT_VOLUME } else { 0.0 };
    }

    pub fn load() -> Self {
        persistence::load_or_default(Self::STORAGE_KEY)
    }

    pub fn save(&self) -> Result<()> {
        persistence::save_json(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
