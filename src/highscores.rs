//! Personal bests
//!
//! One best score per game id, persisted to LocalStorage. A run only
//! replaces the stored value when it beats it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub best: BTreeMap<String, u64>,
}

impl HighScores {
    /// Storage entry name
    const STORAGE_KEY: &'static str = "highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Best score for a game, 0 if it was never played
    pub fn best(&self, game_id: &str) -> u64 {
        self.best.get(game_id).copied().unwrap_or(0)
    }

    /// Keep the larger of the stored best and `score`.
    /// Returns true when `score` is a new best.
    pub fn record(&mut self, game_id: &str, score: u64) -> bool {
        let old = self.best(game_id);
        if score <= old {
            return false;
        }
        self.best.insert(game_id.to_string(), score);
        log::info!("New best for {}: {} (was {})", game_id, score, old);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    pub fn load() -> Self {
        persistence::load_or_default(Self::STORAGE_KEY)
    }

    pub fn save(&self) -> Result<()> {
        persistence::save_json(Self::STORAGE_KEY, self)?;
        log::info!("High scores saved ({} games)", self.best.len());
        Ok(())
    }
}
