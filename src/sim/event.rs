//! Outbound notifications from a simulation core to its host

use serde::{Deserialize, Serialize};

/// Named sound requests; playback is fire-and-forget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioCue {
    Shoot,
    Explode,
    Powerup,
    Jump,
    Score,
    Shield,
    Missile,
    BossHit,
}

impl AudioCue {
    pub const ALL: [AudioCue; 8] = [
        AudioCue::Shoot,
        AudioCue::Explode,
        AudioCue::Powerup,
        AudioCue::Jump,
        AudioCue::Score,
        AudioCue::Shield,
        AudioCue::Missile,
        AudioCue::BossHit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioCue::Shoot => "shoot",
            AudioCue::Explode => "explode",
            AudioCue::Powerup => "powerup",
            AudioCue::Jump => "jump",
            AudioCue::Score => "score",
            AudioCue::Shield => "shield",
            AudioCue::Missile => "missile",
            AudioCue::BossHit => "boss_hit",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Something the host needs to know about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Cumulative score after a change
    ScoreChanged(u64),
    /// Terminal condition reached; raised once per run
    GameOver { final_score: u64 },
    Sound(AudioCue),
}

/// Score bookkeeping plus the event queue drained by the host.
///
/// The score only grows until `reset`, and `game_over` latches so a run
/// can never report its final score twice.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    events: Vec<GameEvent>,
    score: u64,
    finished: bool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run at score 0
    pub fn reset(&mut self) {
        self.events.clear();
        self.score = 0;
        self.finished = false;
        self.events.push(GameEvent::ScoreChanged(0));
    }

    pub fn add_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score += points;
        self.events.push(GameEvent::ScoreChanged(self.score));
    }

    pub fn cue(&mut self, cue: AudioCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Latch the run as over. Returns false if it already was.
    pub fn game_over(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        log::info!("Game over with score {}", self.score);
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
        });
        true
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_reports_zero() {
        let mut out = Outbox::new();
        out.add_score(10);
        out.reset();
        assert_eq!(out.drain(), vec![GameEvent::ScoreChanged(0)]);
        assert_eq!(out.score(), 0);
    }

    #[test]
    fn test_every_change_is_reported() {
        let mut out = Outbox::new();
        out.add_score(100);
        out.add_score(0);
        out.add_score(2000);
        assert_eq!(
            out.drain(),
            vec![GameEvent::ScoreChanged(100), GameEvent::ScoreChanged(2100)]
        );
    }

    #[test]
    fn test_game_over_latches() {
        let mut out = Outbox::new();
        out.add_score(5);
        assert!(out.game_over());
        assert!(!out.game_over());
        let overs = out
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert!(out.is_finished());
    }

    #[test]
    fn test_cue_names() {
        let names: Vec<_> = AudioCue::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            ["shoot", "explode", "powerup", "jump", "score", "shield", "missile", "boss_hit"]
        );
        for (i, cue) in AudioCue::ALL.iter().enumerate() {
            assert_eq!(cue.index(), i);
        }
    }
}
