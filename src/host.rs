//! Host loop and input router
//!
//! Drives one catalog game through `Start -> Playing -> GameOver`, owns the
//! held-key set, mirrors the score and keeps personal bests. Platform code
//! feeds it key/click events and frame times; it never touches a game's
//! internals.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FRAME_MS;
use crate::error::{ArcadeError, Result};
use crate::games::{self, GameMetadata};
use crate::highscores::HighScores;
use crate::renderer::{Color, Surface, TextAlign};
use crate::sim::{AudioCue, Game, GameContext, GameEvent, HeldKeys, Key};

/// Host-level run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostPhase {
    /// Game constructed, redrawn without advancing
    Start,
    Playing,
    /// Final score reported; the game keeps animating underneath
    GameOver,
}

const SCORE_COLOR: Color = Color::hex(0xffffff);
const TITLE_COLOR: Color = Color::hex(0xffec27);
const ALERT_COLOR: Color = Color::hex(0xff77a8);

pub struct Host {
    meta: GameMetadata,
    game: Box<dyn Game>,
    phase: HostPhase,
    held: HeldKeys,
    score: u64,
    high_scores: HighScores,
    /// Set when the last run beat the stored best
    new_best: bool,
    cues: Vec<AudioCue>,
}

impl Host {
    /// Build the host around catalog game `game_id`
    pub fn new(game_id: &str, ctx: GameContext, high_scores: HighScores) -> Result<Self> {
        let game = games::create(game_id, ctx)?;
        Self::with_game(game_id, game, high_scores)
    }

    /// Same as [`Host::new`], with the game's tuning overridden from JSON
    pub fn with_tuning(game_id: &str, ctx: GameContext, high_scores: HighScores, tuning: &str) -> Result<Self> {
        let game = games::create_tuned(game_id, ctx, tuning)?;
        Self::with_game(game_id, game, high_scores)
    }

    fn with_game(game_id: &str, game: Box<dyn Game>, high_scores: HighScores) -> Result<Self> {
        let meta = games::get_game(game_id)
            .map(|g| g.meta)
            .ok_or_else(|| ArcadeError::UnknownGame(game_id.to_string()))?;
        Ok(Self {
            meta,
            game,
            phase: HostPhase::Start,
            held: HeldKeys::new(),
            score: 0,
            high_scores,
            new_best: false,
            cues: Vec::new(),
        })
    }

    pub fn phase(&self) -> HostPhase {
        self.phase
    }

    pub fn meta(&self) -> &GameMetadata {
        &self.meta
    }

    /// Score as last reported by the game
    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best(&self) -> u64 {
        self.high_scores.best(self.meta.id)
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Sound cues raised since the last call
    pub fn take_cues(&mut self) -> Vec<AudioCue> {
        std::mem::take(&mut self.cues)
    }

    /// (Re)start a run
    pub fn start(&mut self) {
        log::info!("Starting {}", self.meta.name);
        self.game.init();
        self.phase = HostPhase::Playing;
        self.new_best = false;
        self.pump_events();
    }

    pub fn key_down(&mut self, key: Key) {
        if key != Key::Click {
            self.held.press(key);
        }

        match self.phase {
            HostPhase::Start if matches!(key, Key::Space | Key::Enter | Key::Click) => self.start(),
            HostPhase::Playing => self.game.on_input(key),
            HostPhase::GameOver if matches!(key, Key::KeyR | Key::Click) => self.start(),
            _ => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.release(key);
    }

    /// Raw `KeyboardEvent.code`; codes no game uses are dropped
    pub fn key_down_code(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.key_down(key);
        }
    }

    pub fn key_up_code(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.key_up(key);
        }
    }

    pub fn click(&mut self) {
        self.key_down(Key::Click);
    }

    /// Forget held keys (focus loss)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    /// Run one animation frame and draw the host overlay on top
    pub fn frame(&mut self, dt_ms: f32, surface: &mut dyn Surface) {
        let dt = dt_ms.clamp(0.0, MAX_FRAME_MS);
        match self.phase {
            HostPhase::Start => self.game.update(0.0, surface),
            HostPhase::Playing => {
                self.game.handle_input_state(&self.held);
                self.game.update(dt, surface);
            }
            HostPhase::GameOver => self.game.update(dt, surface),
        }
        self.pump_events();
        self.draw_overlay(surface);
    }

    /// Leave the game for good
    pub fn shutdown(&mut self) {
        self.game.destroy();
    }

    fn pump_events(&mut self) {
        for event in self.game.take_events() {
            match event {
                GameEvent::ScoreChanged(score) => self.score = score,
                GameEvent::Sound(cue) => self.cues.push(cue),
                GameEvent::GameOver { final_score } => self.finish(final_score),
            }
        }
    }

    fn finish(&mut self, final_score: u64) {
        if self.phase != HostPhase::Playing {
            return;
        }
        self.phase = HostPhase::GameOver;
        self.score = final_score;
        self.held.clear();

        self.new_best = self.high_scores.record(self.meta.id, final_score);
        if self.new_best {
            if let Err(e) = self.high_scores.save() {
                log::warn!("Could not save high scores: {}", e);
            }
        }
    }

    fn draw_overlay(&self, surface: &mut dyn Surface) {
        let (w, h) = (surface.width(), surface.height());
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        let score = self.score.to_string();
        surface.fill_text(&score, w / 2.0 + 3.0, 63.0, 32.0, TextAlign::Center, Color::BLACK);
        surface.fill_text(&score, w / 2.0, 60.0, 32.0, TextAlign::Center, SCORE_COLOR);

        match self.phase {
            HostPhase::Start => {
                surface.fill_rect(0.0, 0.0, w, h, Color::rgba(0, 0, 0, 0.4));
                surface.fill_text("READY?", w / 2.0, h / 2.0, 24.0, TextAlign::Center, TITLE_COLOR);
                surface.fill_text(
                    self.meta.controls,
                    w / 2.0,
                    h / 2.0 + 30.0,
                    8.0,
                    TextAlign::Center,
                    SCORE_COLOR,
                );
            }
            HostPhase::GameOver => {
                surface.fill_rect(0.0, 0.0, w, h, Color::rgba(0, 0, 0, 0.9));
                surface.fill_text("GAME OVER", w / 2.0, h / 2.0 - 40.0, 24.0, TextAlign::Center, ALERT_COLOR);
                let line = format!("SCORE: {}", self.score);
                surface.fill_text(&line, w / 2.0, h / 2.0, 14.0, TextAlign::Center, SCORE_COLOR);
                let best = if self.new_best {
                    "NEW BEST!".to_string()
                } else {
                    format!("BEST: {}", self.best())
                };
                surface.fill_text(&best, w / 2.0, h / 2.0 + 25.0, 12.0, TextAlign::Center, TITLE_COLOR);
                surface.fill_text("CLICK OR R TO RESTART", w / 2.0, h / 2.0 + 60.0, 10.0, TextAlign::Center, SCORE_COLOR);
            }
            HostPhase::Playing => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{FRAME_MS, SURFACE_HEIGHT, SURFACE_WIDTH};
    use crate::renderer::DrawList;

    fn host(id: &str) -> Host {
        let ctx = GameContext::new(SURFACE_WIDTH, SURFACE_HEIGHT, 42);
        Host::new(id, ctx, HighScores::new()).unwrap()
    }

    fn surface() -> DrawList {
        DrawList::new(SURFACE_WIDTH, SURFACE_HEIGHT)
    }

    #[test]
    fn test_unknown_game() {
        let ctx = GameContext::new(SURFACE_WIDTH, SURFACE_HEIGHT, 1);
        let err = Host::new("asteroids", ctx, HighScores::new()).err();
        assert!(matches!(err, Some(ArcadeError::UnknownGame(_))));
    }

    #[test]
    fn test_start_screen_does_not_advance() {
        let mut host = host("space-invaders");
        let mut list = surface();
        for _ in 0..30 {
            list.clear();
            host.frame(FRAME_MS, &mut list);
        }
        assert_eq!(host.phase(), HostPhase::Start);
        assert!(list.has_text("READY?"));

        // Movement keys do nothing before the run starts
        host.key_down(Key::KeyR);
        host.key_down(Key::ArrowLeft);
        assert_eq!(host.phase(), HostPhase::Start);
    }

    #[test]
    fn test_start_hint_follows_the_game() {
        let mut list = surface();
        host("flappy-bird").frame(FRAME_MS, &mut list);
        assert!(list.has_text("TAP OR SPACE TO FLY"));
        assert!(!list.has_text("ARROW KEYS TO MOVE / SPACE TO SHOOT"));

        list.clear();
        host("space-invaders").frame(FRAME_MS, &mut list);
        assert!(list.has_text("ARROW KEYS TO MOVE / SPACE TO SHOOT"));
    }

    #[test]
    fn test_tuning_overrides() {
        let ctx = GameContext::new(SURFACE_WIDTH, SURFACE_HEIGHT, 42);
        let mut host = Host::with_tuning("flappy-bird", ctx, HighScores::new(), r#"{ "gravity": 0.0 }"#).unwrap();
        host.key_down(Key::Space);
        host.click();
        let mut list = surface();
        // Without gravity the bird coasts up to the ceiling and stays alive
        // until the first pipe arrives
        for _ in 0..60 {
            host.frame(FRAME_MS, &mut list);
        }
        assert_eq!(host.phase(), HostPhase::Playing);

        let bad = Host::with_tuning("flappy-bird", ctx, HighScores::new(), "gravity = 0");
        assert!(matches!(bad.err(), Some(ArcadeError::Serialization(_))));
    }

    #[test]
    fn test_enter_starts() {
        let mut host = host("space-invaders");
        host.key_down(Key::Enter);
        assert_eq!(host.phase(), HostPhase::Playing);
        assert_eq!(host.score(), 0);
    }

    #[test]
    fn test_held_keys_reach_the_game() {
        let mut host = host("space-invaders");
        host.key_down(Key::Space);
        host.key_up(Key::Space);
        let mut list = surface();

        host.key_down_code("ArrowRight");
        host.key_down_code("Space");
        for _ in 0..5 {
            host.frame(FRAME_MS, &mut list);
        }
        assert!(host.take_cues().contains(&AudioCue::Shoot));

        host.key_up_code("Space");
        host.key_up_code("ArrowRight");
        host.key_down_code("F13");
        assert_eq!(host.phase(), HostPhase::Playing);
    }

    #[test]
    fn test_flappy_run_records_best() {
        let mut host = host("flappy-bird");
        host.key_down(Key::Space);
        assert_eq!(host.phase(), HostPhase::Playing);
        // First press in play leaves the hover, then the bird drops
        host.click();
        let mut list = surface();
        for _ in 0..400 {
            list.clear();
            host.frame(FRAME_MS, &mut list);
            if host.phase() == HostPhase::GameOver {
                break;
            }
        }
        assert_eq!(host.phase(), HostPhase::GameOver);
        assert!(list.has_text("CLICK OR R TO RESTART"));
        assert_eq!(host.best(), host.score());

        // Space does not restart from here, R does
        host.key_down(Key::Space);
        assert_eq!(host.phase(), HostPhase::GameOver);
        host.key_down(Key::KeyR);
        assert_eq!(host.phase(), HostPhase::Playing);
        assert_eq!(host.score(), 0);
    }

    #[test]
    fn test_game_over_reported_once() {
        let mut host = host("space-invaders");
        host.start();
        host.high_scores.record("space-invaders", 10_000);
        let mut list = surface();

        host.finish(300);
        host.finish(900);
        assert_eq!(host.score(), 300);
        assert_eq!(host.best(), 10_000);
        host.frame(FRAME_MS, &mut list);
        assert!(list.has_text("BEST: 10000"));
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut host = host("flappy-bird");
        host.start();
        host.key_down(Key::Space);
        let mut list = surface();
        // A 10 s stall counts as a single 100 ms step
        host.frame(10_000.0, &mut list);
        assert_eq!(host.phase(), HostPhase::Playing);
    }
}
