//! Shared simulation layer
//!
//! Every catalog game implements [`Game`]. Games must stay deterministic:
//! - Seeded RNG only (see [`GameRng`])
//! - Time only from the `dt_ms` handed to `update`
//! - No platform calls; sound and score leave through the [`Outbox`]

pub mod collision;
pub mod effects;
pub mod event;
pub mod input;
pub mod rng;

pub use collision::{Rect, within_radius};
pub use effects::{FloatText, MAX_PARTICLES, Particle};
pub use event::{AudioCue, GameEvent, Outbox};
pub use input::{HeldKeys, Key};
pub use rng::GameRng;

use crate::renderer::Surface;

/// Construction parameters handed to a game factory
#[derive(Debug, Clone, Copy)]
pub struct GameContext {
    pub width: f32,
    pub height: f32,
    pub seed: u64,
}

impl GameContext {
    pub fn new(width: f32, height: f32, seed: u64) -> Self {
        Self { width, height, seed }
    }

    /// Layout math divides by the surface size; reject degenerate ones
    pub fn has_valid_geometry(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Lifecycle contract between a host and a simulation core
pub trait Game {
    /// Reset every piece of per-run state. Reports a score of 0.
    fn init(&mut self);

    /// Advance by `dt_ms` (0 redraws without advancing) and redraw everything
    fn update(&mut self, dt_ms: f32, surface: &mut dyn Surface);

    /// Cancel anything still pending. Safe to call more than once.
    fn destroy(&mut self);

    /// One discrete key press; keys a game does not use are ignored
    fn on_input(&mut self, key: Key);

    /// Keys held this frame, polled only during active play
    fn handle_input_state(&mut self, _held: &HeldKeys) {}

    /// Events raised since the last call, oldest first
    fn take_events(&mut self) -> Vec<GameEvent>;

    /// Current cumulative score
    fn score(&self) -> u64;
}
