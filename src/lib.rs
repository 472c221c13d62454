//! Pixel Arcade - a browser arcade hub of self-contained mini-games
//!
//! Core modules:
//! - `sim`: Lifecycle contract, events, input, shared collision/effect helpers
//! - `games`: Catalog plus one deterministic simulation core per title
//! - `renderer`: Drawing surface adapter (canvas 2D on web, recorder elsewhere)
//! - `host`: Frame loop and input router that drives any catalog game
//! - `audio`: Debounced sound cues synthesized with Web Audio
//! - `persistence`: LocalStorage JSON helpers

pub mod audio;
pub mod error;
pub mod games;
pub mod highscores;
pub mod host;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::ArcadeError;
pub use highscores::HighScores;
pub use host::{Host, HostPhase};
pub use settings::Settings;

/// Hub-wide constants
pub mod consts {
    /// Reference frame length the per-frame tuning values were authored against
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Longest frame the host will hand to a game (tab switches, debugger pauses)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Surface size every game is created with
    pub const SURFACE_WIDTH: f32 = 400.0;
    pub const SURFACE_HEIGHT: f32 = 600.0;
}

/// Scale factor turning a per-reference-frame quantity into one for `dt_ms`
#[inline]
pub fn frame_scale(dt_ms: f32) -> f32 {
    dt_ms.max(0.0) / consts::FRAME_MS
}

/// Split `dt_ms` into consecutive steps no longer than one reference frame.
/// Fast movers then never cover more than their per-frame distance between
/// collision checks.
pub fn substeps(dt_ms: f32) -> impl Iterator<Item = f32> {
    // Float leftovers from the split are not worth a step of their own
    const MIN_STEP_MS: f32 = 1e-3;

    let mut remaining = dt_ms.max(0.0);
    std::iter::from_fn(move || {
        if remaining <= MIN_STEP_MS {
            return None;
        }
        let step = remaining.min(consts::FRAME_MS);
        remaining -= step;
        Some(step)
    })
}
