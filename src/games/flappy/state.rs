//! Side-scroller state and tuning

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{GameContext, GameRng, Outbox, Particle, Rect};

/// Phase of a side-scroller run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlappyPhase {
    /// Bird hovers, waiting for the first flap
    Idle,
    /// Gravity on, pipes scrolling
    Active,
    /// Crashed; holds the last frame until restart
    Terminal,
}

/// Gameplay balance. Per-frame values are per 1/60 s reference frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlappyTuning {
    /// Downward acceleration (px/frame²)
    pub gravity: f32,
    /// Vertical velocity set by a flap (px/frame, negative is up)
    pub flap_velocity: f32,
    /// Leftward pipe speed (px/frame)
    pub pipe_speed: f32,
    /// Frames between pipe spawns
    pub spawn_every_frames: f32,
    /// Vertical opening between the top and bottom pipe
    pub gap_size: f32,
    pub pipe_width: f32,
    /// Shortest allowed top pipe, and the shortest bottom pipe above the ground margin
    pub min_pipe: f32,
    /// Extra clearance kept free above the ground when placing gaps
    pub ground_margin: f32,
    pub ground_height: f32,
    /// Pipes are dropped once their left edge passes this x
    pub despawn_x: f32,
    pub bird_x: f32,
    pub bird_size: (f32, f32),
    /// Hitbox shrink per side so grazes feel fair
    pub hitbox_inset: (f32, f32),
    /// Max tilt either way (radians)
    pub max_tilt: f32,
    /// Tilt per unit of vertical velocity
    pub tilt_per_velocity: f32,
    /// Idle hover amplitude (px) and period divisor (ms)
    pub hover_amplitude: f32,
    pub hover_period_ms: f32,
}

impl Default for FlappyTuning {
    /// Gravity and flap are 0.8 and -8 rather than a floatier 0.5 and -7:
    /// a flap has to peak and turn into a fall within 200 ms (10 frames).
    fn default() -> Self {
        Self {
            gravity: 0.8,
            flap_velocity: -8.0,
            pipe_speed: 3.0,
            spawn_every_frames: 110.0,
            gap_size: 140.0,
            pipe_width: 50.0,
            min_pipe: 50.0,
            ground_margin: 50.0,
            ground_height: 20.0,
            despawn_x: -60.0,
            bird_x: 50.0,
            bird_size: (30.0, 24.0),
            hitbox_inset: (3.0, 2.0),
            max_tilt: std::f32::consts::FRAC_PI_4,
            tilt_per_velocity: 0.1,
            hover_amplitude: 10.0,
            hover_period_ms: 300.0,
        }
    }
}

impl FlappyTuning {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The player-controlled bird
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    /// Center of the sprite
    pub pos: Vec2,
    /// Vertical velocity (px/frame, positive is falling)
    pub vel_y: f32,
    /// Visual tilt only
    pub rotation: f32,
    pub size: (f32, f32),
}

impl Bird {
    pub fn new(x: f32, y: f32, size: (f32, f32)) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel_y: 0.0,
            rotation: 0.0,
            size,
        }
    }

    /// Collision box, shrunk from the sprite
    pub fn hitbox(&self, inset: (f32, f32)) -> Rect {
        Rect::centered(self.pos, self.size.0, self.size.1).inset(inset.0, inset.1)
    }
}

/// A top/bottom pipe pair sharing one gap
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipe {
    pub id: u32,
    /// Left edge
    pub x: f32,
    /// Height of the top pipe; the gap starts here
    pub top_height: f32,
    /// Set once the bird has cleared this pipe
    pub passed: bool,
}

impl Pipe {
    pub fn top_rect(&self, width: f32) -> Rect {
        Rect::new(self.x, 0.0, width, self.top_height)
    }

    pub fn bottom_rect(&self, width: f32, gap: f32, surface_height: f32) -> Rect {
        let y = self.top_height + gap;
        Rect::new(self.x, y, width, (surface_height - y).max(0.0))
    }
}

/// Background decor, drifts forever
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cloud {
    pub pos: Vec2,
    pub speed: f32,
    pub scale: f32,
}

pub const CLOUD_COUNT: usize = 5;

/// Complete side-scroller state
#[derive(Debug, Clone)]
pub struct FlappyState {
    pub tuning: FlappyTuning,
    pub width: f32,
    pub height: f32,
    pub phase: FlappyPhase,
    pub bird: Bird,
    pub pipes: Vec<Pipe>,
    pub particles: Vec<Particle>,
    pub clouds: Vec<Cloud>,
    /// Reference frames accumulated toward the next pipe spawn
    pub spawn_frames: f32,
    /// Simulation time, drives the idle hover
    pub clock_ms: f64,
    pub rng: GameRng,
    pub outbox: Outbox,
    next_id: u32,
}

impl FlappyState {
    pub fn new(ctx: GameContext, tuning: FlappyTuning) -> Self {
        let mut rng = GameRng::new(ctx.seed);
        let clouds = (0..CLOUD_COUNT)
            .map(|_| Cloud {
                pos: Vec2::new(rng.range(0.0, ctx.width), rng.range(0.0, ctx.height / 2.0)),
                speed: 0.5 + rng.unit(),
                scale: 0.5 + rng.unit(),
            })
            .collect();

        let bird = Bird::new(tuning.bird_x, ctx.height / 2.0, tuning.bird_size);
        Self {
            tuning,
            width: ctx.width,
            height: ctx.height,
            phase: FlappyPhase::Idle,
            bird,
            pipes: Vec::new(),
            particles: Vec::new(),
            clouds,
            spawn_frames: 0.0,
            clock_ms: 0.0,
            rng,
            outbox: Outbox::new(),
            next_id: 1,
        }
    }

    /// Back to the hovering start; reports score 0
    pub fn reset(&mut self) {
        self.bird = Bird::new(self.tuning.bird_x, self.height / 2.0, self.tuning.bird_size);
        self.pipes.clear();
        self.particles.clear();
        self.spawn_frames = 0.0;
        self.phase = FlappyPhase::Idle;
        self.outbox.reset();
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// y of the ground line the bird must not touch
    pub fn ground_y(&self) -> f32 {
        self.height - self.tuning.ground_height
    }

    /// Allowed range for a pipe's top height
    pub fn gap_band(&self) -> (f32, f32) {
        let t = &self.tuning;
        let min = t.min_pipe;
        let max = self.height - t.gap_size - t.min_pipe - t.ground_margin;
        (min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuning_partial_override() {
        let t = FlappyTuning::from_json(r#"{ "gravity": 0.5, "gap_size": 160.0 }"#).unwrap();
        assert_eq!(t.gravity, 0.5);
        assert_eq!(t.gap_size, 160.0);
        assert_eq!(t.pipe_speed, FlappyTuning::default().pipe_speed);
    }

    #[test]
    fn test_tuning_rejects_garbage() {
        assert!(FlappyTuning::from_json("not json").is_err());
    }

    #[test]
    fn test_gap_band() {
        let state = FlappyState::new(GameContext::new(400.0, 600.0, 1), FlappyTuning::default());
        assert_eq!(state.gap_band(), (50.0, 360.0));

        // Too short to fit a gap: band collapses instead of inverting
        let tiny = FlappyState::new(GameContext::new(400.0, 100.0, 1), FlappyTuning::default());
        let (min, max) = tiny.gap_band();
        assert_eq!(min, max);
    }

    #[test]
    fn test_hitbox_is_shrunk() {
        let bird = Bird::new(50.0, 300.0, (30.0, 24.0));
        assert_eq!(bird.hitbox((3.0, 2.0)), Rect::new(38.0, 290.0, 24.0, 20.0));
    }
}
