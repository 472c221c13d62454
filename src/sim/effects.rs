//! Cosmetic effects: particles and floating text
//!
//! Nothing here feeds back into gameplay. Expired entries are removed by a
//! reverse-index sweep so removal never skips a neighbour.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::renderer::{Color, Surface, TextAlign};

/// Particle cap per game; bursts past it are dropped
pub const MAX_PARTICLES: usize = 256;

/// Life lost per reference frame
pub const PARTICLE_FADE: f32 = 0.05;
pub const FLOAT_FADE: f32 = 0.02;
/// Upward drift of floating text per reference frame
pub const FLOAT_RISE: f32 = 1.0;

/// A square spark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Color,
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// A short text popup ("+110", "SHIELD UP")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatText {
    pub pos: Vec2,
    pub text: String,
    pub life: f32,
}

/// Spawn `count` sparks at `pos` with random velocity in a 5px box,
/// colored from `palette` (round-robin by roll)
pub fn spawn_burst(
    particles: &mut Vec<Particle>,
    rng: &mut GameRng,
    pos: Vec2,
    count: usize,
    palette: &[Color],
    size: f32,
) {
    for _ in 0..count {
        if particles.len() >= MAX_PARTICLES {
            break;
        }
        let color = palette
            .get(rng.index(palette.len()))
            .copied()
            .unwrap_or(Color::WHITE);
        particles.push(Particle {
            pos,
            vel: Vec2::new(rng.jitter(5.0), rng.jitter(5.0)),
            color,
            life: 1.0,
            size,
        });
    }
}

/// Move and fade particles by `k` reference frames, dropping the dead ones
pub fn step_particles(particles: &mut Vec<Particle>, k: f32) {
    for i in (0..particles.len()).rev() {
        let p = &mut particles[i];
        p.pos += p.vel * k;
        p.life -= PARTICLE_FADE * k;
        if p.life <= 0.0 {
            particles.swap_remove(i);
        }
    }
}

/// Raise and fade floating texts by `k` reference frames
pub fn step_floats(floats: &mut Vec<FloatText>, k: f32) {
    for i in (0..floats.len()).rev() {
        let f = &mut floats[i];
        f.pos.y -= FLOAT_RISE * k;
        f.life -= FLOAT_FADE * k;
        if f.life <= 0.0 {
            floats.remove(i);
        }
    }
}

pub fn draw_particles(surface: &mut dyn Surface, particles: &[Particle]) {
    for p in particles {
        surface.set_alpha(p.life.clamp(0.0, 1.0));
        surface.fill_rect(p.pos.x, p.pos.y, p.size, p.size, p.color);
    }
    surface.set_alpha(1.0);
}

pub fn draw_floats(surface: &mut dyn Surface, floats: &[FloatText], size: f32, color: Color) {
    for f in floats {
        surface.set_alpha(f.life.clamp(0.0, 1.0));
        surface.fill_text(&f.text, f.pos.x, f.pos.y, size, TextAlign::Left, color);
    }
    surface.set_alpha(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particles_expire() {
        let mut rng = GameRng::new(1);
        let mut particles = Vec::new();
        spawn_burst(&mut particles, &mut rng, Vec2::new(10.0, 10.0), 8, &[Color::WHITE], 4.0);
        assert_eq!(particles.len(), 8);

        // 1.0 / 0.05 = 20 frames to burn out
        for _ in 0..19 {
            step_particles(&mut particles, 1.0);
        }
        assert_eq!(particles.len(), 8);
        step_particles(&mut particles, 1.0);
        step_particles(&mut particles, 1.0);
        assert!(particles.is_empty());
    }

    #[test]
    fn test_zero_step_is_frozen() {
        let mut rng = GameRng::new(2);
        let mut particles = Vec::new();
        spawn_burst(&mut particles, &mut rng, Vec2::ZERO, 3, &[], 3.0);
        let before: Vec<_> = particles.iter().map(|p| p.pos).collect();
        step_particles(&mut particles, 0.0);
        let after: Vec<_> = particles.iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_burst_respects_cap() {
        let mut rng = GameRng::new(3);
        let mut particles = Vec::new();
        spawn_burst(&mut particles, &mut rng, Vec2::ZERO, MAX_PARTICLES + 50, &[Color::RED], 3.0);
        assert_eq!(particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_floats_rise_and_expire() {
        let mut floats = vec![FloatText {
            pos: Vec2::new(0.0, 100.0),
            text: "+110".into(),
            life: 1.0,
        }];
        step_floats(&mut floats, 10.0);
        assert_eq!(floats[0].pos.y, 90.0);
        step_floats(&mut floats, 41.0);
        assert!(floats.is_empty());
    }
}
