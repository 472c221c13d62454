//! Side-scroller frame step
//!
//! Advances bird physics, pipe spawning/scrolling, collisions and scoring.

use glam::Vec2;

use super::state::{FlappyPhase, FlappyState, Pipe};
use crate::{frame_scale, substeps};
use crate::renderer::Color;
use crate::sim::{AudioCue, Key, effects};

/// Spark colors for score bursts and flap puffs
pub const SPARK_PALETTE: [Color; 3] = [Color::hex(0xffffff), Color::hex(0xffec27), Color::hex(0xfa6a0a)];

/// Advance the world by `dt_ms`. A zero step leaves everything in place.
pub fn step(state: &mut FlappyState, dt_ms: f32) {
    for dt in substeps(dt_ms) {
        step_frame(state, dt);
    }
}

/// One step of at most a reference frame
fn step_frame(state: &mut FlappyState, dt: f32) {
    let k = frame_scale(dt);
    state.clock_ms += dt as f64;

    // Decor and sparks keep moving in every phase
    for cloud in &mut state.clouds {
        cloud.pos.x -= cloud.speed * k;
        if cloud.pos.x < -100.0 {
            cloud.pos.x = state.width + 100.0;
        }
    }
    effects::step_particles(&mut state.particles, k);

    match state.phase {
        FlappyPhase::Idle => {
            let t = &state.tuning;
            let bob = (state.clock_ms / t.hover_period_ms as f64).sin() as f32 * t.hover_amplitude;
            state.bird.pos.y = state.height / 2.0 + bob;
            state.bird.rotation = 0.0;
        }
        FlappyPhase::Active => step_active(state, k),
        FlappyPhase::Terminal => {}
    }
}

fn step_active(state: &mut FlappyState, k: f32) {
    let t = state.tuning.clone();
    let ground = state.ground_y();

    // Bird physics
    let bird = &mut state.bird;
    bird.vel_y += t.gravity * k;
    bird.pos.y += bird.vel_y * k;
    bird.rotation = (bird.vel_y * t.tilt_per_velocity).clamp(-t.max_tilt, t.max_tilt);

    let mut crashed = false;
    if bird.pos.y >= ground {
        bird.pos.y = ground;
        crashed = true;
    }
    if bird.pos.y < 0.0 {
        bird.pos.y = 0.0;
        bird.vel_y = 0.0;
    }

    // Spawn on a fixed frame cadence
    state.spawn_frames += k;
    if state.spawn_frames >= t.spawn_every_frames {
        state.spawn_frames -= t.spawn_every_frames;
        spawn_pipe(state);
    }

    // Scroll, collide, score, despawn
    let hitbox = state.bird.hitbox(t.hitbox_inset);
    let bird_x = state.bird.pos.x;
    let mut passed = 0u64;
    for i in (0..state.pipes.len()).rev() {
        let pipe = &mut state.pipes[i];
        pipe.x -= t.pipe_speed * k;

        if hitbox.overlaps(&pipe.top_rect(t.pipe_width))
            || hitbox.overlaps(&pipe.bottom_rect(t.pipe_width, t.gap_size, state.height))
        {
            crashed = true;
        }

        if !pipe.passed && bird_x > pipe.x + t.pipe_width {
            pipe.passed = true;
            passed += 1;
        }

        if pipe.x < t.despawn_x {
            state.pipes.remove(i);
        }
    }

    if passed > 0 {
        state.outbox.add_score(passed);
        state.outbox.cue(AudioCue::Score);
        let at = state.bird.pos;
        effects::spawn_burst(&mut state.particles, &mut state.rng, at, 5, &SPARK_PALETTE, 4.0);
    }

    if crashed {
        state.phase = FlappyPhase::Terminal;
        state.outbox.game_over();
    }
}

fn spawn_pipe(state: &mut FlappyState) {
    let (min, max) = state.gap_band();
    let top_height = state.rng.int_inclusive(min as i32, max as i32) as f32;
    let id = state.next_entity_id();
    log::debug!("Pipe {} spawned, top height {}", id, top_height);
    state.pipes.push(Pipe {
        id,
        x: state.width,
        top_height,
        passed: false,
    });
}

/// Apply one discrete key press
pub fn handle_key(state: &mut FlappyState, key: Key) {
    match state.phase {
        FlappyPhase::Idle if key.is_action() => {
            state.phase = FlappyPhase::Active;
            flap(state, false);
        }
        FlappyPhase::Active if key.is_action() => flap(state, true),
        FlappyPhase::Terminal if key.is_action() || key == Key::KeyR => state.reset(),
        _ => {}
    }
}

fn flap(state: &mut FlappyState, puff: bool) {
    state.bird.vel_y = state.tuning.flap_velocity;
    state.outbox.cue(AudioCue::Jump);
    if puff {
        let at = state.bird.pos + Vec2::new(-10.0, 10.0);
        effects::spawn_burst(&mut state.particles, &mut state.rng, at, 4, &SPARK_PALETTE, 4.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::games::flappy::state::FlappyTuning;
    use crate::sim::{GameContext, GameEvent};
    use proptest::prelude::*;

    fn new_state(seed: u64) -> FlappyState {
        FlappyState::new(GameContext::new(400.0, 600.0, seed), FlappyTuning::default())
    }

    fn run_frames(state: &mut FlappyState, frames: usize) {
        for _ in 0..frames {
            step(state, FRAME_MS);
        }
    }

    #[test]
    fn test_idle_hovers_without_gravity() {
        let mut state = new_state(1);
        run_frames(&mut state, 120);
        assert_eq!(state.phase, FlappyPhase::Idle);
        assert_eq!(state.bird.vel_y, 0.0);
        assert!((state.bird.pos.y - 300.0).abs() <= 10.0);
        assert!(state.pipes.is_empty());
    }

    #[test]
    fn test_first_flap_starts_and_gravity_wins_within_200ms() {
        let mut state = new_state(2);
        handle_key(&mut state, Key::Space);
        assert_eq!(state.phase, FlappyPhase::Active);
        assert!(state.bird.vel_y < 0.0);

        let mut elapsed = 0.0;
        while elapsed < 200.0 {
            step(&mut state, 16.0);
            elapsed += 16.0;
        }
        assert!(state.bird.vel_y > 0.0, "still rising: {}", state.bird.vel_y);
        assert!(state.pipes.is_empty());
        assert!(state.spawn_frames < state.tuning.spawn_every_frames);
    }

    #[test]
    fn test_spawn_cadence() {
        let mut state = new_state(3);
        handle_key(&mut state, Key::Space);
        // Keep the bird airborne in the middle band
        for frame in 0..109 {
            if frame % 12 == 0 {
                handle_key(&mut state, Key::Space);
            }
            step(&mut state, FRAME_MS);
        }
        assert!(state.pipes.is_empty());
        step(&mut state, FRAME_MS);
        assert_eq!(state.pipes.len(), 1);
        let (min, max) = state.gap_band();
        let top = state.pipes[0].top_height;
        assert!(top >= min && top <= max);
        assert_eq!(top, top.floor());
    }

    #[test]
    fn test_pipe_scores_exactly_once() {
        let mut state = new_state(4);
        state.phase = FlappyPhase::Active;
        state.outbox.drain();
        // Already behind the bird and lined up so the bird sits in the gap
        state.pipes.push(Pipe {
            id: 99,
            x: -5.0,
            top_height: 240.0,
            passed: false,
        });
        state.spawn_frames = f32::MIN;
        state.tuning.pipe_speed = 0.0;
        state.tuning.gravity = 0.0;
        state.bird.pos.y = 300.0;

        run_frames(&mut state, 1000);
        assert_eq!(state.phase, FlappyPhase::Active);
        assert_eq!(state.outbox.score(), 1);
        let changes = state
            .outbox
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::ScoreChanged(_)))
            .count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn test_ground_is_terminal_and_reported_once() {
        let mut state = new_state(5);
        handle_key(&mut state, Key::Space);
        run_frames(&mut state, 300);
        assert_eq!(state.phase, FlappyPhase::Terminal);
        assert_eq!(state.bird.pos.y, state.ground_y());

        // Holding the last frame never re-reports
        run_frames(&mut state, 60);
        let overs = state
            .outbox
            .drain()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
    }

    #[test]
    fn test_pipe_collision_is_terminal() {
        let mut state = new_state(6);
        state.phase = FlappyPhase::Active;
        state.tuning.gravity = 0.0;
        state.bird.pos.y = 100.0;
        state.pipes.push(Pipe {
            id: 1,
            x: 40.0,
            top_height: 200.0,
            passed: false,
        });
        step(&mut state, FRAME_MS);
        assert_eq!(state.phase, FlappyPhase::Terminal);
    }

    #[test]
    fn test_ceiling_clamps() {
        let mut state = new_state(7);
        handle_key(&mut state, Key::Space);
        state.bird.pos.y = 2.0;
        step(&mut state, FRAME_MS);
        assert_eq!(state.bird.pos.y, 0.0);
        assert_eq!(state.bird.vel_y, 0.0);
    }

    #[test]
    fn test_restart_from_terminal() {
        let mut state = new_state(8);
        handle_key(&mut state, Key::Space);
        run_frames(&mut state, 300);
        assert_eq!(state.phase, FlappyPhase::Terminal);

        handle_key(&mut state, Key::ArrowLeft);
        assert_eq!(state.phase, FlappyPhase::Terminal);

        handle_key(&mut state, Key::KeyR);
        assert_eq!(state.phase, FlappyPhase::Idle);
        assert!(state.pipes.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.outbox.drain(), vec![GameEvent::ScoreChanged(0)]);
    }

    #[test]
    fn test_long_frame_matches_reference_frames() {
        let mut long = new_state(9);
        let mut short = new_state(9);
        handle_key(&mut long, Key::Space);
        handle_key(&mut short, Key::Space);

        step(&mut long, 100.0);
        for _ in 0..6 {
            step(&mut short, 100.0 / 6.0);
        }
        assert!((long.bird.pos.y - short.bird.pos.y).abs() < 1e-2);
        assert!((long.bird.vel_y - short.bird.vel_y).abs() < 1e-3);
        assert_eq!(long.phase, FlappyPhase::Active);
    }

    #[test]
    fn test_determinism() {
        let mut a = new_state(99);
        let mut b = new_state(99);
        for frame in 0..400 {
            if frame % 20 == 0 {
                handle_key(&mut a, Key::Click);
                handle_key(&mut b, Key::Click);
            }
            step(&mut a, FRAME_MS);
            step(&mut b, FRAME_MS);
        }
        assert_eq!(a.pipes.len(), b.pipes.len());
        for (pa, pb) in a.pipes.iter().zip(&b.pipes) {
            assert_eq!(pa.top_height, pb.top_height);
        }
        assert_eq!(a.bird.pos, b.bird.pos);
    }

    proptest! {
        #[test]
        fn bird_stays_on_surface(flaps in proptest::collection::vec(any::<bool>(), 1..400), seed in 0u64..1000) {
            let mut state = new_state(seed);
            handle_key(&mut state, Key::Space);
            for flap_now in flaps {
                if flap_now {
                    handle_key(&mut state, Key::Space);
                }
                step(&mut state, FRAME_MS);
                if state.phase != FlappyPhase::Active {
                    break;
                }
                prop_assert!(state.bird.pos.y >= 0.0);
                prop_assert!(state.bird.pos.y <= state.height);
                prop_assert!(state.bird.rotation.abs() <= state.tuning.max_tilt);
            }
        }
    }
}
