//! Wave-shooter frame step
//!
//! Order within an active frame: buffs, player shots, hostile shots,
//! pickups, the enemy sweep, reinforcements, enemy fire, hit resolution,
//! then the wave-clear check. A frame that ends the run stops right there.

use glam::Vec2;

use super::palette;
use super::state::{
    Bullet, Enemy, EnemyBullet, EnemyKind, GRID_TOP, InvadersPhase, InvadersState, PICKUP_SIZE, Pickup,
    PowerupKind, SWEEP_MARGIN, ShotKind, Trajectory,
};
use crate::{frame_scale, substeps};
use crate::renderer::Color;
use crate::sim::{AudioCue, HeldKeys, Key, effects, within_radius};

/// Horizontal range an enemy may sweep across before the shared direction flips
pub fn sweep_limits(width: f32, enemy: &Enemy) -> (f32, f32) {
    (SWEEP_MARGIN, width - enemy.size().x - SWEEP_MARGIN)
}

/// Advance the world by `dt_ms`. A zero step leaves everything in place.
pub fn step(state: &mut InvadersState, dt_ms: f32) {
    for dt in substeps(dt_ms) {
        if state.phase == InvadersPhase::GameOver {
            return;
        }
        step_frame(state, dt);
    }
}

/// One step of at most a reference frame
fn step_frame(state: &mut InvadersState, dt: f32) {
    let k = frame_scale(dt);
    state.clock_ms += dt as f64;

    // Cosmetics run through the transition too
    step_stars(state, k);
    effects::step_particles(&mut state.particles, k);
    effects::step_floats(&mut state.floats, k);

    match state.phase {
        InvadersPhase::Transition => step_transition(state, dt),
        InvadersPhase::Active => step_active(state, k, dt),
        _ => {}
    }
}

fn step_stars(state: &mut InvadersState, k: f32) {
    for i in 0..state.stars.len() {
        let star = &mut state.stars[i];
        star.pos.y += star.speed * k;
        if star.pos.y > state.height {
            star.pos.y = 0.0;
            star.pos.x = state.rng.range(0.0, state.width);
        }
    }
}

fn step_transition(state: &mut InvadersState, dt: f32) {
    let Some(remaining) = state.transition_ms.as_mut() else {
        return;
    };
    *remaining -= dt;
    if *remaining <= 0.0 {
        let level = state.level;
        state.init_level(level);
    }
}

fn step_active(state: &mut InvadersState, k: f32, dt: f32) {
    tick_buffs(state, dt);
    move_bullets(state, k);

    move_enemy_bullets(state, k);
    if state.phase != InvadersPhase::Active {
        return;
    }

    move_pickups(state, k);

    let shooters = move_enemies(state, k);
    if state.phase != InvadersPhase::Active {
        return;
    }

    spawn_minions(state, dt);
    enemy_fire(state, dt, &shooters);
    resolve_hits(state);

    state.enemies.retain(|e| e.active);
    check_wave_clear(state);
}

fn tick_buffs(state: &mut InvadersState, dt: f32) {
    if state.buffs.remaining_ms > 0.0 {
        state.buffs.remaining_ms -= dt;
        if state.buffs.remaining_ms <= 0.0 {
            state.buffs.clear();
        }
    }
}

fn move_bullets(state: &mut InvadersState, k: f32) {
    let speed = state.tuning.bullet_speed;
    for b in &mut state.bullets {
        b.pos.y -= speed * k;
    }
    state.bullets.retain(|b| b.pos.y >= 0.0);
}

fn move_enemy_bullets(state: &mut InvadersState, k: f32) {
    let speed = state.tuning.enemy_bullet_speed;
    let player = state.player.rect();
    let mut hits = 0;

    for i in (0..state.enemy_bullets.len()).rev() {
        let b = &mut state.enemy_bullets[i];
        match b.trajectory {
            Trajectory::Straight => b.pos.y += speed * k,
            Trajectory::Zigzag => {
                b.pos.y += speed * 0.8 * k;
                b.pos.x += (b.pos.y * 0.05).sin() * 2.0 * k;
            }
            Trajectory::Fast => b.pos.y += speed * 1.5 * k,
        }

        if player.contains(b.pos) {
            state.enemy_bullets.remove(i);
            hits += 1;
        } else if b.pos.y > state.height {
            state.enemy_bullets.remove(i);
        }
    }

    for _ in 0..hits {
        take_damage(state);
    }
}

fn move_pickups(state: &mut InvadersState, k: f32) {
    let fall = state.tuning.pickup_fall_speed;
    let player = state.player.rect();
    let mut collected = Vec::new();

    for i in (0..state.pickups.len()).rev() {
        let p = &mut state.pickups[i];
        p.pos.y += fall * k;
        if p.rect().overlaps(&player) {
            collected.push(p.kind);
            state.pickups.remove(i);
        } else if p.pos.y > state.height {
            state.pickups.remove(i);
        }
    }

    for kind in collected {
        apply_pickup(state, kind);
    }
}

/// Sweep the formation. Returns the indices of enemies able to shoot.
fn move_enemies(state: &mut InvadersState, k: f32) -> Vec<usize> {
    let dx = state.sweep_speed * state.sweep_dir * k;
    let dir = state.sweep_dir;
    let player_line = state.player.pos.y;
    let mut hit_edge = false;
    let mut breaches = 0;

    for e in state.enemies.iter_mut().filter(|e| e.active) {
        e.pos.x += dx;
        let (min_x, max_x) = sweep_limits(state.width, e);
        if (dir < 0.0 && e.pos.x <= min_x) || (dir > 0.0 && e.pos.x >= max_x) {
            hit_edge = true;
        }

        // Reaching the player's line costs a life and sends the bug back up
        if !e.is_boss() && e.pos.y + e.size().y >= player_line {
            e.pos.y = GRID_TOP;
            breaches += 1;
        }
    }

    if hit_edge {
        state.sweep_dir = -state.sweep_dir;
        let step = state.tuning.descent_step;
        for e in state.enemies.iter_mut().filter(|e| e.active && !e.is_boss()) {
            e.pos.y += step;
        }
    }

    for _ in 0..breaches {
        take_damage(state);
    }

    state
        .enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.active)
        .map(|(i, _)| i)
        .collect()
}

fn spawn_minions(state: &mut InvadersState, dt: f32) {
    if !state.boss_present() {
        return;
    }
    state.minion_ms -= dt;
    if state.minion_ms > 0.0 {
        return;
    }

    let count = state.tuning.minion_count;
    let start_x = state.rng.range(20.0, state.width - 180.0);
    let carrier = state.rng.index(count);
    for i in 0..count {
        let id = state.next_entity_id();
        let mut minion = Enemy::new(id, Vec2::new(start_x + i as f32 * 30.0, 30.0), EnemyKind::BugA, 1);
        minion.guaranteed_drop = i == carrier;
        state.enemies.push(minion);
    }
    state.spawn_float(Vec2::new(state.width / 2.0 - 70.0, 100.0), "REINFORCEMENTS!");

    let (base, spread) = state.tuning.minion_interval_ms;
    state.minion_ms = base + state.rng.unit() * spread;
    log::debug!("Boss called {} minions", count);
}

fn enemy_fire(state: &mut InvadersState, dt: f32, shooters: &[usize]) {
    state.enemy_fire_ms -= dt;
    if state.enemy_fire_ms > 0.0 || shooters.is_empty() {
        return;
    }

    let idx = shooters[state.rng.index(shooters.len())];
    let origin = state.enemies[idx].pos;
    let level = state.level;
    let shoot = |state: &mut InvadersState, dx: f32, dy: f32, trajectory: Trajectory| {
        state.enemy_bullets.push(EnemyBullet {
            pos: origin + Vec2::new(dx, dy),
            trajectory,
        });
    };

    if state.enemies[idx].is_boss() {
        if state.rng.chance(0.5) {
            shoot(state, 40.0, 40.0, Trajectory::Straight);
            shoot(state, 20.0, 40.0, Trajectory::Zigzag);
            shoot(state, 60.0, 40.0, Trajectory::Zigzag);
        } else {
            shoot(state, 10.0, 40.0, Trajectory::Fast);
            shoot(state, 70.0, 40.0, Trajectory::Fast);
        }
        state.enemy_fire_ms = boss_fire_delay(level);
    } else {
        let trajectory = bug_trajectory(state.rng.unit(), level);
        shoot(state, 10.0, 20.0, trajectory);
        state.enemy_fire_ms = bug_fire_delay(state.rng.unit(), level);
    }
}

/// Boss volleys speed up by 100 ms a level down to 800 ms
fn boss_fire_delay(level: u32) -> f32 {
    (2000.0 - level as f32 * 100.0).max(800.0)
}

/// Higher levels widen both the zigzag band at the bottom of the roll and
/// the fast band at the top; fast wins where they overlap
fn bug_trajectory(roll: f32, level: u32) -> Trajectory {
    let lvl = level as f32;
    if roll > 0.9 - lvl * 0.01 {
        Trajectory::Fast
    } else if roll < 0.2 + lvl * 0.02 {
        Trajectory::Zigzag
    } else {
        Trajectory::Straight
    }
}

/// 3-5 s between bug shots, up to 1 s shorter past level 10
fn bug_fire_delay(roll: f32, level: u32) -> f32 {
    let mut next = 3000.0 + roll * 2000.0;
    if level > 10 {
        next -= ((level - 10) as f32 * 100.0).min(1000.0);
    }
    next
}

fn resolve_hits(state: &mut InvadersState) {
    for bi in (0..state.bullets.len()).rev() {
        let Bullet { pos, kind } = state.bullets[bi].clone();
        let Some(target) = state.enemies.iter().position(|e| e.active && e.rect().contains(pos)) else {
            continue;
        };
        state.bullets.remove(bi);

        match kind {
            ShotKind::Heavy => detonate(state, pos, Some(target)),
            ShotKind::Normal => {
                if state.enemies[target].damage(1) {
                    kill_enemy(state, target);
                } else {
                    state.outbox.cue(AudioCue::BossHit);
                    effects::spawn_burst(&mut state.particles, &mut state.rng, pos, 2, &[Color::WHITE], 3.0);
                }
            }
        }
    }
}

/// Area damage around `at`. The directly struck enemy is always included.
pub fn detonate(state: &mut InvadersState, at: Vec2, direct: Option<usize>) {
    state.outbox.cue(AudioCue::Missile);
    effects::spawn_burst(&mut state.particles, &mut state.rng, at, 10, &[palette::MISSILE], 3.0);

    let radius = state.tuning.splash_radius;
    let amount = state.tuning.splash_damage;
    let victims: Vec<usize> = state
        .enemies
        .iter()
        .enumerate()
        .filter(|(i, e)| e.active && (direct == Some(*i) || within_radius(e.pos, at, radius)))
        .map(|(i, _)| i)
        .collect();

    for i in victims {
        let pos = state.enemies[i].pos;
        state.spawn_float(pos, amount.to_string());
        if state.enemies[i].damage(amount) {
            kill_enemy(state, i);
        } else {
            state.outbox.cue(AudioCue::BossHit);
        }
    }
}

/// Deactivate an enemy and pay out points, effects and drops
pub fn kill_enemy(state: &mut InvadersState, index: usize) {
    let Some(enemy) = state.enemies.get_mut(index) else {
        return;
    };
    if !enemy.active {
        return;
    }
    enemy.active = false;
    enemy.hp = 0;
    let (boss, pos, center, forced) = (enemy.is_boss(), enemy.pos, enemy.center(), enemy.guaranteed_drop || enemy.is_boss());

    state.outbox.cue(AudioCue::Explode);
    let (count, colors) = if boss {
        (50, &palette::BOSS_SPARKS[..])
    } else {
        (8, &palette::BUG_SPARKS[..])
    };
    effects::spawn_burst(&mut state.particles, &mut state.rng, center, count, colors, 3.0);

    let points = if boss {
        state.tuning.boss_points
    } else {
        state.tuning.kill_points(state.level)
    };
    state.outbox.add_score(points);
    state.spawn_float(pos, format!("+{}", points));

    if forced || state.rng.chance(state.tuning.drop_chance) {
        let kind = PowerupKind::from_roll(state.rng.unit(), &state.tuning.drop_weights);
        state.pickups.push(Pickup {
            pos: center - Vec2::splat(PICKUP_SIZE / 2.0),
            kind,
        });
    }
}

fn check_wave_clear(state: &mut InvadersState) {
    if state.phase != InvadersPhase::Active || state.active_enemy_count() > 0 {
        return;
    }

    state.phase = InvadersPhase::Transition;
    state.transition_ms = Some(state.tuning.transition_ms);
    log::info!("Level {} cleared", state.level);
    state.level += 1;

    state.outbox.cue(AudioCue::Score);
    state.spawn_float(Vec2::new(state.width / 2.0 - 70.0, state.height / 2.0 + 50.0), "LEVEL CLEARED!");
    state.outbox.add_score(state.tuning.clear_bonus);
    state.bullets.clear();
    state.enemy_bullets.clear();
}

fn apply_pickup(state: &mut InvadersState, kind: PowerupKind) {
    state.outbox.cue(AudioCue::Powerup);
    let duration = state.tuning.buff_duration_ms;
    let player = &mut state.player;
    let buffs = &mut state.buffs;

    let label = match kind {
        PowerupKind::RapidFire => {
            buffs.rapid_fire = true;
            buffs.remaining_ms = duration;
            "RAPID FIRE"
        }
        PowerupKind::SpreadShot => {
            buffs.spread_shot = true;
            buffs.remaining_ms = duration;
            "AUTO CANNON"
        }
        PowerupKind::HeavyShot => {
            buffs.heavy_shot = true;
            buffs.remaining_ms = duration;
            "MISSILES"
        }
        PowerupKind::Shield => {
            player.shield = (player.shield + 1).min(state.tuning.max_shield);
            "SHIELD UP"
        }
        PowerupKind::Life => {
            player.hp = (player.hp + 1).min(player.max_hp);
            "HP UP"
        }
    };
    let at = state.player.pos;
    state.spawn_float(at, label);
}

/// One hit on the player. The shield soaks it first.
pub fn take_damage(state: &mut InvadersState) {
    if state.phase == InvadersPhase::GameOver {
        return;
    }

    let at = state.player.pos;
    if state.player.shield > 0 {
        state.player.shield -= 1;
        state.outbox.cue(AudioCue::Shield);
        state.spawn_float(at, "SHIELD HIT!");
        return;
    }

    state.player.hp = state.player.hp.saturating_sub(1);
    state.outbox.cue(AudioCue::Explode);
    let center = state.player.rect().center();
    effects::spawn_burst(&mut state.particles, &mut state.rng, center, 30, &[palette::PLAYER], 3.0);

    if state.player.hp == 0 {
        state.phase = InvadersPhase::GameOver;
        state.transition_ms = None;
        state.outbox.game_over();
    } else {
        state.spawn_float(at, "-1 HP");
    }
}

/// Continuous controls: movement and held fire. Ignored outside active play.
pub fn handle_input_state(state: &mut InvadersState, held: &HeldKeys) {
    if state.phase != InvadersPhase::Active {
        return;
    }

    let t = &state.tuning;
    let speed = if state.buffs.rapid_fire {
        t.player_speed * t.rapid_speed_mult
    } else {
        t.player_speed
    };
    if held.left() {
        state.player.pos.x -= speed;
    }
    if held.right() {
        state.player.pos.x += speed;
    }
    let max_x = (state.width - state.player.size.x).max(0.0);
    state.player.pos.x = state.player.pos.x.clamp(0.0, max_x);

    if held.fire() {
        try_fire(state);
    }
}

fn try_fire(state: &mut InvadersState) {
    let cooldown = if state.buffs.rapid_fire {
        state.tuning.rapid_fire_cooldown_ms
    } else {
        state.tuning.fire_cooldown_ms
    };
    if let Some(last) = state.last_fire_ms {
        if state.clock_ms - last <= cooldown {
            return;
        }
    }
    state.last_fire_ms = Some(state.clock_ms);
    state.outbox.cue(AudioCue::Shoot);

    let origin = state.player.pos;
    let shot = |dx: f32, dy: f32, kind: ShotKind| Bullet {
        pos: origin + Vec2::new(dx, dy),
        kind,
    };
    if state.buffs.heavy_shot {
        state.bullets.push(shot(12.0, 0.0, ShotKind::Heavy));
    } else if state.buffs.spread_shot {
        state.bullets.push(shot(0.0, 5.0, ShotKind::Normal));
        state.bullets.push(shot(12.0, 0.0, ShotKind::Normal));
        state.bullets.push(shot(24.0, 5.0, ShotKind::Normal));
    } else {
        state.bullets.push(shot(12.0, 0.0, ShotKind::Normal));
    }
}

/// Discrete keys: only restart after a game over
pub fn handle_key(state: &mut InvadersState, key: Key) {
    if state.phase == InvadersPhase::GameOver && key == Key::KeyR {
        log::info!("Restarting wave shooter");
        state.reset();
    }
}
