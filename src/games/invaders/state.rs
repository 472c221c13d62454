//! Wave-shooter state, entities and tuning
//!
//! All registries are owned here and mutated only by `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sim::{FloatText, GameContext, GameRng, Outbox, Particle, Rect};

/// Grid layout for standard waves
pub const GRID_MAX_COLS: u32 = 8;
pub const GRID_SPACING: Vec2 = Vec2::new(40.0, 30.0);
pub const GRID_TOP: f32 = 50.0;
/// Sweep boundary on the left; the right one depends on enemy width
pub const SWEEP_MARGIN: f32 = 10.0;
pub const STAR_COUNT: usize = 50;

/// Phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvadersPhase {
    /// Wave materialized and in play
    Active,
    /// Wave cleared; gameplay frozen while the countdown runs
    Transition,
    /// Player destroyed; waits for restart
    GameOver,
}

/// Gameplay balance. Per-frame values are per 1/60 s reference frame;
/// timers are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvadersTuning {
    pub player_speed: f32,
    /// Movement multiplier while rapid fire is active
    pub rapid_speed_mult: f32,
    pub bullet_speed: f32,
    pub enemy_bullet_speed: f32,
    pub pickup_fall_speed: f32,
    pub fire_cooldown_ms: f64,
    pub rapid_fire_cooldown_ms: f64,
    pub buff_duration_ms: f32,
    pub start_hp: u32,
    pub max_hp: u32,
    pub max_shield: u32,
    /// Chance a standard kill drops a pickup
    pub drop_chance: f32,
    /// Relative odds, in order: rapid, spread, heavy, shield, life
    pub drop_weights: [f32; 5],
    pub splash_radius: f32,
    pub splash_damage: u32,
    /// Shared step down when the sweep hits a side
    pub descent_step: f32,
    pub base_enemy_count: u32,
    pub base_sweep_speed: f32,
    pub sweep_speed_per_level: f32,
    /// Level past which the sweep stops speeding up
    pub sweep_level_cap: u32,
    pub boss_sweep_speed: f32,
    pub boss_every: u32,
    pub super_boss_every: u32,
    pub boss_hp_per_stage: u32,
    pub super_boss_hp_per_stage: u32,
    pub minion_count: usize,
    pub first_minion_ms: f32,
    pub minion_interval_ms: (f32, f32),
    pub first_enemy_fire_ms: f32,
    pub kill_points_base: u64,
    pub kill_points_per_level: u64,
    pub boss_points: u64,
    pub clear_bonus: u64,
    pub transition_ms: f32,
}

impl Default for InvadersTuning {
    fn default() -> Self {
        Self {
            player_speed: 4.0,
            rapid_speed_mult: 1.5,
            bullet_speed: 8.0,
            enemy_bullet_speed: 4.0,
            pickup_fall_speed: 2.0,
            fire_cooldown_ms: 150.0,
            rapid_fire_cooldown_ms: 80.0,
            buff_duration_ms: 5000.0,
            start_hp: 3,
            max_hp: 5,
            max_shield: 3,
            drop_chance: 0.12,
            drop_weights: [0.25, 0.25, 0.15, 0.20, 0.15],
            splash_radius: 60.0,
            splash_damage: 2,
            descent_step: 20.0,
            base_enemy_count: 4,
            base_sweep_speed: 0.5,
            sweep_speed_per_level: 0.05,
            sweep_level_cap: 10,
            boss_sweep_speed: 1.5,
            boss_every: 5,
            super_boss_every: 10,
            boss_hp_per_stage: 100,
            super_boss_hp_per_stage: 300,
            minion_count: 5,
            first_minion_ms: 10_000.0,
            minion_interval_ms: (8000.0, 4000.0),
            first_enemy_fire_ms: 3000.0,
            kill_points_base: 100,
            kill_points_per_level: 10,
            boss_points: 5000,
            clear_bonus: 2000,
            transition_ms: 2000.0,
        }
    }
}

impl InvadersTuning {
    /// Parse overrides; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn is_boss_level(&self, level: u32) -> bool {
        self.boss_every > 0 && level % self.boss_every == 0
    }

    /// Standard wave size: 4, plus one every two levels
    pub fn enemy_count(&self, level: u32) -> u32 {
        self.base_enemy_count + level.saturating_sub(1) / 2
    }

    pub fn sweep_speed(&self, level: u32) -> f32 {
        self.base_sweep_speed + level.min(self.sweep_level_cap) as f32 * self.sweep_speed_per_level
    }

    pub fn boss_hp(&self, level: u32) -> u32 {
        let stage = level / self.boss_every.max(1);
        if self.super_boss_every > 0 && level % self.super_boss_every == 0 {
            self.super_boss_hp_per_stage * stage
        } else {
            self.boss_hp_per_stage * stage
        }
    }

    pub fn kill_points(&self, level: u32) -> u64 {
        self.kill_points_base + level as u64 * self.kill_points_per_level
    }
}

/// Sprite/behavior selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    BugA,
    BugB,
    Boss,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub kind: EnemyKind,
    pub hp: u32,
    pub max_hp: u32,
    /// Soft-delete flag; inactive enemies are swept at the end of a frame
    pub active: bool,
    /// Always drops a pickup when killed
    pub guaranteed_drop: bool,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, kind: EnemyKind, hp: u32) -> Self {
        Self {
            id,
            pos,
            kind,
            hp,
            max_hp: hp,
            active: true,
            guaranteed_drop: false,
        }
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }

    pub fn size(&self) -> Vec2 {
        if self.is_boss() {
            Vec2::new(80.0, 40.0)
        } else {
            Vec2::new(20.0, 20.0)
        }
    }

    pub fn rect(&self) -> Rect {
        let size = self.size();
        Rect::new(self.pos.x, self.pos.y, size.x, size.y)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    /// Remove up to `amount` HP. Returns true if this destroyed it.
    pub fn damage(&mut self, amount: u32) -> bool {
        if !self.active {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        self.hp == 0
    }
}

/// Player shot type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotKind {
    Normal,
    /// Explodes on impact with area damage
    Heavy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub kind: ShotKind,
}

/// Hostile projectile flight path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trajectory {
    Straight,
    Zigzag,
    Fast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyBullet {
    pub pos: Vec2,
    pub trajectory: Trajectory,
}

/// Pickup effect kinds, in drop-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    RapidFire,
    SpreadShot,
    HeavyShot,
    Shield,
    Life,
}

impl PowerupKind {
    pub const TABLE: [PowerupKind; 5] = [
        PowerupKind::RapidFire,
        PowerupKind::SpreadShot,
        PowerupKind::HeavyShot,
        PowerupKind::Shield,
        PowerupKind::Life,
    ];

    /// Pick from `weights` (same order as `TABLE`) with a roll in [0, 1)
    pub fn from_roll(roll: f32, weights: &[f32; 5]) -> Self {
        let total: f32 = weights.iter().sum();
        let mut acc = 0.0;
        for (kind, w) in Self::TABLE.iter().zip(weights) {
            acc += w / total;
            if roll < acc {
                return *kind;
            }
        }
        PowerupKind::Life
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            PowerupKind::RapidFire => "R",
            PowerupKind::SpreadShot => "M",
            PowerupKind::HeavyShot => "H",
            PowerupKind::Shield => "S",
            PowerupKind::Life => "+",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub kind: PowerupKind,
}

pub const PICKUP_SIZE: f32 = 10.0;

impl Pickup {
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, PICKUP_SIZE, PICKUP_SIZE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub hp: u32,
    pub max_hp: u32,
    pub shield: u32,
}

impl Player {
    pub fn new(width: f32, height: f32, tuning: &InvadersTuning) -> Self {
        Self {
            pos: Vec2::new(width / 2.0 - 15.0, height - 50.0),
            size: Vec2::new(30.0, 20.0),
            hp: tuning.start_hp,
            max_hp: tuning.max_hp,
            shield: 0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }
}

/// Timed firing modifiers sharing one countdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buffs {
    pub rapid_fire: bool,
    pub spread_shot: bool,
    pub heavy_shot: bool,
    pub remaining_ms: f32,
}

impl Buffs {
    pub fn any(&self) -> bool {
        self.remaining_ms > 0.0
    }

    pub fn clear(&mut self) {
        *self = Buffs::default();
    }

    /// HUD label for the buff in effect
    pub fn label(&self) -> &'static str {
        if self.rapid_fire {
            "RAPID"
        } else if self.spread_shot {
            "CANNON"
        } else {
            "MISSILE"
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub speed: f32,
}

/// Complete wave-shooter state
#[derive(Debug, Clone)]
pub struct InvadersState {
    pub tuning: InvadersTuning,
    pub width: f32,
    pub height: f32,
    pub phase: InvadersPhase,
    pub level: u32,
    pub player: Player,
    pub buffs: Buffs,
    pub bullets: Vec<Bullet>,
    pub enemy_bullets: Vec<EnemyBullet>,
    pub enemies: Vec<Enemy>,
    pub pickups: Vec<Pickup>,
    pub particles: Vec<Particle>,
    pub floats: Vec<FloatText>,
    pub stars: Vec<Star>,
    /// Shared sweep direction (+1 right, -1 left)
    pub sweep_dir: f32,
    pub sweep_speed: f32,
    pub enemy_fire_ms: f32,
    pub minion_ms: f32,
    /// Countdown to the next wave; `Some` only while transitioning
    pub transition_ms: Option<f32>,
    /// Simulation time, the reference for the fire cooldown
    pub clock_ms: f64,
    pub last_fire_ms: Option<f64>,
    pub rng: GameRng,
    pub outbox: Outbox,
    next_id: u32,
}

impl InvadersState {
    pub fn new(ctx: GameContext, tuning: InvadersTuning) -> Self {
        let player = Player::new(ctx.width, ctx.height, &tuning);
        let mut state = Self {
            tuning,
            width: ctx.width,
            height: ctx.height,
            phase: InvadersPhase::Active,
            level: 1,
            player,
            buffs: Buffs::default(),
            bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            enemies: Vec::new(),
            pickups: Vec::new(),
            particles: Vec::new(),
            floats: Vec::new(),
            stars: Vec::new(),
            sweep_dir: 1.0,
            sweep_speed: 0.0,
            enemy_fire_ms: 0.0,
            minion_ms: 0.0,
            transition_ms: None,
            clock_ms: 0.0,
            last_fire_ms: None,
            rng: GameRng::new(ctx.seed),
            outbox: Outbox::new(),
            next_id: 1,
        };
        state.reset();
        state
    }

    /// Start a fresh run at level 1; reports score 0
    pub fn reset(&mut self) {
        self.player = Player::new(self.width, self.height, &self.tuning);
        self.buffs.clear();
        self.particles.clear();
        self.floats.clear();
        self.level = 1;
        self.last_fire_ms = None;
        self.outbox.reset();

        self.stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(self.rng.range(0.0, self.width), self.rng.range(0.0, self.height)),
                speed: self.rng.unit() * 2.0 + 0.5,
            })
            .collect();

        self.init_level(1);
    }

    /// Materialize the enemies for `level` and clear every projectile
    pub fn init_level(&mut self, level: u32) {
        self.enemies.clear();
        self.bullets.clear();
        self.enemy_bullets.clear();
        self.pickups.clear();
        self.sweep_dir = 1.0;
        self.enemy_fire_ms = self.tuning.first_enemy_fire_ms;
        self.minion_ms = self.tuning.first_minion_ms;
        self.transition_ms = None;
        self.phase = InvadersPhase::Active;

        if self.tuning.is_boss_level(level) {
            let hp = self.tuning.boss_hp(level);
            let id = self.next_entity_id();
            let pos = Vec2::new(self.width / 2.0 - 40.0, 60.0);
            self.enemies.push(Enemy::new(id, pos, EnemyKind::Boss, hp));
            self.sweep_speed = self.tuning.boss_sweep_speed;

            let warning = if level % self.tuning.super_boss_every.max(1) == 0 {
                "SUPER BOSS WARNING!"
            } else {
                "BOSS WARNING!"
            };
            self.spawn_float(Vec2::new(self.width / 2.0, self.height / 2.0), warning);
            log::info!("Level {}: boss with {} HP", level, hp);
        } else {
            let total = self.tuning.enemy_count(level);
            let cols = total.min(GRID_MAX_COLS);
            let rows = total.div_ceil(GRID_MAX_COLS);
            let start_x = (self.width - cols as f32 * GRID_SPACING.x) / 2.0 + SWEEP_MARGIN;

            let mut created = 0;
            'rows: for r in 0..rows {
                for c in 0..cols {
                    if created >= total {
                        break 'rows;
                    }
                    let kind = if r % 2 == 0 { EnemyKind::BugA } else { EnemyKind::BugB };
                    let pos = Vec2::new(
                        start_x + c as f32 * GRID_SPACING.x,
                        GRID_TOP + r as f32 * GRID_SPACING.y,
                    );
                    let id = self.next_entity_id();
                    self.enemies.push(Enemy::new(id, pos, kind, 1));
                    created += 1;
                }
            }
            self.sweep_speed = self.tuning.sweep_speed(level);
            log::info!("Level {}: {} enemies in {} row(s)", level, total, rows);
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_float(&mut self, pos: Vec2, text: impl Into<String>) {
        self.floats.push(FloatText {
            pos,
            text: text.into(),
            life: 1.0,
        });
    }

    pub fn active_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase == InvadersPhase::Transition
    }

    pub fn boss_present(&self) -> bool {
        self.enemies.iter().any(|e| e.active && e.is_boss())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_state() -> InvadersState {
        InvadersState::new(GameContext::new(400.0, 600.0, 11), InvadersTuning::default())
    }

    #[test]
    fn test_level_one_is_a_single_row_of_four() {
        let state = new_state();
        assert_eq!(state.enemies.len(), 4);
        let y = state.enemies[0].pos.y;
        assert!(state.enemies.iter().all(|e| e.pos.y == y && e.hp == 1 && e.active));
        assert!(state.enemies.iter().all(|e| e.kind == EnemyKind::BugA));
        assert_eq!(state.sweep_speed, 0.55);
    }

    #[test]
    fn test_enemy_count_formula() {
        let t = InvadersTuning::default();
        let counts: Vec<_> = (1..=9).map(|l| t.enemy_count(l)).collect();
        assert_eq!(counts, [4, 4, 5, 5, 6, 6, 7, 7, 8]);
        assert_eq!(t.enemy_count(21), 14);
    }

    #[test]
    fn test_rows_wrap_past_eight() {
        let mut state = new_state();
        state.init_level(21);
        assert_eq!(state.enemies.len(), 14);
        let rows: std::collections::BTreeSet<_> =
            state.enemies.iter().map(|e| e.pos.y as i32).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(state.enemies.iter().filter(|e| e.kind == EnemyKind::BugB).count(), 6);
    }

    #[test]
    fn test_sweep_speed_caps() {
        let t = InvadersTuning::default();
        assert!(t.sweep_speed(3) < t.sweep_speed(4));
        assert_eq!(t.sweep_speed(10), t.sweep_speed(30));
    }

    #[test]
    fn test_boss_levels() {
        let t = InvadersTuning::default();
        assert!(t.is_boss_level(5) && t.is_boss_level(10) && !t.is_boss_level(6));
        assert_eq!(t.boss_hp(5), 100);
        assert_eq!(t.boss_hp(10), 600);
        assert_eq!(t.boss_hp(15), 300);

        let mut state = new_state();
        state.init_level(5);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].is_boss());
        assert_eq!(state.sweep_speed, 1.5);
        assert!(state.floats.iter().any(|f| f.text == "BOSS WARNING!"));
    }

    #[test]
    fn test_drop_table() {
        let w = InvadersTuning::default().drop_weights;
        assert_eq!(PowerupKind::from_roll(0.0, &w), PowerupKind::RapidFire);
        assert_eq!(PowerupKind::from_roll(0.3, &w), PowerupKind::SpreadShot);
        assert_eq!(PowerupKind::from_roll(0.6, &w), PowerupKind::HeavyShot);
        assert_eq!(PowerupKind::from_roll(0.7, &w), PowerupKind::Shield);
        assert_eq!(PowerupKind::from_roll(0.9, &w), PowerupKind::Life);
        assert_eq!(PowerupKind::from_roll(0.9999, &w), PowerupKind::Life);
    }

    #[test]
    fn test_damage_never_goes_negative() {
        let mut e = Enemy::new(1, Vec2::ZERO, EnemyKind::BugA, 1);
        assert!(e.damage(2));
        assert_eq!(e.hp, 0);
        e.active = false;
        assert!(!e.damage(2));
        assert_eq!(e.hp, 0);
    }

    #[test]
    fn test_reset_restores_starting_values() {
        let mut state = new_state();
        state.player.hp = 1;
        state.player.shield = 2;
        state.level = 7;
        state.outbox.add_score(500);
        state.particles.clear();
        state.reset();
        assert_eq!(state.player.hp, 3);
        assert_eq!(state.player.shield, 0);
        assert_eq!(state.level, 1);
        assert_eq!(state.outbox.score(), 0);
        assert_eq!(state.stars.len(), STAR_COUNT);
    }
}
