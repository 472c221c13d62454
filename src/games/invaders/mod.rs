//! Claude Invaders: a wave shooter
//!
//! Arrows or A/D move, Space fires while held. Every fifth level is a boss
//! that calls in reinforcements. R restarts after a game over.

pub mod state;
pub mod tick;

pub use state::{
    Buffs, Bullet, Enemy, EnemyBullet, EnemyKind, InvadersPhase, InvadersState, InvadersTuning, Pickup, Player,
    PowerupKind, ShotKind, Star, Trajectory,
};

use crate::error::Result;
use crate::renderer::shapes::{self, Pattern, draw_sprite};
use crate::renderer::{Color, Surface, TextAlign};
use crate::sim::{Game, GameContext, GameEvent, HeldKeys, Key, effects};

pub(crate) mod palette {
    use crate::renderer::Color;

    pub const BG: Color = Color::hex(0x1a1c2c);
    pub const PLAYER: Color = Color::hex(0xd9795c);
    pub const SHIELD: Color = Color::hex(0x29adff);
    pub const ENEMY_A: Color = Color::hex(0xcc5c5c);
    pub const ENEMY_B: Color = Color::hex(0xcccc5c);
    pub const BOSS: Color = Color::hex(0xff004d);
    pub const BULLET: Color = Color::hex(0xffffff);
    pub const MISSILE: Color = Color::hex(0xffec27);
    pub const ENEMY_BULLET: Color = Color::hex(0xff004d);
    pub const TEXT: Color = Color::hex(0xf0e8d9);
    pub const POWERUP: Color = Color::hex(0x00e436);
    pub const HP: Color = Color::hex(0xff004d);

    pub const BOSS_SPARKS: [Color; 2] = [BOSS, Color::WHITE];
    pub const BUG_SPARKS: [Color; 2] = [ENEMY_A, ENEMY_B];
}

mod sprites {
    use crate::renderer::shapes::Pattern;

    pub const SHIP: Pattern = &[
        &[0, 0, 0, 1, 1, 0, 0, 0],
        &[0, 0, 1, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[1, 1, 0, 1, 1, 0, 1, 1],
        &[1, 0, 0, 1, 1, 0, 0, 1],
    ];

    pub const BUG_A: Pattern = &[
        &[0, 0, 1, 0, 0, 1, 0, 0],
        &[0, 0, 1, 1, 1, 1, 0, 0],
        &[0, 1, 1, 0, 0, 1, 1, 0],
        &[1, 1, 1, 1, 1, 1, 1, 1],
        &[1, 0, 1, 0, 0, 1, 0, 1],
        &[0, 0, 1, 0, 0, 1, 0, 0],
    ];

    pub const BUG_B: Pattern = &[
        &[0, 0, 0, 1, 1, 0, 0, 0],
        &[0, 0, 1, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 1, 0],
        &[1, 0, 0, 1, 1, 0, 0, 1],
        &[0, 1, 0, 0, 0, 0, 1, 0],
    ];

    // 16x8
    pub const BOSS: Pattern = &[
        &[0, 0, 0, 0, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0],
        &[0, 0, 1, 1, 1, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 0],
        &[0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0],
        &[1, 1, 0, 1, 1, 1, 0, 1, 1, 0, 1, 1, 1, 0, 1, 1],
        &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        &[0, 1, 0, 1, 0, 1, 0, 1, 1, 0, 1, 0, 1, 0, 1, 0],
        &[1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0, 1, 0, 1],
        &[0, 0, 1, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 1, 0, 0],
    ];
}

/// Catalog entry point
pub fn create(ctx: GameContext) -> Box<dyn Game> {
    Box::new(Invaders::new(ctx))
}

/// Catalog entry point with [`InvadersTuning`] overrides as JSON
pub fn create_tuned(ctx: GameContext, json: &str) -> Result<Box<dyn Game>> {
    let tuning = InvadersTuning::from_json(json)?;
    Ok(Box::new(Invaders::with_tuning(ctx, tuning)))
}

pub struct Invaders {
    ctx: GameContext,
    pub state: InvadersState,
    destroyed: bool,
}

/// Per-star alpha in [0.3, 0.8), reshuffled every 100 ms of sim time
fn twinkle(index: usize, clock_ms: f64) -> f32 {
    let frame = (clock_ms / 100.0) as u64;
    let h = (index as u64 ^ frame.wrapping_mul(0x9e37_79b9_7f4a_7c15)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    0.3 + (h >> 40) as f32 / (1u64 << 24) as f32 * 0.5
}

impl Invaders {
    pub fn new(ctx: GameContext) -> Self {
        Self::with_tuning(ctx, InvadersTuning::default())
    }

    pub fn with_tuning(ctx: GameContext, tuning: InvadersTuning) -> Self {
        Self {
            ctx,
            state: InvadersState::new(ctx, tuning),
            destroyed: false,
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let s = &self.state;
        let (w, h) = (s.width, s.height);

        if s.phase == InvadersPhase::GameOver {
            surface.fill_rect(0.0, 0.0, w, h, palette::BG);
            surface.fill_text("GAME OVER", w / 2.0, h / 2.0, 20.0, TextAlign::Center, palette::TEXT);
            let score = format!("SCORE: {}", s.outbox.score());
            surface.fill_text(&score, w / 2.0, h / 2.0 + 30.0, 10.0, TextAlign::Center, palette::TEXT);
            surface.fill_text("PRESS R TO RESTART", w / 2.0, h / 2.0 + 60.0, 10.0, TextAlign::Center, palette::TEXT);
            return;
        }

        surface.fill_rect(0.0, 0.0, w, h, palette::BG);
        for (i, star) in s.stars.iter().enumerate() {
            surface.set_alpha(twinkle(i, s.clock_ms));
            surface.fill_rect(star.pos.x, star.pos.y, 1.0, 1.0, Color::WHITE);
        }
        surface.set_alpha(1.0);

        self.draw_entities(surface);
        effects::draw_particles(surface, &s.particles);
        self.draw_pickups(surface);
        effects::draw_floats(surface, &s.floats, 12.0, palette::TEXT);
        self.draw_hud(surface);

        if s.is_transitioning() {
            surface.fill_rect(0.0, 0.0, w, h, Color::rgba(0, 0, 0, 0.5));
            let cleared = format!("LEVEL {} CLEARED", s.level.saturating_sub(1));
            surface.fill_text(&cleared, w / 2.0, h / 2.0 - 20.0, 15.0, TextAlign::Center, palette::POWERUP);
            surface.fill_text("NEXT WAVE INCOMING...", w / 2.0, h / 2.0 + 10.0, 10.0, TextAlign::Center, palette::TEXT);
        }
    }

    fn draw_entities(&self, surface: &mut dyn Surface) {
        let s = &self.state;
        let player = &s.player;
        let spread = s.buffs.spread_shot;

        let ship_color = if spread { palette::POWERUP } else { palette::PLAYER };
        draw_sprite(surface, player.pos.x, player.pos.y, sprites::SHIP, ship_color, 4.0);
        if player.shield > 0 {
            let c = player.rect().center();
            surface.stroke_circle(c.x, c.y, 25.0, palette::SHIELD, 2.0);
        }

        let wobble = (s.clock_ms / 200.0).sin() as f32 * 2.0;
        for e in s.enemies.iter().filter(|e| e.active) {
            let y = e.pos.y + wobble;
            match e.kind {
                EnemyKind::Boss => {
                    draw_sprite(surface, e.pos.x, y, sprites::BOSS, palette::BOSS, 5.0);
                    let frac = e.hp as f32 / e.max_hp.max(1) as f32;
                    surface.fill_rect(e.pos.x, e.pos.y - 10.0, e.size().x * frac, 5.0, Color::RED);
                }
                EnemyKind::BugA => draw_sprite(surface, e.pos.x, y, sprites::BUG_A, palette::ENEMY_A, 3.0),
                EnemyKind::BugB => draw_sprite(surface, e.pos.x, y, sprites::BUG_B, palette::ENEMY_B, 3.0),
            }
        }

        for b in &s.bullets {
            match b.kind {
                ShotKind::Heavy => surface.fill_rect(b.pos.x - 2.0, b.pos.y, 8.0, 8.0, palette::MISSILE),
                ShotKind::Normal => {
                    let color = if spread { palette::POWERUP } else { palette::BULLET };
                    surface.fill_rect(b.pos.x, b.pos.y, 4.0, 10.0, color);
                }
            }
        }
        for b in &s.enemy_bullets {
            surface.fill_rect(b.pos.x - 2.0, b.pos.y, 4.0, 8.0, palette::ENEMY_BULLET);
        }
    }

    fn draw_pickups(&self, surface: &mut dyn Surface) {
        for p in &self.state.pickups {
            let color = if p.kind == PowerupKind::HeavyShot { palette::MISSILE } else { palette::POWERUP };
            surface.fill_text(p.kind.symbol(), p.pos.x + 5.0, p.pos.y + 10.0, 10.0, TextAlign::Center, color);
            surface.stroke_rect(p.pos.x - 2.0, p.pos.y - 2.0, 14.0, 14.0, palette::POWERUP, 1.0);
        }
    }

    fn draw_hud(&self, surface: &mut dyn Surface) {
        let s = &self.state;
        surface.fill_text(&format!("LVL {}", s.level), 10.0, 20.0, 10.0, TextAlign::Left, palette::TEXT);

        let (icon_w, _) = shapes::sprite_size(shapes::HEART, 2.0);
        let step = icon_w + 1.0;
        let icons: [(u32, Pattern, Color); 2] = [
            (s.player.hp, shapes::HEART, palette::HP),
            (s.player.shield, shapes::SHIELD, palette::SHIELD),
        ];
        let mut x = 10.0;
        for (count, pattern, color) in icons {
            for _ in 0..count {
                draw_sprite(surface, x, 30.0, pattern, color, 2.0);
                x += step;
            }
        }

        if s.buffs.any() {
            let text = format!("{} {:.1}", s.buffs.label(), s.buffs.remaining_ms / 1000.0);
            surface.fill_text(&text, s.width - 100.0, 20.0, 10.0, TextAlign::Left, palette::POWERUP);
        }
    }
}

impl Game for Invaders {
    fn init(&mut self) {
        self.destroyed = false;
        self.state.reset();
    }

    fn update(&mut self, dt_ms: f32, surface: &mut dyn Surface) {
        if self.destroyed || !self.ctx.has_valid_geometry() || !surface.is_drawable() {
            return;
        }
        tick::step(&mut self.state, dt_ms);
        self.draw(surface);
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.state.transition_ms = None;
        log::debug!("Wave shooter destroyed at level {}", self.state.level);
    }

    fn on_input(&mut self, key: Key) {
        tick::handle_key(&mut self.state, key);
    }

    fn handle_input_state(&mut self, held: &HeldKeys) {
        if !self.destroyed {
            tick::handle_input_state(&mut self.state, held);
        }
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        self.state.outbox.drain()
    }

    fn score(&self) -> u64 {
        self.state.outbox.score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use crate::renderer::DrawList;

    fn new_game(seed: u64) -> Invaders {
        let mut game = Invaders::new(GameContext::new(400.0, 600.0, seed));
        game.init();
        game
    }

    #[test]
    fn test_hud_and_zero_step() {
        let mut game = new_game(1);
        let mut list = DrawList::new(400.0, 600.0);
        let before: Vec<_> = game.state.enemies.iter().map(|e| e.pos).collect();
        game.update(0.0, &mut list);
        let after: Vec<_> = game.state.enemies.iter().map(|e| e.pos).collect();
        assert_eq!(before, after);
        assert!(list.has_text("LVL 1"));
        assert_eq!(list.stack_depth(), 0);
    }

    #[test]
    fn test_transition_overlay() {
        let mut game = new_game(2);
        for e in &mut game.state.enemies {
            e.active = false;
        }
        let mut list = DrawList::new(400.0, 600.0);
        game.update(FRAME_MS, &mut list);
        assert!(list.has_text("LEVEL 1 CLEARED"));
        assert!(list.has_text("NEXT WAVE INCOMING..."));
    }

    #[test]
    fn test_destroy_cancels_pending_wave() {
        let mut game = new_game(3);
        for e in &mut game.state.enemies {
            e.active = false;
        }
        let mut list = DrawList::new(400.0, 600.0);
        game.update(FRAME_MS, &mut list);
        assert!(game.state.is_transitioning());

        game.destroy();
        game.destroy();
        assert_eq!(game.state.transition_ms, None);

        list.clear();
        for _ in 0..300 {
            game.update(FRAME_MS, &mut list);
        }
        assert!(list.is_empty());
        assert!(game.state.enemies.is_empty());
        assert_eq!(game.state.level, 2);
    }

    #[test]
    fn test_game_over_screen() {
        let mut game = new_game(4);
        game.state.player.hp = 1;
        tick::take_damage(&mut game.state);
        let mut list = DrawList::new(400.0, 600.0);
        game.update(FRAME_MS, &mut list);
        assert!(list.has_text("GAME OVER"));
        assert!(list.has_text("PRESS R TO RESTART"));

        game.on_input(Key::KeyR);
        list.clear();
        game.update(0.0, &mut list);
        assert!(!list.has_text("GAME OVER"));
    }

    #[test]
    fn test_twinkle_range() {
        for i in 0..50 {
            for t in [0.0, 150.0, 12_345.0] {
                let a = twinkle(i, t);
                assert!((0.3..=0.8).contains(&a));
            }
        }
    }
}
