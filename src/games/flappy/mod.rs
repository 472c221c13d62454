//! Flappy Pixel: a one-button side-scroller
//!
//! Space or click flaps. The first flap leaves the hover screen; touching a
//! pipe or the ground ends the run. Space, click or R restarts.

pub mod state;
pub mod tick;

pub use state::{Bird, Cloud, FlappyPhase, FlappyState, FlappyTuning, Pipe};

use crate::error::Result;
use crate::renderer::shapes::draw_cloud;
use crate::renderer::{Color, Surface, TextAlign};
use crate::sim::{Game, GameContext, GameEvent, Key, effects};

mod palette {
    use crate::renderer::Color;

    pub const SKY: Color = Color::hex(0x70c5ce);
    pub const BIRD: Color = Color::hex(0xffec27);
    pub const BIRD_BORDER: Color = Color::hex(0xfa6a0a);
    pub const PIPE: Color = Color::hex(0x00e436);
    pub const PIPE_BORDER: Color = Color::hex(0x1a1c2c);
    pub const TEXT: Color = Color::hex(0xf0e8d9);
    pub const GROUND: Color = Color::hex(0xded895);
    pub const GROUND_LINE: Color = Color::hex(0x654053);
}

/// Catalog entry point
pub fn create(ctx: GameContext) -> Box<dyn Game> {
    Box::new(FlappyBird::new(ctx))
}

/// Catalog entry point with [`FlappyTuning`] overrides as JSON
pub fn create_tuned(ctx: GameContext, json: &str) -> Result<Box<dyn Game>> {
    let tuning = FlappyTuning::from_json(json)?;
    Ok(Box::new(FlappyBird::with_tuning(ctx, tuning)))
}

pub struct FlappyBird {
    ctx: GameContext,
    pub state: FlappyState,
}

impl FlappyBird {
    pub fn new(ctx: GameContext) -> Self {
        Self::with_tuning(ctx, FlappyTuning::default())
    }

    pub fn with_tuning(ctx: GameContext, tuning: FlappyTuning) -> Self {
        Self {
            ctx,
            state: FlappyState::new(ctx, tuning),
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let s = &self.state;
        let (w, h) = (s.width, s.height);

        surface.fill_rect(0.0, 0.0, w, h, palette::SKY);
        for cloud in &s.clouds {
            draw_cloud(surface, cloud.pos.x, cloud.pos.y, cloud.scale);
        }
        effects::draw_particles(surface, &s.particles);

        let t = &s.tuning;
        for pipe in &s.pipes {
            let top = pipe.top_rect(t.pipe_width);
            let bottom = pipe.bottom_rect(t.pipe_width, t.gap_size, h);
            for (body, cap_y) in [(top, top.bottom() - 20.0), (bottom, bottom.y)] {
                surface.fill_rect(body.x, body.y, body.w, body.h, palette::PIPE);
                surface.stroke_rect(body.x, body.y, body.w, body.h, palette::PIPE_BORDER, 3.0);
                surface.fill_rect(body.x - 2.0, cap_y, body.w + 4.0, 20.0, palette::PIPE);
                surface.stroke_rect(body.x - 2.0, cap_y, body.w + 4.0, 20.0, palette::PIPE_BORDER, 3.0);
            }
        }

        self.draw_bird(surface);

        let ground = s.ground_y();
        surface.fill_rect(0.0, ground, w, t.ground_height, palette::GROUND);
        surface.line((0.0, ground), (w, ground), palette::GROUND_LINE, 3.0);

        match s.phase {
            FlappyPhase::Idle => {
                surface.fill_text("TAP OR SPACE", w / 2.0, h / 2.0 + 60.0, 20.0, TextAlign::Center, palette::TEXT);
                surface.fill_text("TO FLY", w / 2.0, h / 2.0 + 90.0, 20.0, TextAlign::Center, palette::TEXT);
            }
            FlappyPhase::Terminal => {
                surface.fill_rect(0.0, 0.0, w, h, Color::rgba(0, 0, 0, 0.5));
                surface.fill_text("GAME OVER", w / 2.0, h / 2.0, 30.0, TextAlign::Center, palette::TEXT);
                let score = format!("SCORE: {}", s.outbox.score());
                surface.fill_text(&score, w / 2.0, h / 2.0 + 40.0, 15.0, TextAlign::Center, palette::TEXT);
            }
            FlappyPhase::Active => {}
        }
    }

    fn draw_bird(&self, surface: &mut dyn Surface) {
        let bird = &self.state.bird;
        let (bw, bh) = bird.size;
        surface.save();
        surface.translate(bird.pos.x, bird.pos.y);
        surface.rotate(bird.rotation);

        // Body
        surface.fill_rect(-bw / 2.0, -bh / 2.0, bw, bh, palette::BIRD);
        surface.stroke_rect(-bw / 2.0, -bh / 2.0, bw, bh, palette::BIRD_BORDER, 2.0);
        // Eye
        surface.fill_rect(5.0, -8.0, 8.0, 8.0, Color::WHITE);
        surface.fill_rect(9.0, -6.0, 2.0, 2.0, Color::BLACK);
        // Beak
        surface.fill_rect(5.0, 2.0, 12.0, 6.0, palette::BIRD_BORDER);
        // Wing
        surface.fill_rect(-8.0, 2.0, 12.0, 6.0, Color::WHITE);

        surface.restore();
    }
}

impl Game for FlappyBird {
    fn init(&mut self) {
        self.state.reset();
    }

    fn update(&mut self, dt_ms: f32, surface: &mut dyn Surface) {
        if !self.ctx.has_valid_geometry() || !surface.is_drawable() {
            return;
        }
        tick::step(&mut self.state, dt_ms);
        self.draw(surface);
    }

    fn destroy(&mut self) {}

    fn on_input(&mut self, key: Key) {
        tick::handle_key(&mut self.state, key);
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
    use crate::renderer::DrawList;

    #[test]
    fn test_update_zero_redraws_without_moving() {
        let mut game = FlappyBird::new(GameContext::new(400.0, 600.0, 3));
        game.init();
        game.on_input(Key::Space);
        let mut list = DrawList::new(400.0, 600.0);
        let before = game.state.bird.pos;
        game.update(0.0, &mut list);
        assert_eq!(game.state.bird.pos, before);
        assert!(!list.is_empty());
        assert_eq!(list.stack_depth(), 0);
    }

    #[test]
    fn test_invalid_geometry_is_a_no_op() {
        let mut game = FlappyBird::new(GameContext::new(0.0, 600.0, 3));
        game.init();
        let mut list = DrawList::new(0.0, 600.0);
        game.update(16.0, &mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_init_reports_zero_and_prompts() {
        let mut game = FlappyBird::new(GameContext::new(400.0, 600.0, 3));
        game.init();
        assert_eq!(game.take_events(), vec![GameEvent::ScoreChanged(0)]);
        let mut list = DrawList::new(400.0, 600.0);
        game.update(0.0, &mut list);
        assert!(list.has_text("TAP OR SPACE"));
    }

    #[test]
    fn test_game_over_screen() {
        let mut game = FlappyBird::new(GameContext::new(400.0, 600.0, 4));
        game.init();
        game.on_input(Key::Space);
        let mut list = DrawList::new(400.0, 600.0);
        for _ in 0..200 {
            list.clear();
            game.update(16.0, &mut list);
        }
        assert_eq!(game.state.phase, FlappyPhase::Terminal);
        assert!(list.has_text("GAME OVER"));
        assert!(list.has_text("SCORE: 0"));
        game.destroy();
        game.destroy();
    }
}
