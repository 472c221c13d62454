//! Composite shapes built from surface primitives

use super::{Color, Surface};

/// A 1-bit pixel-art pattern, one row per slice
pub type Pattern = &'static [&'static [u8]];

/// Blit a pixel pattern with its top-left corner at (x, y)
pub fn draw_sprite(surface: &mut dyn Surface, x: f32, y: f32, pattern: Pattern, color: Color, scale: f32) {
    for (dy, row) in pattern.iter().enumerate() {
        for (dx, &pixel) in row.iter().enumerate() {
            if pixel != 0 {
                surface.fill_rect(
                    x + dx as f32 * scale,
                    y + dy as f32 * scale,
                    scale,
                    scale,
                    color,
                );
            }
        }
    }
}

/// Pixel size of a pattern at the given scale
pub fn sprite_size(pattern: Pattern, scale: f32) -> (f32, f32) {
    let cols = pattern.iter().map(|row| row.len()).max().unwrap_or(0);
    (cols as f32 * scale, pattern.len() as f32 * scale)
}

/// Three overlapping puffs, anchored at the left puff's center
pub fn draw_cloud(surface: &mut dyn Surface, x: f32, y: f32, scale: f32) {
    surface.set_alpha(0.8);
    surface.fill_circle(x, y, 20.0 * scale, Color::WHITE);
    surface.fill_circle(x + 15.0 * scale, y - 10.0 * scale, 25.0 * scale, Color::WHITE);
    surface.fill_circle(x + 35.0 * scale, y, 20.0 * scale, Color::WHITE);
    surface.set_alpha(1.0);
}

/// Small pixel heart used by HUDs
pub const HEART: Pattern = &[
    &[0, 1, 1, 0, 1, 1, 0],
    &[1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1],
    &[0, 1, 1, 1, 1, 1, 0],
    &[0, 0, 1, 1, 1, 0, 0],
    &[0, 0, 0, 1, 0, 0, 0],
];

/// Small pixel shield used by HUDs
pub const SHIELD: Pattern = &[
    &[1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1],
    &[1, 1, 1, 1, 1, 1, 1],
    &[0, 1, 1, 1, 1, 1, 0],
    &[0, 0, 1, 1, 1, 0, 0],
    &[0, 0, 0, 1, 0, 0, 0],
];
