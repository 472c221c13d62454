//! Drawing surface adapter
//!
//! Games draw through the [`Surface`] trait so the same simulation renders to
//! a browser canvas or into an in-memory [`DrawList`].

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod draw_list;
pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use draw_list::{DrawCmd, DrawList};

use serde::{Deserialize, Serialize};

/// Font family used for every piece of in-game text
pub const FONT_FAMILY: &str = "\"Press Start 2P\"";

/// An sRGB color with straight alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::hex(0xffffff);
    pub const BLACK: Color = Color::hex(0x000000);
    pub const RED: Color = Color::hex(0xff0000);

    /// Opaque color from a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 1.0,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// CSS color string for the canvas fill/stroke style
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a.max(0.0))
        }
    }
}

/// Horizontal anchor for text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// Immediate-mode 2D drawing target with a fixed size
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32);
    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color);
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, color: Color, line_width: f32);
    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color);

    /// Global opacity applied to every following draw
    fn set_alpha(&mut self, alpha: f32);

    /// Push the transform and alpha state
    fn save(&mut self);
    /// Pop back to the last saved state
    fn restore(&mut self);
    fn translate(&mut self, x: f32, y: f32);
    fn rotate(&mut self, radians: f32);

    /// Surfaces with a non-positive side cannot be laid out
    fn is_drawable(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_css() {
        assert_eq!(Color::hex(0x70c5ce).css(), "#70c5ce");
        assert_eq!(Color::rgba(0, 0, 0, 0.5).css(), "rgba(0,0,0,0.5)");
    }

    #[test]
    fn test_drawable() {
        assert!(DrawList::new(400.0, 600.0).is_drawable());
        assert!(!DrawList::new(0.0, 600.0).is_drawable());
        assert!(!DrawList::new(400.0, -1.0).is_drawable());
    }
}
