//! Recording surface
//!
//! Captures draw calls as data. Used by tests and by the native headless run.

use super::{Color, Surface, TextAlign};

/// A single recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Color },
    StrokeRect { x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32 },
    FillCircle { x: f32, y: f32, radius: f32, color: Color },
    StrokeCircle { x: f32, y: f32, radius: f32, color: Color, line_width: f32 },
    Line { from: (f32, f32), to: (f32, f32), color: Color, line_width: f32 },
    Text { text: String, x: f32, y: f32, size: f32, align: TextAlign, color: Color },
    Alpha(f32),
    Save,
    Restore,
    Translate(f32, f32),
    Rotate(f32),
}

/// In-memory surface that records every call
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: f32,
    height: f32,
    pub cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            cmds: Vec::new(),
        }
    }

    /// Drop recorded commands, keep the size
    pub fn clear(&mut self) {
        self.cmds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// All text drawn since the last clear
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| match c {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t.contains(needle))
    }

    /// Number of save calls minus restore calls (0 when balanced)
    pub fn stack_depth(&self) -> i32 {
        self.cmds.iter().fold(0, |depth, c| match c {
            DrawCmd::Save => depth + 1,
            DrawCmd::Restore => depth - 1,
            _ => depth,
        })
    }
}

impl Surface for DrawList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.cmds.push(DrawCmd::FillRect { x, y, w, h, color });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, line_width: f32) {
        self.cmds.push(DrawCmd::StrokeRect {
            x,
            y,
            w,
            h,
            color,
            line_width,
        });
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        self.cmds.push(DrawCmd::FillCircle { x, y, radius, color });
    }

    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, color: Color, line_width: f32) {
        self.cmds.push(DrawCmd::StrokeCircle {
            x,
            y,
            radius,
            color,
            line_width,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32), color: Color, line_width: f32) {
        self.cmds.push(DrawCmd::Line {
            from,
            to,
            color,
            line_width,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color) {
        self.cmds.push(DrawCmd::Text {
            text: text.to_string(),
            x,
            y,
            size,
            align,
            color,
        });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.cmds.push(DrawCmd::Alpha(alpha));
    }

    fn save(&mut self) {
        self.cmds.push(DrawCmd::Save);
    }

    fn restore(&mut self) {
        self.cmds.push(DrawCmd::Restore);
    }

    fn translate(&mut self, x: f32, y: f32) {
        self.cmds.push(DrawCmd::Translate(x, y));
    }

    fn rotate(&mut self, radians: f32) {
        self.cmds.push(DrawCmd::Rotate(radians));
    }
}
