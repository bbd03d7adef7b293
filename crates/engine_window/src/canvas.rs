//! Drawing capability used by render systems.

use std::cell::RefCell;

use engine_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// An 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(230, 41, 55);
    pub const GREEN: Self = Self::rgb(0, 228, 48);
    pub const BLUE: Self = Self::rgb(0, 121, 241);
    pub const ORANGE: Self = Self::rgb(255, 161, 0);
    pub const DARK_GRAY: Self = Self::rgb(80, 80, 80);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Immediate-mode drawing surface.
///
/// Methods take `&self` so one canvas can be shared by several render
/// systems through an `Rc`.
pub trait Canvas {
    fn clear(&self, color: Color);
    fn draw_rect(&self, rect: Rect, color: Color);
    fn draw_text(&self, text: &str, position: Vec2, size: f32, color: Color);
}

/// A single recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Rect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        size: f32,
        color: Color,
    },
}

/// A canvas that keeps every draw call of the current frame in memory.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    commands: RefCell<Vec<DrawCommand>>,
}

impl RecordingCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the commands recorded so far.
    #[must_use]
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.commands.borrow().clone()
    }

    /// Drain the recorded commands, typically once per presented frame.
    pub fn take_commands(&self) -> Vec<DrawCommand> {
        self.commands.take()
    }

    /// Text of every recorded text command, in draw order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, command: DrawCommand) {
        tracing::trace!(?command, "draw");
        self.commands.borrow_mut().push(command);
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&self, color: Color) {
        // A clear wipes whatever was drawn before it.
        self.commands.borrow_mut().clear();
        self.record(DrawCommand::Clear(color));
    }

    fn draw_rect(&self, rect: Rect, color: Color) {
        self.record(DrawCommand::Rect { rect, color });
    }

    fn draw_text(&self, text: &str, position: Vec2, size: f32, color: Color) {
        self.record(DrawCommand::Text {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use engine_math::vec2;

    use super::*;

    #[test]
    fn test_records_in_order() {
        let canvas = RecordingCanvas::new();
        canvas.draw_rect(Rect::from_xywh(0.0, 0.0, 1.0, 1.0), Color::RED);
        canvas.draw_text("hi", vec2(1.0, 2.0), 20.0, Color::WHITE);
        assert_eq!(canvas.commands().len(), 2);
        assert_eq!(canvas.texts(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_clear_discards_previous_commands() {
        let canvas = RecordingCanvas::new();
        canvas.draw_rect(Rect::default(), Color::RED);
        canvas.clear(Color::BLACK);
        assert_eq!(canvas.commands(), vec![DrawCommand::Clear(Color::BLACK)]);
        assert_eq!(canvas.take_commands().len(), 1);
        assert!(canvas.commands().is_empty());
    }
}
