//! Game components.

use engine_component::{Bounded, Positioned, impl_component};
use engine_input::GamepadId;
use engine_math::{Rect, Vec2, vec2};
use engine_window::Color;
use serde::Deserialize;

/// Actions the game reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum InputAction {
    PaddleUp,
    PaddleDown,
    Launch,
}

/// Position and size of anything drawn on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    pub size: Vec2,
}
impl_component!(Transform);

impl Transform {
    #[must_use]
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }
}

impl Positioned for Transform {
    fn position(&self) -> Vec2 {
        self.position
    }
}

impl Bounded for Transform {
    fn bounds(&self) -> Rect {
        self.rect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HasColor {
    pub color: Color,
}
impl_component!(HasColor);

/// Which gamepad drives a paddle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerId {
    pub id: GamepadId,
}
impl_component!(PlayerId);

/// Pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity(pub Vec2);
impl_component!(Velocity);

/// The ball. It waits at rest until launched towards `serve`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    /// Horizontal serve direction, `-1.0` or `1.0`.
    pub serve: f32,
}
impl_component!(Ball);

/// Points per side. Lives on the configuration entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}
impl_component!(Score);

pub const PADDLE_SIZE: Vec2 = vec2(50.0, 250.0);
pub const PADDLE_SPEED: f32 = 100.0;
pub const BALL_SIZE: Vec2 = vec2(20.0, 20.0);
pub const BALL_VELOCITY: Vec2 = vec2(300.0, 180.0);
