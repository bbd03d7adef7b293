//! Render systems of the paddle game.

use std::rc::Rc;

use engine_component::Entity;
use engine_math::vec2;
use engine_system::{RenderContext, RenderSystem};
use engine_window::{Canvas, Color, ProvidesCurrentResolution};

use crate::components::{HasColor, Score, Transform};

/// Draws the frame rate in the top-right corner.
pub struct RenderFps<C: ?Sized> {
    canvas: Rc<C>,
}

impl<C: Canvas + ?Sized> RenderFps<C> {
    #[must_use]
    pub fn new(canvas: Rc<C>) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized + 'static> RenderSystem for RenderFps<C> {
    type Signature = (ProvidesCurrentResolution,);

    fn for_each_with(
        &mut self,
        _entity: &Entity,
        (resolution,): (&ProvidesCurrentResolution,),
        ctx: &RenderContext<'_>,
    ) {
        let fps = if ctx.dt > 0.0 { (1.0 / ctx.dt).round() } else { 0.0 };
        self.canvas.draw_text(
            &format!("{fps} FPS"),
            vec2(resolution.width() as f32 - 80.0, 0.0),
            20.0,
            Color::GREEN,
        );
    }
}

/// Draws every entity with a [`Transform`] as a filled rectangle.
pub struct RenderEntities<C: ?Sized> {
    canvas: Rc<C>,
}

impl<C: Canvas + ?Sized> RenderEntities<C> {
    #[must_use]
    pub fn new(canvas: Rc<C>) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized + 'static> RenderSystem for RenderEntities<C> {
    type Signature = (Transform,);

    fn for_each_with(&mut self, entity: &Entity, (transform,): (&Transform,), _ctx: &RenderContext<'_>) {
        let color = entity
            .try_get::<HasColor>()
            .map_or(Color::WHITE, |has_color| has_color.color);
        self.canvas.draw_rect(transform.rect(), color);
    }
}

pub struct RenderScore<C: ?Sized> {
    canvas: Rc<C>,
}

impl<C: Canvas + ?Sized> RenderScore<C> {
    #[must_use]
    pub fn new(canvas: Rc<C>) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized + 'static> RenderSystem for RenderScore<C> {
    type Signature = (Score,);

    fn for_each_with(&mut self, _entity: &Entity, (score,): (&Score,), _ctx: &RenderContext<'_>) {
        self.canvas.draw_text(
            &format!("{} - {}", score.left, score.right),
            vec2(610.0, 20.0),
            30.0,
            Color::WHITE,
        );
    }
}
