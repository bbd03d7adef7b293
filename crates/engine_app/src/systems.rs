//! Update systems of the paddle game.

use engine_component::{EntityId, EntityQuery, EntityStore};
use engine_input::get_input_collector;
use engine_math::{Vec2, vec2};
use engine_system::{System, SystemContext};
use engine_window::current_resolution;

use crate::components::{
    BALL_SIZE, BALL_VELOCITY, Ball, HasColor, InputAction, PADDLE_SPEED, PlayerId, Score,
    Transform, Velocity,
};

/// Moves each paddle by the actions attributed to its gamepad.
pub struct MovePaddles;

impl System for MovePaddles {
    type Signature = (Transform, PlayerId);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (transform, player): (&mut Transform, &mut PlayerId),
        ctx: &mut SystemContext<'_>,
    ) {
        let Some(collector) = get_input_collector::<InputAction>(ctx.store) else {
            return;
        };

        let mut up = false;
        let mut down = false;
        for done in collector.inputs_for(player.id) {
            match done.action {
                InputAction::PaddleUp => up = true,
                InputAction::PaddleDown => down = true,
                _ => {}
            }
        }

        let mut position = transform.position;
        if up {
            position.y -= PADDLE_SPEED * ctx.dt;
        }
        if down {
            position.y += PADDLE_SPEED * ctx.dt;
        }
        if let Some(resolution) = current_resolution(ctx.store) {
            let floor = (resolution.height as f32 - transform.size.y).max(0.0);
            position.y = position.y.clamp(0.0, floor);
        }
        transform.position = position;
    }
}

/// Serves a resting ball when `Launch` is pressed.
pub struct LaunchBall;

impl System for LaunchBall {
    type Signature = (Ball, Velocity);

    fn for_each_with(
        &mut self,
        entity: EntityId,
        (ball, velocity): (&mut Ball, &mut Velocity),
        ctx: &mut SystemContext<'_>,
    ) {
        if velocity.0 != Vec2::ZERO {
            return;
        }
        let launched = get_input_collector::<InputAction>(ctx.store)
            .is_some_and(|collector| collector.was_pressed(InputAction::Launch));
        if launched {
            velocity.0 = vec2(BALL_VELOCITY.x * ball.serve, BALL_VELOCITY.y);
            tracing::info!(%entity, serve = ball.serve, "ball launched");
        }
    }
}

/// Integrates velocity into position.
pub struct ApplyVelocity;

impl System for ApplyVelocity {
    type Signature = (Transform, Velocity);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (transform, velocity): (&mut Transform, &mut Velocity),
        ctx: &mut SystemContext<'_>,
    ) {
        transform.position += velocity.0 * ctx.dt;
    }
}

/// Reflects the ball off the top and bottom of the window.
pub struct BounceOffWalls;

impl System for BounceOffWalls {
    type Signature = (Transform, Velocity, Ball);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (transform, velocity, _ball): (&mut Transform, &mut Velocity, &mut Ball),
        ctx: &mut SystemContext<'_>,
    ) {
        let Some(resolution) = current_resolution(ctx.store) else {
            return;
        };
        let floor = resolution.height as f32 - transform.size.y;
        if transform.position.y <= 0.0 && velocity.0.y < 0.0 {
            transform.position.y = 0.0;
            velocity.0.y = -velocity.0.y;
        } else if transform.position.y >= floor && velocity.0.y > 0.0 {
            transform.position.y = floor;
            velocity.0.y = -velocity.0.y;
        }
    }
}

/// Sends the ball back, away from the paddle it hit.
pub struct PaddleCollision;

impl System for PaddleCollision {
    type Signature = (Transform, Velocity, Ball);

    fn for_each_with(
        &mut self,
        entity: EntityId,
        (transform, velocity, _ball): (&mut Transform, &mut Velocity, &mut Ball),
        ctx: &mut SystemContext<'_>,
    ) {
        let paddle_x = ctx
            .query()
            .where_has_component::<PlayerId>()
            .where_overlaps::<Transform>(transform.rect())
            .first_or_none()
            .map(|paddle| paddle.get::<Transform>().center().x);
        if let Some(paddle_x) = paddle_x {
            let away = if transform.center().x < paddle_x { -1.0 } else { 1.0 };
            velocity.0.x = velocity.0.x.abs() * away;
            tracing::debug!(%entity, "ball hit paddle");
        }
    }
}

/// Scores a point and retires the ball once it leaves the window sideways.
pub struct ScoreOnExit;

impl System for ScoreOnExit {
    type Signature = (Transform, Ball);

    fn for_each_with(
        &mut self,
        entity: EntityId,
        (transform, _ball): (&mut Transform, &mut Ball),
        ctx: &mut SystemContext<'_>,
    ) {
        let Some(resolution) = current_resolution(ctx.store) else {
            return;
        };
        let rect = transform.rect();
        let left_scored = rect.left() > resolution.width as f32;
        let right_scored = rect.right() < 0.0;
        if !left_scored && !right_scored {
            return;
        }

        ctx.store.mark_for_cleanup(entity);
        let holder = ctx.query().where_has_component::<Score>().first_id();
        if let Some(score) = holder
            .and_then(|id| ctx.store.find_by_id_mut(id))
            .map(|holder| holder.get_mut::<Score>())
        {
            if left_scored {
                score.left += 1;
            } else {
                score.right += 1;
            }
            tracing::info!(left = score.left, right = score.right, "point scored");
        }
    }
}

/// Puts a fresh ball in play when none is left. Serves towards the side
/// that conceded the last point.
pub fn respawn_ball(ctx: &mut SystemContext<'_>) {
    let live = ctx
        .query()
        .where_has_component::<Ball>()
        .where_not_marked_for_cleanup()
        .has_results();
    if live {
        return;
    }
    let serve = match EntityQuery::new(ctx.store)
        .where_has_component::<Ball>()
        .first_or_none()
    {
        Some(old) if old.get::<Transform>().position.x < 0.0 => -1.0,
        _ => 1.0,
    };
    let id = spawn_ball(ctx.store, serve);
    tracing::debug!(entity = %id, "ball respawned");
}

/// Create a resting ball in the middle of the default window.
pub fn spawn_ball(store: &mut EntityStore, serve: f32) -> EntityId {
    let center = current_resolution(store)
        .filter(|resolution| resolution.width > 0)
        .map_or(vec2(640.0, 360.0), |resolution| {
            vec2(resolution.width as f32, resolution.height as f32) * 0.5
        });
    let entity = store.create();
    entity.add(Transform::new(center - BALL_SIZE * 0.5, BALL_SIZE));
    entity.add(Velocity::default());
    entity.add(Ball { serve });
    entity.add(HasColor {
        color: engine_window::Color::ORANGE,
    });
    entity.id()
}
