//! World setup and system wiring for the paddle game.

use std::rc::Rc;

use engine_component::{EntityId, EntityStore};
use engine_input::{
    AnyInput, InputMapping, InputPlugin, RenderConnectedGamepads, VirtualInput, axis, button, key,
};
use engine_math::vec2;
use engine_system::SystemManager;
use engine_window::{Canvas, Color, HeadlessWindow, RecordingCanvas, WindowManager};

use crate::components::{InputAction, PADDLE_SIZE, PlayerId, Score, Transform};
use crate::render::{RenderEntities, RenderFps, RenderScore};
use crate::systems::{
    ApplyVelocity, BounceOffWalls, LaunchBall, MovePaddles, PaddleCollision, ScoreOnExit,
    respawn_ball, spawn_ball,
};

/// Keyboard arrows, left stick and d-pad for the paddles; space or any face
/// button to serve.
#[must_use]
pub fn default_mapping() -> InputMapping<InputAction> {
    InputMapping::from([
        (
            InputAction::PaddleUp,
            vec![
                AnyInput::Key(key::UP),
                AnyInput::Axis {
                    axis: axis::LEFT_Y,
                    dir: -1,
                },
                AnyInput::Button(button::LEFT_FACE_UP),
            ],
        ),
        (
            InputAction::PaddleDown,
            vec![
                AnyInput::Key(key::DOWN),
                AnyInput::Axis {
                    axis: axis::LEFT_Y,
                    dir: 1,
                },
                AnyInput::Button(button::LEFT_FACE_DOWN),
            ],
        ),
        (
            InputAction::Launch,
            vec![
                AnyInput::Key(key::SPACE),
                AnyInput::Button(button::RIGHT_FACE_UP),
                AnyInput::Button(button::RIGHT_FACE_DOWN),
                AnyInput::Button(button::RIGHT_FACE_LEFT),
                AnyInput::Button(button::RIGHT_FACE_RIGHT),
            ],
        ),
    ])
}

/// Create the configuration entity, both paddles and the first ball.
pub fn setup_world(store: &mut EntityStore, mapping: InputMapping<InputAction>, target_fps: i32) {
    let config = store.create_permanent();
    engine_input::add_singleton_components(config, mapping);
    engine_window::add_singleton_components(config, target_fps);
    config.add(Score::default());

    make_paddle(store, 0);
    make_paddle(store, 1);
    spawn_ball(store, 1.0);
}

/// Left paddle for gamepad 0, right paddle for everyone else.
pub fn make_paddle(store: &mut EntityStore, id: i32) -> EntityId {
    let x = if id == 0 { 150.0 } else { 1100.0 };
    let entity = store.create();
    entity.add(PlayerId { id });
    entity.add(Transform::new(vec2(x, 720.0 / 2.0), PADDLE_SIZE));
    entity.id()
}

/// Register plugins, game systems and render systems in frame order.
pub fn build_systems(
    input: &Rc<VirtualInput>,
    window: &Rc<HeadlessWindow>,
    canvas: &Rc<RecordingCanvas>,
) -> SystemManager {
    let mut systems = SystemManager::new();
    systems.add_plugin(&WindowManager::new(Rc::clone(window)));
    systems.add_plugin(&InputPlugin::<InputAction, _>::new(Rc::clone(input)));

    systems.register_update_system(MovePaddles);
    systems.register_update_system(LaunchBall);
    systems.register_update_system(ApplyVelocity);
    systems.register_update_system(BounceOffWalls);
    systems.register_update_system(PaddleCollision);
    systems.register_update_system(ScoreOnExit);
    systems.register_update_fn("respawn_ball", respawn_ball);

    let clear = Rc::clone(canvas);
    systems.register_render_fn("clear_background", move |_ctx| clear.clear(Color::DARK_GRAY));
    systems.register_render_system(RenderFps::new(Rc::clone(canvas)));
    systems.register_render_system(RenderConnectedGamepads::new(Rc::clone(canvas)));
    systems.register_render_system(RenderEntities::new(Rc::clone(canvas)));
    systems.register_render_system(RenderScore::new(Rc::clone(canvas)));
    systems
}

/// A running game: the store, its systems and the headless devices.
pub struct Game {
    store: EntityStore,
    systems: SystemManager,
    input: Rc<VirtualInput>,
    window: Rc<HeadlessWindow>,
    canvas: Rc<RecordingCanvas>,
}

impl Game {
    #[must_use]
    pub fn new(mapping: InputMapping<InputAction>, target_fps: i32) -> Self {
        let input = Rc::new(VirtualInput::new());
        let window = Rc::new(HeadlessWindow::new());
        let canvas = Rc::new(RecordingCanvas::new());
        let systems = build_systems(&input, &window, &canvas);
        let mut store = EntityStore::new();
        setup_world(&mut store, mapping, target_fps);
        Self {
            store,
            systems,
            input,
            window,
            canvas,
        }
    }

    /// Run one frame, then clear the input edges it consumed.
    pub fn frame(&mut self, dt: f32) {
        self.systems.run(&mut self.store, dt);
        self.input.end_frame();
    }

    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    #[must_use]
    pub fn input(&self) -> &VirtualInput {
        &self.input
    }

    #[must_use]
    pub fn window(&self) -> &HeadlessWindow {
        &self.window
    }

    #[must_use]
    pub fn canvas(&self) -> &RecordingCanvas {
        &self.canvas
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.systems.frame()
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{Entity, EntityQuery};
    use engine_window::{DrawCommand, WindowBackend};

    use super::*;
    use crate::components::{Ball, Velocity};

    fn game() -> Game {
        let mut game = Game::new(default_mapping(), 60);
        // First frame fetches the window resolution.
        game.frame(0.0);
        game
    }

    fn paddle(game: &Game, id: i32) -> Transform {
        *EntityQuery::new(game.store())
            .where_lambda(move |entity: &Entity| {
                entity.try_get::<PlayerId>().is_some_and(|player| player.id == id)
            })
            .first()
            .get::<Transform>()
    }

    fn ball_id(game: &Game) -> EntityId {
        EntityQuery::new(game.store())
            .where_has_component::<Ball>()
            .first_id()
            .unwrap()
    }

    fn place_ball(game: &mut Game, x: f32, y: f32, velocity: (f32, f32)) {
        let id = ball_id(game);
        let ball = game.store_mut().find_by_id_mut(id).unwrap();
        ball.get_mut::<Transform>().position = vec2(x, y);
        ball.get_mut::<Velocity>().0 = vec2(velocity.0, velocity.1);
    }

    fn ball(game: &Game) -> (Transform, Velocity) {
        let entity = game.store().find_by_id(ball_id(game)).unwrap();
        (*entity.get::<Transform>(), *entity.get::<Velocity>())
    }

    #[test]
    fn test_setup_world() {
        let game = game();
        assert_eq!(game.store().len(), 4);
        assert_eq!(
            EntityQuery::new(game.store())
                .where_has_component::<PlayerId>()
                .count(),
            2
        );
        assert_eq!(paddle(&game, 0).position, vec2(150.0, 360.0));
        assert_eq!(paddle(&game, 1).position, vec2(1100.0, 360.0));
        assert_eq!(ball(&game).1, Velocity::default());
    }

    #[test]
    fn test_keyboard_moves_left_paddle_only() {
        let mut game = game();
        game.input().press_key(key::UP);
        game.frame(0.5);
        assert_eq!(paddle(&game, 0).position.y, 310.0);
        assert_eq!(paddle(&game, 1).position.y, 360.0);
    }

    #[test]
    fn test_paddle_is_clamped_to_window() {
        let mut game = game();
        game.input().press_key(key::DOWN);
        for _ in 0..10 {
            game.frame(1.0);
        }
        assert_eq!(paddle(&game, 0).position.y, 720.0 - PADDLE_SIZE.y);
    }

    #[test]
    fn test_gamepad_moves_right_paddle() {
        let mut game = game();
        game.input().connect_gamepads(2);
        game.input().set_axis(1, axis::LEFT_Y, -1.0);
        game.frame(0.5);
        assert_eq!(paddle(&game, 0).position.y, 360.0);
        assert_eq!(paddle(&game, 1).position.y, 310.0);
    }

    #[test]
    fn test_launch_serves_ball() {
        let mut game = game();
        game.input().press_key(key::SPACE);
        game.frame(0.0);
        assert_eq!(ball(&game).1, Velocity(vec2(300.0, 180.0)));

        // Pressed edge is gone; the ball keeps its velocity.
        game.frame(0.0);
        assert_eq!(ball(&game).1, Velocity(vec2(300.0, 180.0)));
    }

    #[test]
    fn test_ball_bounces_off_top_wall() {
        let mut game = game();
        place_ball(&mut game, 600.0, 1.0, (0.0, -200.0));
        game.frame(0.01);
        let (transform, velocity) = ball(&game);
        assert_eq!(transform.position.y, 0.0);
        assert_eq!(velocity.0.y, 200.0);
    }

    #[test]
    fn test_ball_reverses_on_paddle() {
        let mut game = game();
        place_ball(&mut game, 190.0, 400.0, (-300.0, 0.0));
        game.frame(0.01);
        let (_, velocity) = ball(&game);
        assert_eq!(velocity.0.x, 300.0);
    }

    #[test]
    fn test_ball_leaving_scores_and_respawns() {
        let mut game = game();
        let old = ball_id(&game);
        place_ball(&mut game, -100.0, 300.0, (-300.0, 0.0));
        game.frame(0.01);

        let new = ball_id(&game);
        assert_ne!(old, new);
        assert!(game.store().find_by_id(old).is_none());
        assert_eq!(
            EntityQuery::new(game.store())
                .where_has_component::<Ball>()
                .count(),
            1
        );
        let serve = game.store().find_by_id(new).unwrap().get::<Ball>().serve;
        assert_eq!(serve, -1.0);

        let score = *EntityQuery::new(game.store())
            .where_has_component::<Score>()
            .first()
            .get::<Score>();
        assert_eq!(score, Score { left: 0, right: 1 });
    }

    #[test]
    fn test_render_pass_draws_frame() {
        let mut game = game();
        game.frame(0.5);
        let commands = game.canvas().commands();
        assert_eq!(commands[0], DrawCommand::Clear(Color::DARK_GRAY));
        let rects = commands
            .iter()
            .filter(|command| matches!(command, DrawCommand::Rect { .. }))
            .count();
        assert_eq!(rects, 3);
        assert_eq!(
            game.canvas().texts(),
            vec![
                "2 FPS".to_string(),
                "Gamepads connected: 0".to_string(),
                "0 - 0".to_string(),
            ]
        );
        assert_eq!(game.frames(), 2);
    }

    #[test]
    fn test_window_resolution_is_fetched() {
        let game = game();
        assert_eq!(
            engine_window::current_resolution(game.store()),
            Some(game.window().current_resolution())
        );
    }
}
