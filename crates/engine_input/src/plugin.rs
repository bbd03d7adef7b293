//! Input singletons, the collection system and the plugin that installs
//! them.

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use engine_component::{Component, Entity, EntityId, EntityQuery, EntityStore, impl_component};
use engine_math::{sgn, vec2};
use engine_system::{Plugin, RenderContext, RenderSystem, System, SystemContext, SystemManager};
use engine_window::{Canvas, Color};

use crate::backend::{GamepadId, InputBackend};
use crate::mapping::{AnyInput, InputMapping};

/// Axis positions with a smaller magnitude are ignored.
pub const DEADZONE: f32 = 0.25;

/// Gamepad ids polled each frame are `0..MAX_GAMEPAD_ID`.
pub const MAX_GAMEPAD_ID: GamepadId = 8;

/// A game-defined action identifier, usually a fieldless enum.
pub trait Action: Copy + Ord + fmt::Debug + 'static {}

impl<T: Copy + Ord + fmt::Debug + 'static> Action for T {}

/// Device family an action was triggered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceMedium {
    #[default]
    None,
    Keyboard,
    Gamepad,
}

/// One action observed during a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDone<A> {
    pub medium: DeviceMedium,
    /// Gamepad id the action was attributed to.
    pub id: GamepadId,
    pub action: A,
    /// Strongest contributing input: `1.0` for keys and buttons, the axis
    /// magnitude for analog input.
    pub amount: f32,
    /// Frame delta the action was held for.
    pub duration: f32,
}

/// Per-frame action records, rebuilt by [`InputSystem`].
#[derive(Debug, Clone, PartialEq)]
pub struct InputCollector<A> {
    /// Actions held this frame.
    pub inputs: Vec<ActionDone<A>>,
    /// Actions that started this frame.
    pub inputs_pressed: Vec<ActionDone<A>>,
    /// Seconds since anything was last held.
    pub since_last_input: f32,
}

impl<A> Default for InputCollector<A> {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            inputs_pressed: Vec::new(),
            since_last_input: 0.0,
        }
    }
}

impl<A: Action> Component for InputCollector<A> {}

impl<A: Action> InputCollector<A> {
    /// Held actions attributed to gamepad `id`.
    pub fn inputs_for(&self, id: GamepadId) -> impl Iterator<Item = &ActionDone<A>> + '_ {
        self.inputs.iter().filter(move |done| done.id == id)
    }

    /// Returns `true` if `action` started this frame on any device.
    #[must_use]
    pub fn was_pressed(&self, action: A) -> bool {
        self.inputs_pressed.iter().any(|done| done.action == action)
    }
}

/// Highest connected gamepad id, or `-1` when none is connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvidesMaxGamepadId {
    pub max_gamepad_id_available: GamepadId,
}
impl_component!(ProvidesMaxGamepadId);

impl ProvidesMaxGamepadId {
    /// Number of connected gamepads.
    #[must_use]
    pub fn connected(&self) -> i32 {
        self.max_gamepad_id_available + 1
    }
}

impl Default for ProvidesMaxGamepadId {
    fn default() -> Self {
        Self {
            max_gamepad_id_available: 1,
        }
    }
}

/// The game's action mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidesInputMapping<A> {
    pub mapping: InputMapping<A>,
}

impl<A: Action> Component for ProvidesInputMapping<A> {}

impl<A> ProvidesInputMapping<A> {
    #[must_use]
    pub fn new(mapping: InputMapping<A>) -> Self {
        Self { mapping }
    }
}

/// Attach the input singletons to `entity`.
pub fn add_singleton_components<A: Action>(entity: &mut Entity, mapping: InputMapping<A>) {
    entity.add(InputCollector::<A>::default());
    entity.add(ProvidesMaxGamepadId::default());
    entity.add(ProvidesInputMapping::new(mapping));
}

/// Find the collector singleton through a query.
#[must_use]
pub fn get_input_collector<A: Action>(store: &EntityStore) -> Option<&InputCollector<A>> {
    EntityQuery::new(store)
        .where_has_component::<InputCollector<A>>()
        .first_or_none()
        .map(|entity| entity.get::<InputCollector<A>>())
}

/// Polls the backend and rebuilds the [`InputCollector`] every frame.
pub struct InputSystem<A, B: ?Sized> {
    backend: Rc<B>,
    _action: PhantomData<fn() -> A>,
}

impl<A, B: InputBackend + ?Sized> InputSystem<A, B> {
    #[must_use]
    pub fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            _action: PhantomData,
        }
    }

    /// Highest id before the first unavailable gamepad.
    fn fetch_max_gamepad_id(&self) -> GamepadId {
        (0..MAX_GAMEPAD_ID)
            .find(|&id| !self.backend.is_gamepad_available(id))
            .unwrap_or(MAX_GAMEPAD_ID)
            - 1
    }

    fn axis_value(&self, id: GamepadId, axis: i32, dir: i32) -> f32 {
        let movement = self.backend.gamepad_axis_movement(id, axis);
        if sgn(movement) == dir && movement.abs() > DEADZONE {
            movement.abs()
        } else {
            0.0
        }
    }

    /// Strongest of `inputs` for gamepad `id`, held or edge-triggered.
    fn strongest(&self, id: GamepadId, inputs: &[AnyInput], held: bool) -> (DeviceMedium, f32) {
        let mut best = (DeviceMedium::None, 0.0);
        for input in inputs {
            let candidate = match *input {
                AnyInput::Key(key) => {
                    let active = if held {
                        self.backend.is_key_down(key)
                    } else {
                        self.backend.is_key_pressed(key)
                    };
                    (DeviceMedium::Keyboard, if active { 1.0 } else { 0.0 })
                }
                AnyInput::Axis { axis, dir } => (DeviceMedium::Gamepad, self.axis_value(id, axis, dir)),
                AnyInput::Button(button) => {
                    let active = if held {
                        self.backend.is_gamepad_button_down(id, button)
                    } else {
                        self.backend.is_gamepad_button_pressed(id, button)
                    };
                    (DeviceMedium::Gamepad, if active { 1.0 } else { 0.0 })
                }
            };
            if candidate.1 > best.1 {
                best = candidate;
            }
        }
        best
    }
}

impl<A: Action, B: InputBackend + ?Sized + 'static> System for InputSystem<A, B> {
    type Signature = (InputCollector<A>, ProvidesMaxGamepadId, ProvidesInputMapping<A>);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (collector, max_id, mapping): (
            &mut InputCollector<A>,
            &mut ProvidesMaxGamepadId,
            &mut ProvidesInputMapping<A>,
        ),
        ctx: &mut SystemContext<'_>,
    ) {
        let max = self.fetch_max_gamepad_id().max(-1);
        if max != max_id.max_gamepad_id_available {
            tracing::debug!(max_gamepad_id = max, "gamepad count changed");
        }
        max_id.max_gamepad_id_available = max;
        collector.inputs.clear();
        collector.inputs_pressed.clear();

        for (&action, inputs) in &mapping.mapping {
            // Id 0 is always polled so the keyboard works without gamepads.
            for id in 0..=max.max(0) {
                let (medium, amount) = self.strongest(id, inputs, true);
                if amount > 0.0 {
                    collector.inputs.push(ActionDone {
                        medium,
                        id,
                        action,
                        amount,
                        duration: ctx.dt,
                    });
                }
                let (medium, amount) = self.strongest(id, inputs, false);
                if amount > 0.0 {
                    collector.inputs_pressed.push(ActionDone {
                        medium,
                        id,
                        action,
                        amount,
                        duration: ctx.dt,
                    });
                }
            }
        }

        if collector.inputs.is_empty() {
            collector.since_last_input += ctx.dt;
        } else {
            collector.since_last_input = 0.0;
        }
        tracing::trace!(
            held = collector.inputs.len(),
            pressed = collector.inputs_pressed.len(),
            "input collected"
        );
    }
}

/// Draws the number of connected gamepads.
pub struct RenderConnectedGamepads<C: ?Sized> {
    canvas: Rc<C>,
}

impl<C: Canvas + ?Sized> RenderConnectedGamepads<C> {
    #[must_use]
    pub fn new(canvas: Rc<C>) -> Self {
        Self { canvas }
    }
}

impl<C: Canvas + ?Sized + 'static> RenderSystem for RenderConnectedGamepads<C> {
    type Signature = (ProvidesMaxGamepadId,);

    fn for_each_with(
        &mut self,
        _entity: &Entity,
        (max_id,): (&ProvidesMaxGamepadId,),
        _ctx: &RenderContext<'_>,
    ) {
        self.canvas.draw_text(
            &format!("Gamepads connected: {}", max_id.connected()),
            vec2(400.0, 60.0),
            20.0,
            Color::RED,
        );
    }
}

/// Installs the input singleton checks and [`InputSystem`].
///
/// [`RenderConnectedGamepads`] needs a canvas and is registered separately.
pub struct InputPlugin<A, B: ?Sized> {
    backend: Rc<B>,
    _action: PhantomData<fn() -> A>,
}

impl<A: Action, B: InputBackend + ?Sized + 'static> InputPlugin<A, B> {
    #[must_use]
    pub fn new(backend: Rc<B>) -> Self {
        Self {
            backend,
            _action: PhantomData,
        }
    }
}

impl<A: Action, B: InputBackend + ?Sized + 'static> Plugin for InputPlugin<A, B> {
    fn enforce_singletons(&self, manager: &mut SystemManager) {
        manager.enforce_singleton::<InputCollector<A>>();
        manager.enforce_singleton::<ProvidesMaxGamepadId>();
        manager.enforce_singleton::<ProvidesInputMapping<A>>();
    }

    fn register_update_systems(&self, manager: &mut SystemManager) {
        manager.register_update_system(InputSystem::<A, B>::new(Rc::clone(&self.backend)));
    }
}

#[cfg(test)]
mod tests {
    use engine_window::RecordingCanvas;

    use super::*;
    use crate::backend::{VirtualInput, axis, button, key};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Act {
        Up,
        Down,
        Launch,
    }

    fn mapping() -> InputMapping<Act> {
        InputMapping::from([
            (
                Act::Up,
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
                Act::Down,
                vec![
                    AnyInput::Key(key::DOWN),
                    AnyInput::Axis {
                        axis: axis::LEFT_Y,
                        dir: 1,
                    },
                ],
            ),
            (Act::Launch, vec![AnyInput::Key(key::SPACE)]),
        ])
    }

    fn setup() -> (EntityStore, SystemManager, Rc<VirtualInput>) {
        let input = Rc::new(VirtualInput::new());
        let mut store = EntityStore::new();
        add_singleton_components(store.create_permanent(), mapping());
        let mut manager = SystemManager::new();
        manager.add_plugin(&InputPlugin::<Act, _>::new(Rc::clone(&input)));
        (store, manager, input)
    }

    fn collector(store: &EntityStore) -> &InputCollector<Act> {
        get_input_collector::<Act>(store).unwrap()
    }

    #[test]
    fn test_keyboard_without_gamepads_uses_id_zero() {
        let (mut store, mut manager, input) = setup();
        input.press_key(key::UP);
        manager.run(&mut store, 0.5);

        let collector = collector(&store);
        assert_eq!(
            collector.inputs,
            vec![ActionDone {
                medium: DeviceMedium::Keyboard,
                id: 0,
                action: Act::Up,
                amount: 1.0,
                duration: 0.5,
            }]
        );
        assert_eq!(collector.inputs_pressed.len(), 1);
        assert_eq!(collector.since_last_input, 0.0);

        let max_id = EntityQuery::new(&store)
            .where_has_component::<ProvidesMaxGamepadId>()
            .first()
            .get::<ProvidesMaxGamepadId>();
        assert_eq!(max_id.max_gamepad_id_available, -1);
    }

    #[test]
    fn test_pressed_is_an_edge_and_held_persists() {
        let (mut store, mut manager, input) = setup();
        input.press_key(key::SPACE);
        manager.run(&mut store, 0.1);
        assert!(collector(&store).was_pressed(Act::Launch));

        input.end_frame();
        manager.run(&mut store, 0.1);
        assert!(!collector(&store).was_pressed(Act::Launch));
        assert_eq!(collector(&store).inputs.len(), 1);
    }

    #[test]
    fn test_axis_respects_direction_and_deadzone() {
        let (mut store, mut manager, input) = setup();
        input.connect_gamepads(1);

        input.set_axis(0, axis::LEFT_Y, -0.2);
        manager.run(&mut store, 0.1);
        assert!(collector(&store).inputs.is_empty());

        input.set_axis(0, axis::LEFT_Y, 0.6);
        manager.run(&mut store, 0.1);
        let inputs = &collector(&store).inputs;
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].action, Act::Down);
        assert_eq!(inputs[0].medium, DeviceMedium::Gamepad);
        assert_eq!(inputs[0].amount, 0.6);
    }

    #[test]
    fn test_each_gamepad_is_attributed_separately() {
        let (mut store, mut manager, input) = setup();
        input.connect_gamepads(2);
        input.press_button(1, button::LEFT_FACE_UP);
        manager.run(&mut store, 0.1);

        let collector = collector(&store);
        assert_eq!(collector.inputs_for(0).count(), 0);
        let for_one: Vec<_> = collector.inputs_for(1).collect();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].action, Act::Up);
    }

    #[test]
    fn test_keyboard_counts_for_every_polled_gamepad() {
        let (mut store, mut manager, input) = setup();
        input.connect_gamepads(2);
        input.press_key(key::DOWN);
        manager.run(&mut store, 0.1);

        let ids: Vec<_> = collector(&store).inputs.iter().map(|done| done.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_since_last_input_accumulates_then_resets() {
        let (mut store, mut manager, input) = setup();
        manager.run(&mut store, 0.25);
        manager.run(&mut store, 0.25);
        assert_eq!(collector(&store).since_last_input, 0.5);

        input.press_key(key::UP);
        manager.run(&mut store, 0.25);
        assert_eq!(collector(&store).since_last_input, 0.0);
    }

    #[test]
    fn test_max_gamepad_id_tracks_connections() {
        let (mut store, mut manager, input) = setup();
        input.connect_gamepads(3);
        manager.run(&mut store, 0.1);
        let max_id = *EntityQuery::new(&store)
            .where_has_component::<ProvidesMaxGamepadId>()
            .first()
            .get::<ProvidesMaxGamepadId>();
        assert_eq!(max_id.max_gamepad_id_available, 2);

        input.connect_gamepads(20);
        manager.run(&mut store, 0.1);
        let max_id = *EntityQuery::new(&store)
            .where_has_component::<ProvidesMaxGamepadId>()
            .first()
            .get::<ProvidesMaxGamepadId>();
        assert_eq!(max_id.max_gamepad_id_available, MAX_GAMEPAD_ID - 1);
    }

    #[test]
    fn test_render_connected_gamepads() {
        let (mut store, mut manager, input) = setup();
        let canvas = Rc::new(RecordingCanvas::new());
        manager.register_render_system(RenderConnectedGamepads::new(Rc::clone(&canvas)));
        input.connect_gamepads(2);
        manager.run(&mut store, 0.1);
        assert_eq!(canvas.texts(), vec!["Gamepads connected: 2".to_string()]);
    }

    #[test]
    fn test_missing_collector() {
        let store = EntityStore::new();
        assert!(get_input_collector::<Act>(&store).is_none());
    }

    #[test]
    #[should_panic(expected = "found on more than one entity")]
    fn test_duplicate_collectors_are_rejected() {
        let (mut store, mut manager, _input) = setup();
        add_singleton_components(store.create(), mapping());
        manager.run(&mut store, 0.1);
    }
}
