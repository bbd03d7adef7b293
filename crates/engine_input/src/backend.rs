//! Input device capability.
//!
//! [`InputBackend`] is the only way the plugin observes devices. A real
//! frontend wraps its windowing library; [`VirtualInput`] keeps device state
//! in memory so that demos and tests can script it.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Keyboard key code.
pub type KeyCode = i32;
/// Index of a connected gamepad, starting at zero.
pub type GamepadId = i32;
/// Analog axis on a gamepad.
pub type GamepadAxis = i32;
/// Digital button on a gamepad.
pub type GamepadButton = i32;

/// Common key codes.
pub mod key {
    use super::KeyCode;

    pub const SPACE: KeyCode = 32;
    pub const ESCAPE: KeyCode = 256;
    pub const ENTER: KeyCode = 257;
    pub const RIGHT: KeyCode = 262;
    pub const LEFT: KeyCode = 263;
    pub const DOWN: KeyCode = 264;
    pub const UP: KeyCode = 265;
    pub const W: KeyCode = 87;
    pub const S: KeyCode = 83;
}

/// Gamepad axes.
pub mod axis {
    use super::GamepadAxis;

    pub const LEFT_X: GamepadAxis = 0;
    pub const LEFT_Y: GamepadAxis = 1;
    pub const RIGHT_X: GamepadAxis = 2;
    pub const RIGHT_Y: GamepadAxis = 3;
}

/// Gamepad buttons.
pub mod button {
    use super::GamepadButton;

    pub const LEFT_FACE_UP: GamepadButton = 1;
    pub const LEFT_FACE_RIGHT: GamepadButton = 2;
    pub const LEFT_FACE_DOWN: GamepadButton = 3;
    pub const LEFT_FACE_LEFT: GamepadButton = 4;
    pub const RIGHT_FACE_UP: GamepadButton = 5;
    pub const RIGHT_FACE_RIGHT: GamepadButton = 6;
    pub const RIGHT_FACE_DOWN: GamepadButton = 7;
    pub const RIGHT_FACE_LEFT: GamepadButton = 8;
}

/// Polling access to keyboard and gamepads.
///
/// "Pressed" queries report an edge (went down this frame), "down" queries
/// report the held state.
pub trait InputBackend {
    fn is_key_pressed(&self, key: KeyCode) -> bool;
    fn is_key_down(&self, key: KeyCode) -> bool;
    fn is_gamepad_available(&self, id: GamepadId) -> bool;
    /// Axis position in `[-1, 1]`.
    fn gamepad_axis_movement(&self, id: GamepadId, axis: GamepadAxis) -> f32;
    fn is_gamepad_button_pressed(&self, id: GamepadId, button: GamepadButton) -> bool;
    fn is_gamepad_button_down(&self, id: GamepadId, button: GamepadButton) -> bool;

    /// Install a controller database (SDL `gamecontrollerdb.txt` format).
    fn set_gamepad_mappings(&self, mappings: &str) {
        let _ = mappings;
    }
}

#[derive(Debug, Default)]
struct DeviceState {
    keys_down: BTreeSet<KeyCode>,
    keys_pressed: BTreeSet<KeyCode>,
    gamepads: i32,
    axes: BTreeMap<(GamepadId, GamepadAxis), f32>,
    buttons_down: BTreeSet<(GamepadId, GamepadButton)>,
    buttons_pressed: BTreeSet<(GamepadId, GamepadButton)>,
    mappings: Option<String>,
}

/// Scriptable in-memory devices.
///
/// Pressing a key or button that is not already held also raises its
/// "pressed" edge, which stays visible until [`VirtualInput::end_frame`].
#[derive(Debug, Default)]
pub struct VirtualInput {
    state: RefCell<DeviceState>,
}

impl VirtualInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press_key(&self, key: KeyCode) {
        let mut state = self.state.borrow_mut();
        if state.keys_down.insert(key) {
            state.keys_pressed.insert(key);
        }
    }

    pub fn release_key(&self, key: KeyCode) {
        self.state.borrow_mut().keys_down.remove(&key);
    }

    /// Set how many gamepads are connected; ids `0..count` become available.
    pub fn connect_gamepads(&self, count: i32) {
        tracing::debug!(count, "virtual gamepads connected");
        self.state.borrow_mut().gamepads = count.max(0);
    }

    pub fn set_axis(&self, id: GamepadId, axis: GamepadAxis, value: f32) {
        self.state
            .borrow_mut()
            .axes
            .insert((id, axis), value.clamp(-1.0, 1.0));
    }

    pub fn press_button(&self, id: GamepadId, button: GamepadButton) {
        let mut state = self.state.borrow_mut();
        if state.buttons_down.insert((id, button)) {
            state.buttons_pressed.insert((id, button));
        }
    }

    pub fn release_button(&self, id: GamepadId, button: GamepadButton) {
        self.state.borrow_mut().buttons_down.remove(&(id, button));
    }

    /// Clear the "pressed" edges; held keys and buttons stay down.
    pub fn end_frame(&self) {
        let mut state = self.state.borrow_mut();
        state.keys_pressed.clear();
        state.buttons_pressed.clear();
    }

    /// The controller database installed through the backend, if any.
    #[must_use]
    pub fn gamepad_mappings(&self) -> Option<String> {
        self.state.borrow().mappings.clone()
    }
}

impl InputBackend for VirtualInput {
    fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.state.borrow().keys_pressed.contains(&key)
    }

    fn is_key_down(&self, key: KeyCode) -> bool {
        self.state.borrow().keys_down.contains(&key)
    }

    fn is_gamepad_available(&self, id: GamepadId) -> bool {
        (0..self.state.borrow().gamepads).contains(&id)
    }

    fn gamepad_axis_movement(&self, id: GamepadId, axis: GamepadAxis) -> f32 {
        if !self.is_gamepad_available(id) {
            return 0.0;
        }
        self.state
            .borrow()
            .axes
            .get(&(id, axis))
            .copied()
            .unwrap_or(0.0)
    }

    fn is_gamepad_button_pressed(&self, id: GamepadId, button: GamepadButton) -> bool {
        self.is_gamepad_available(id) && self.state.borrow().buttons_pressed.contains(&(id, button))
    }

    fn is_gamepad_button_down(&self, id: GamepadId, button: GamepadButton) -> bool {
        self.is_gamepad_available(id) && self.state.borrow().buttons_down.contains(&(id, button))
    }

    fn set_gamepad_mappings(&self, mappings: &str) {
        tracing::debug!(bytes = mappings.len(), "gamepad mappings installed");
        self.state.borrow_mut().mappings = Some(mappings.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_raises_edge_until_end_of_frame() {
        let input = VirtualInput::new();
        input.press_key(key::UP);
        assert!(input.is_key_pressed(key::UP));
        assert!(input.is_key_down(key::UP));

        input.end_frame();
        assert!(!input.is_key_pressed(key::UP));
        assert!(input.is_key_down(key::UP));

        // Already held: no new edge.
        input.press_key(key::UP);
        assert!(!input.is_key_pressed(key::UP));

        input.release_key(key::UP);
        assert!(!input.is_key_down(key::UP));
    }

    #[test]
    fn test_gamepad_state_requires_connection() {
        let input = VirtualInput::new();
        input.set_axis(0, axis::LEFT_Y, -0.8);
        input.press_button(0, button::LEFT_FACE_UP);
        assert!(!input.is_gamepad_available(0));
        assert_eq!(input.gamepad_axis_movement(0, axis::LEFT_Y), 0.0);
        assert!(!input.is_gamepad_button_down(0, button::LEFT_FACE_UP));

        input.connect_gamepads(2);
        assert!(input.is_gamepad_available(1));
        assert!(!input.is_gamepad_available(2));
        assert_eq!(input.gamepad_axis_movement(0, axis::LEFT_Y), -0.8);
        assert!(input.is_gamepad_button_pressed(0, button::LEFT_FACE_UP));
    }

    #[test]
    fn test_axis_is_clamped() {
        let input = VirtualInput::new();
        input.connect_gamepads(1);
        input.set_axis(0, axis::LEFT_X, 3.0);
        assert_eq!(input.gamepad_axis_movement(0, axis::LEFT_X), 1.0);
    }

    #[test]
    fn test_gamepad_mappings_are_kept() {
        let input = VirtualInput::new();
        assert_eq!(input.gamepad_mappings(), None);
        input.set_gamepad_mappings("030000005e040000,Xbox Controller,a:b0");
        assert!(input.gamepad_mappings().is_some_and(|db| db.contains("Xbox")));
    }
}
