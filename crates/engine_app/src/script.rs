//! Scripted device input for headless runs.

use engine_input::{GamepadAxis, GamepadId, KeyCode, VirtualInput, axis, key};

/// One scripted change to the virtual devices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    PressKey(KeyCode),
    ReleaseKey(KeyCode),
    ConnectGamepads(i32),
    SetAxis {
        id: GamepadId,
        axis: GamepadAxis,
        value: f32,
    },
}

/// Frame-indexed steps: serve, move the left paddle up with the keyboard,
/// then plug in two gamepads and push the right paddle down.
pub const DEMO_SCRIPT: &[(u64, Step)] = &[
    (1, Step::PressKey(key::SPACE)),
    (2, Step::ReleaseKey(key::SPACE)),
    (30, Step::PressKey(key::UP)),
    (90, Step::ReleaseKey(key::UP)),
    (100, Step::ConnectGamepads(2)),
    (
        100,
        Step::SetAxis {
            id: 1,
            axis: axis::LEFT_Y,
            value: 0.9,
        },
    ),
    (
        160,
        Step::SetAxis {
            id: 1,
            axis: axis::LEFT_Y,
            value: 0.0,
        },
    ),
];

/// Apply the steps scheduled for `frame`.
pub fn drive(input: &VirtualInput, script: &[(u64, Step)], frame: u64) {
    for (_, step) in script.iter().filter(|(at, _)| *at == frame) {
        tracing::debug!(frame, ?step, "scripted input");
        match *step {
            Step::PressKey(code) => input.press_key(code),
            Step::ReleaseKey(code) => input.release_key(code),
            Step::ConnectGamepads(count) => input.connect_gamepads(count),
            Step::SetAxis { id, axis, value } => input.set_axis(id, axis, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use engine_input::InputBackend;

    use super::*;

    #[test]
    fn test_drive_applies_only_current_frame() {
        let input = VirtualInput::new();
        drive(&input, DEMO_SCRIPT, 0);
        assert!(!input.is_key_down(key::SPACE));

        drive(&input, DEMO_SCRIPT, 1);
        assert!(input.is_key_pressed(key::SPACE));

        drive(&input, DEMO_SCRIPT, 100);
        assert!(input.is_gamepad_available(1));
        assert_eq!(input.gamepad_axis_movement(1, axis::LEFT_Y), 0.9);
    }
}
