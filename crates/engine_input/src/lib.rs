//! # engine_input
//!
//! Input-mapping plugin for the framework.
//!
//! Games declare an action enum and map each action to the raw inputs that
//! trigger it ([`InputMapping`]). Every frame [`InputSystem`] polls an
//! [`InputBackend`] and rebuilds the [`InputCollector`] singleton with one
//! [`ActionDone`] record per action, device and gamepad id. Systems read the
//! collector through [`get_input_collector`].

pub mod backend;
pub mod error;
pub mod mapping;
pub mod plugin;

pub use backend::{
    GamepadAxis, GamepadButton, GamepadId, InputBackend, KeyCode, VirtualInput, axis, button, key,
};
pub use error::MappingError;
pub use mapping::{AnyInput, InputMapping, load_mapping, parse_mapping};
pub use plugin::{
    Action, ActionDone, DEADZONE, DeviceMedium, InputCollector, InputPlugin, InputSystem,
    MAX_GAMEPAD_ID, ProvidesInputMapping, ProvidesMaxGamepadId, RenderConnectedGamepads,
    add_singleton_components, get_input_collector,
};
