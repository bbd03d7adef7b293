//! # engine_window
//!
//! Window-facing collaborators of the framework.
//!
//! - [`Resolution`] — width/height value type with area-first ordering.
//! - [`WindowBackend`] — capability for querying and resizing the window;
//!   [`HeadlessWindow`] implements it in memory.
//! - [`Canvas`] — immediate-mode drawing used by render systems;
//!   [`RecordingCanvas`] keeps the draw calls for inspection.
//! - [`WindowManager`] — plugin publishing window state as singleton
//!   components, plus [`set_resolution`] to switch display modes.

pub mod backend;
pub mod canvas;
pub mod manager;
pub mod resolution;

pub use backend::{HeadlessWindow, WindowBackend};
pub use canvas::{Canvas, Color, DrawCommand, RecordingCanvas};
pub use manager::{
    CollectAvailableResolutions, CollectCurrentResolution, ProvidesAvailableWindowResolutions,
    ProvidesCurrentResolution, ProvidesTargetFps, WindowManager, add_singleton_components,
    add_singleton_components_with_available, add_singleton_components_with_resolution,
    current_resolution, set_resolution,
};
pub use resolution::Resolution;
