//! Window backend capability.
//!
//! The framework never talks to a windowing library directly. Plugins hold a
//! shared handle to a [`WindowBackend`] and ask it for display modes.
//! [`HeadlessWindow`] is the in-process implementation used by the demo and
//! by tests.

use std::cell::{Cell, RefCell};

use crate::resolution::Resolution;

/// Access to the window and the display it lives on.
pub trait WindowBackend {
    /// Current render size.
    fn current_resolution(&self) -> Resolution;

    /// Display modes reported by the primary monitor, in any order and
    /// possibly with duplicates.
    fn video_modes(&self) -> Vec<Resolution>;

    /// Resize the window.
    fn set_window_size(&self, resolution: Resolution);

    /// Sorted, de-duplicated list of available resolutions.
    fn available_resolutions(&self) -> Vec<Resolution> {
        let mut modes = self.video_modes();
        modes.sort();
        modes.dedup();
        modes
    }
}

/// A window that exists only in memory.
#[derive(Debug)]
pub struct HeadlessWindow {
    current: Cell<Resolution>,
    modes: RefCell<Vec<Resolution>>,
    resizes: Cell<u32>,
}

impl HeadlessWindow {
    /// 1280x720 window on a display offering 1280x720 and 1920x1080.
    #[must_use]
    pub fn new() -> Self {
        Self::with_modes(
            Resolution::new(1280, 720),
            vec![Resolution::new(1280, 720), Resolution::new(1920, 1080)],
        )
    }

    #[must_use]
    pub fn with_modes(current: Resolution, modes: Vec<Resolution>) -> Self {
        Self {
            current: Cell::new(current),
            modes: RefCell::new(modes),
            resizes: Cell::new(0),
        }
    }

    /// Replace the reported display modes, as if a monitor was swapped.
    pub fn set_video_modes(&self, modes: Vec<Resolution>) {
        *self.modes.borrow_mut() = modes;
    }

    /// Number of `set_window_size` calls so far.
    #[must_use]
    pub fn resize_count(&self) -> u32 {
        self.resizes.get()
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowBackend for HeadlessWindow {
    fn current_resolution(&self) -> Resolution {
        self.current.get()
    }

    fn video_modes(&self) -> Vec<Resolution> {
        self.modes.borrow().clone()
    }

    fn set_window_size(&self, resolution: Resolution) {
        tracing::debug!(%resolution, "resizing headless window");
        self.current.set(resolution);
        self.resizes.set(self.resizes.get() + 1);
    }
}
