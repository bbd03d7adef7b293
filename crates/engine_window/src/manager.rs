//! Window-manager plugin.
//!
//! Window state is published to the rest of the game as singleton
//! components on one configuration entity. Collector systems refresh them
//! from the [`WindowBackend`] when their `should_refetch` flag is set.

use std::rc::Rc;

use engine_component::{Entity, EntityId, EntityQuery, EntityStore, impl_component};
use engine_system::{Plugin, System, SystemContext, SystemManager};

use crate::backend::WindowBackend;
use crate::resolution::Resolution;

/// Current window resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidesCurrentResolution {
    pub should_refetch: bool,
    pub current_resolution: Resolution,
}
impl_component!(ProvidesCurrentResolution);

impl ProvidesCurrentResolution {
    /// Known resolution; the collector will not overwrite it.
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            should_refetch: false,
            current_resolution: resolution,
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.current_resolution.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.current_resolution.height
    }
}

impl Default for ProvidesCurrentResolution {
    /// Unknown resolution, fetched on the next update pass.
    fn default() -> Self {
        Self {
            should_refetch: true,
            current_resolution: Resolution::default(),
        }
    }
}

/// Frame rate the host loop should aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvidesTargetFps {
    pub fps: i32,
}
impl_component!(ProvidesTargetFps);

/// Resolutions the display supports, smallest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvidesAvailableWindowResolutions {
    pub should_refetch: bool,
    pub available_resolutions: Vec<Resolution>,
}
impl_component!(ProvidesAvailableWindowResolutions);

impl ProvidesAvailableWindowResolutions {
    #[must_use]
    pub fn new(available_resolutions: Vec<Resolution>) -> Self {
        Self {
            should_refetch: false,
            available_resolutions,
        }
    }

    #[must_use]
    pub fn resolutions(&self) -> &[Resolution] {
        &self.available_resolutions
    }
}

impl Default for ProvidesAvailableWindowResolutions {
    fn default() -> Self {
        Self {
            should_refetch: true,
            available_resolutions: Vec::new(),
        }
    }
}

/// Refreshes [`ProvidesCurrentResolution`] from the backend on request.
pub struct CollectCurrentResolution<B: ?Sized> {
    backend: Rc<B>,
}

impl<B: WindowBackend + ?Sized + 'static> System for CollectCurrentResolution<B> {
    type Signature = (ProvidesCurrentResolution,);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (provider,): (&mut ProvidesCurrentResolution,),
        _ctx: &mut SystemContext<'_>,
    ) {
        if provider.should_refetch {
            provider.current_resolution = self.backend.current_resolution();
            provider.should_refetch = false;
            tracing::debug!(resolution = %provider.current_resolution, "fetched current resolution");
        }
    }
}

/// Refreshes [`ProvidesAvailableWindowResolutions`] from the backend on
/// request.
pub struct CollectAvailableResolutions<B: ?Sized> {
    backend: Rc<B>,
}

impl<B: WindowBackend + ?Sized + 'static> System for CollectAvailableResolutions<B> {
    type Signature = (ProvidesAvailableWindowResolutions,);

    fn for_each_with(
        &mut self,
        _entity: EntityId,
        (provider,): (&mut ProvidesAvailableWindowResolutions,),
        _ctx: &mut SystemContext<'_>,
    ) {
        if provider.should_refetch {
            provider.available_resolutions = self.backend.available_resolutions();
            provider.should_refetch = false;
            tracing::debug!(
                count = provider.available_resolutions.len(),
                "fetched available resolutions"
            );
        }
    }
}

/// Attach the window singletons; both resolutions are fetched on the first
/// update pass.
pub fn add_singleton_components(entity: &mut Entity, target_fps: i32) {
    entity.add(ProvidesTargetFps { fps: target_fps });
    entity.add(ProvidesCurrentResolution::default());
    entity.add(ProvidesAvailableWindowResolutions::default());
}

/// Attach the window singletons with a known current resolution.
pub fn add_singleton_components_with_resolution(
    entity: &mut Entity,
    resolution: Resolution,
    target_fps: i32,
) {
    entity.add(ProvidesTargetFps { fps: target_fps });
    entity.add(ProvidesCurrentResolution::new(resolution));
    entity.add(ProvidesAvailableWindowResolutions::default());
}

/// Attach the window singletons with every value known up front.
pub fn add_singleton_components_with_available(
    entity: &mut Entity,
    resolution: Resolution,
    target_fps: i32,
    available: Vec<Resolution>,
) {
    entity.add(ProvidesTargetFps { fps: target_fps });
    entity.add(ProvidesCurrentResolution::new(resolution));
    entity.add(ProvidesAvailableWindowResolutions::new(available));
}

/// Switch to the `index`-th available resolution: update the current
/// resolution singleton and resize the window.
///
/// Returns the chosen resolution, or `None` if either singleton is missing
/// or `index` is out of range.
pub fn set_resolution<B: WindowBackend + ?Sized>(
    store: &mut EntityStore,
    index: usize,
    backend: &B,
) -> Option<Resolution> {
    let available = EntityQuery::new(store)
        .where_has_component::<ProvidesAvailableWindowResolutions>()
        .first_or_none()?
        .get::<ProvidesAvailableWindowResolutions>();
    let Some(&chosen) = available.resolutions().get(index) else {
        tracing::warn!(
            index,
            available = available.resolutions().len(),
            "resolution index out of range"
        );
        return None;
    };

    let holder = EntityQuery::new(store)
        .where_has_component::<ProvidesCurrentResolution>()
        .first_id()?;
    let provider = store
        .find_by_id_mut(holder)?
        .get_mut::<ProvidesCurrentResolution>();
    provider.current_resolution = chosen;
    provider.should_refetch = false;
    backend.set_window_size(chosen);
    tracing::info!(resolution = %chosen, "window resolution changed");
    Some(chosen)
}

/// Returns the current resolution singleton, if any.
#[must_use]
pub fn current_resolution(store: &EntityStore) -> Option<Resolution> {
    EntityQuery::new(store)
        .where_has_component::<ProvidesCurrentResolution>()
        .first_or_none()
        .map(|entity| entity.get::<ProvidesCurrentResolution>().current_resolution)
}

/// Installs the window singleton checks and collector systems.
pub struct WindowManager<B: ?Sized> {
    backend: Rc<B>,
}

impl<B: WindowBackend + ?Sized + 'static> WindowManager<B> {
    #[must_use]
    pub fn new(backend: Rc<B>) -> Self {
        Self { backend }
    }
}

impl<B: WindowBackend + ?Sized + 'static> Plugin for WindowManager<B> {
    fn enforce_singletons(&self, manager: &mut SystemManager) {
        manager.enforce_singleton::<ProvidesCurrentResolution>();
        manager.enforce_singleton::<ProvidesTargetFps>();
        manager.enforce_singleton::<ProvidesAvailableWindowResolutions>();
    }

    fn register_update_systems(&self, manager: &mut SystemManager) {
        manager.register_update_system(CollectCurrentResolution {
            backend: Rc::clone(&self.backend),
        });
        manager.register_update_system(CollectAvailableResolutions {
            backend: Rc::clone(&self.backend),
        });
    }
}
