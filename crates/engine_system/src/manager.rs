//! The frame scheduler.
//!
//! [`SystemManager::run`] executes one frame:
//!
//! 1. **Update pass.** Each update system, in registration order, is gated by
//!    `should_run`, gets its `once` call, then its per-entity hook for every
//!    matching entity. Entities are visited live: ones created earlier in
//!    the pass are visited by later systems, and by the same system when
//!    they were appended ahead of its cursor.
//! 2. **Cleanup sweep.** Every entity flagged during the pass is dropped.
//! 3. **Render pass.** Same structure over a read-only store. No sweep.
//!
//! There is no dependency graph between systems: registration order is the
//! only ordering guarantee.

use engine_component::{EntityStore, ForEachFlow};

use crate::context::{RenderContext, SystemContext};
use crate::developer::{EnforceSingleton, Plugin};
use crate::system::{
    RenderCallback, RenderRunner, RenderSystem, Registered, System, UpdateCallback, UpdateRunner,
};

/// Owns the update and render system lists and the frame counter.
#[derive(Default)]
pub struct SystemManager {
    update_systems: Vec<Box<dyn UpdateRunner>>,
    render_systems: Vec<Box<dyn RenderRunner>>,
    frame: u64,
}

impl SystemManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an update system.
    pub fn register_update_system<S: System>(&mut self, system: S) {
        let registered = Registered::update(system);
        tracing::debug!(system = UpdateRunner::name(&registered), "registered update system");
        self.update_systems.push(Box::new(registered));
    }

    /// Append a render system.
    pub fn register_render_system<S: RenderSystem>(&mut self, system: S) {
        let registered = Registered::render(system);
        tracing::debug!(system = RenderRunner::name(&registered), "registered render system");
        self.render_systems.push(Box::new(registered));
    }

    /// Append a closure that runs once per update pass.
    pub fn register_update_fn<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&mut SystemContext<'_>) + 'static,
    {
        let name = name.into();
        tracing::debug!(system = %name, "registered update callback");
        self.update_systems
            .push(Box::new(UpdateCallback { name, callback }));
    }

    /// Append a closure that runs once per render pass.
    pub fn register_render_fn<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: FnMut(&RenderContext<'_>) + 'static,
    {
        let name = name.into();
        tracing::debug!(system = %name, "registered render callback");
        self.render_systems
            .push(Box::new(RenderCallback { name, callback }));
    }

    /// Register an [`EnforceSingleton`] check for `C`.
    pub fn enforce_singleton<C: engine_component::Component>(&mut self) {
        self.register_update_system(EnforceSingleton::<C>::new());
    }

    /// Let a plugin register its singleton checks, then its update systems,
    /// then its render systems.
    pub fn add_plugin(&mut self, plugin: &impl Plugin) {
        plugin.enforce_singletons(self);
        plugin.register_update_systems(self);
        plugin.register_render_systems(self);
    }

    /// Run the update pass, then sweep entities flagged for cleanup.
    pub fn tick(&mut self, store: &mut EntityStore, dt: f32) {
        let frame = self.frame;
        for system in &mut self.update_systems {
            if !system.should_run(dt) {
                tracing::trace!(system = system.name(), frame, "system skipped");
                continue;
            }
            system.once(&mut SystemContext::new(store, dt, frame));
            if !system.visits_entities() {
                continue;
            }
            store.for_each_lent(|entity, store| {
                if system.matches(entity) {
                    system.run_for(entity, &mut SystemContext::new(store, dt, frame));
                }
                ForEachFlow::Normal
            });
        }
        let swept = store.sweep_cleanup();
        tracing::debug!(frame, swept, entities = store.len(), "update pass complete");
    }

    /// Run the render pass over a read-only store.
    pub fn render(&mut self, store: &EntityStore, dt: f32) {
        let ctx = RenderContext::new(store, dt, self.frame);
        for system in &mut self.render_systems {
            if !system.should_run(dt) {
                continue;
            }
            system.once(&ctx);
            if !system.visits_entities() {
                continue;
            }
            for entity in store.iter() {
                if system.matches(entity) {
                    system.run_for(entity, &ctx);
                }
            }
        }
    }

    /// Run one full frame: update pass, cleanup sweep, render pass. Advances
    /// the frame counter; `tick` and `render` on their own do not.
    pub fn run(&mut self, store: &mut EntityStore, dt: f32) {
        self.tick(store, dt);
        self.render(store, dt);
        self.frame += 1;
    }

    /// Number of frames completed by [`SystemManager::run`].
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[must_use]
    pub fn update_system_count(&self) -> usize {
        self.update_systems.len()
    }

    #[must_use]
    pub fn render_system_count(&self) -> usize {
        self.render_systems.len()
    }

    /// Names of the update systems, in run order.
    #[must_use]
    pub fn update_system_names(&self) -> Vec<&str> {
        self.update_systems.iter().map(|system| system.name()).collect()
    }

    /// Names of the render systems, in run order.
    #[must_use]
    pub fn render_system_names(&self) -> Vec<&str> {
        self.render_systems.iter().map(|system| system.name()).collect()
    }
}

impl std::fmt::Debug for SystemManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemManager")
            .field("update_systems", &self.update_system_names())
            .field("render_systems", &self.render_system_names())
            .field("frame", &self.frame)
            .finish()
    }
}
