//! Development-time checks and the plugin contract.

use std::marker::PhantomData;

use engine_component::{Component, EntityId};

use crate::context::SystemContext;
use crate::manager::SystemManager;
use crate::system::System;

/// Aborts the frame if more than one entity carries `C` during a pass.
///
/// Meant for configuration components that must exist exactly once, such
/// as the input collector or the current window resolution.
pub struct EnforceSingleton<C> {
    first: Option<EntityId>,
    _marker: PhantomData<fn() -> C>,
}

impl<C> EnforceSingleton<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            first: None,
            _marker: PhantomData,
        }
    }
}

impl<C> Default for EnforceSingleton<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> System for EnforceSingleton<C> {
    type Signature = (C,);

    fn once(&mut self, _ctx: &mut SystemContext<'_>) {
        self.first = None;
    }

    fn for_each_with(&mut self, entity: EntityId, _components: (&mut C,), _ctx: &mut SystemContext<'_>) {
        match self.first {
            None => self.first = Some(entity),
            Some(first) => {
                tracing::error!(
                    component = C::kind_name(),
                    %first,
                    %entity,
                    "singleton component found on more than one entity"
                );
                panic!(
                    "singleton component {} found on more than one entity ({first} and {entity})",
                    C::kind_name()
                );
            }
        }
    }
}

/// A bundle of systems a consumer of the framework can install at once.
///
/// Plugins usually hold shared handles to their backends and clone them into
/// the systems they register.
pub trait Plugin {
    /// Register [`EnforceSingleton`] checks for the plugin's configuration
    /// components.
    fn enforce_singletons(&self, manager: &mut SystemManager) {
        let _ = manager;
    }

    fn register_update_systems(&self, manager: &mut SystemManager) {
        let _ = manager;
    }

    fn register_render_systems(&self, manager: &mut SystemManager) {
        let _ = manager;
    }
}

#[cfg(test)]
mod tests {
    use engine_component::{EntityStore, impl_component};

    use super::*;

    struct Settings;
    impl_component!(Settings);

    struct Counter;

    impl Plugin for Counter {
        fn enforce_singletons(&self, manager: &mut SystemManager) {
            manager.enforce_singleton::<Settings>();
        }

        fn register_update_systems(&self, manager: &mut SystemManager) {
            manager.register_update_fn("count", |_| {});
        }
    }

    #[test]
    fn test_single_instance_passes() {
        let mut store = EntityStore::new();
        store.create().add(Settings);
        store.create();

        let mut manager = SystemManager::new();
        manager.enforce_singleton::<Settings>();
        manager.run(&mut store, 0.0);
        manager.run(&mut store, 0.0);
        assert_eq!(manager.frame(), 2);
    }

    #[test]
    #[should_panic(expected = "found on more than one entity")]
    fn test_second_instance_panics() {
        let mut store = EntityStore::new();
        store.create().add(Settings);
        store.create().add(Settings);

        let mut manager = SystemManager::new();
        manager.enforce_singleton::<Settings>();
        manager.tick(&mut store, 0.0);
    }

    #[test]
    fn test_plugin_registers_in_order() {
        let mut manager = SystemManager::new();
        manager.add_plugin(&Counter);
        assert_eq!(
            manager.update_system_names(),
            vec!["EnforceSingleton<Settings>", "count"]
        );
        assert_eq!(manager.render_system_count(), 0);
    }
}
