//! Per-pass execution contexts handed to systems.

use engine_component::{EntityQuery, EntityStore};

/// Context for update systems.
///
/// During a per-entity call, the entity being visited is lent out of the
/// store: `store` sees every *other* entity, and queries built from it never
/// return the visited one. In particular:
///
/// - `ctx.store.find_by_id(entity)` returns `None` for the visited id.
/// - `ctx.query().where_marked_for_cleanup()` does not report the visited
///   entity, even right after it flagged itself.
/// - `count()` over a kind the visited entity carries is one lower than
///   the number of entities holding that kind.
///
/// Read the visited entity's own state from the hook's arguments instead.
#[derive(Debug)]
pub struct SystemContext<'a> {
    /// The entity store, open for creation, flagging and lookups.
    pub store: &'a mut EntityStore,
    /// Delta time since the last frame, in seconds.
    pub dt: f32,
    /// Frame number, starting at zero.
    pub frame: u64,
}

impl<'a> SystemContext<'a> {
    #[must_use]
    pub fn new(store: &'a mut EntityStore, dt: f32, frame: u64) -> Self {
        Self { store, dt, frame }
    }

    /// Start a query over the entities currently visible in the store.
    #[must_use]
    pub fn query(&self) -> EntityQuery<'_> {
        EntityQuery::new(self.store)
    }
}

/// Context for render systems. Read-only access to the store.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Every entity in the store; nothing is lent during rendering.
    pub store: &'a EntityStore,
    /// Delta time since the last frame, in seconds.
    pub dt: f32,
    /// Frame number, starting at zero.
    pub frame: u64,
}

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn new(store: &'a EntityStore, dt: f32, frame: u64) -> Self {
        Self { store, dt, frame }
    }

    #[must_use]
    pub fn query(&self) -> EntityQuery<'a> {
        EntityQuery::new(self.store)
    }
}
