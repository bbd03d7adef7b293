//! The entity store.
//!
//! [`EntityStore`] owns every live [`Entity`] in creation order. Removal is
//! two-phase: [`EntityStore::mark_for_cleanup`] flags an entity, which stays
//! visible and queryable until [`EntityStore::sweep_cleanup`] drops every
//! flagged entity at once. [`EntityStore::remove`] bypasses the flag for
//! forced deletes.
//!
//! ## Lending
//!
//! The scheduler needs to hand a system one entity mutably while the same
//! system may still query, create or flag *other* entities.
//! [`EntityStore::for_each_lent`] does this by moving each entity out of its
//! slot for the duration of the visit. While lent, the entity is invisible to
//! lookups, queries and iteration; flags and removals aimed at its id are
//! recorded and applied when it is returned.
//!
//! The store holds type-erased components without `Send`/`Sync` bounds, so
//! it cannot cross threads. Structural changes (creating, removing or
//! sweeping) invalidate references previously handed out by queries.

use std::collections::HashSet;

use crate::entity::{Entity, EntityAllocator, EntityId};

/// Options for [`EntityStore::create_with_options`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreationOptions {
    /// Permanent entities survive [`EntityStore::clear_all`] unless it is
    /// asked to include them.
    pub permanent: bool,
}

/// Flow control returned by store visitors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForEachFlow {
    /// Keep going.
    #[default]
    Normal,
    /// Skip to the next entity.
    Continue,
    /// Stop visiting.
    Break,
}

#[derive(Debug)]
struct Lent {
    id: EntityId,
    index: usize,
    marked: bool,
    removed: bool,
    swept: bool,
}

/// Owns all entities.
#[derive(Debug, Default)]
pub struct EntityStore {
    slots: Vec<Option<Entity>>,
    permanent: HashSet<EntityId>,
    allocator: EntityAllocator,
    lent: Option<Lent>,
}

impl EntityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transient entity.
    pub fn create(&mut self) -> &mut Entity {
        self.create_with_options(CreationOptions::default())
    }

    /// Create an entity that survives [`EntityStore::clear_all(false)`](EntityStore::clear_all).
    pub fn create_permanent(&mut self) -> &mut Entity {
        self.create_with_options(CreationOptions { permanent: true })
    }

    /// Create an entity as described by `options`.
    pub fn create_with_options(&mut self, options: CreationOptions) -> &mut Entity {
        let id = self.allocator.allocate();
        if options.permanent {
            self.permanent.insert(id);
        }
        tracing::debug!(entity = %id, permanent = options.permanent, "created entity");
        self.slots.push(None);
        let index = self.slots.len() - 1;
        self.slots[index].insert(Entity::new(id))
    }

    /// Flag the entity with `id` for removal at the next sweep. A no-op if
    /// no such entity exists.
    pub fn mark_for_cleanup(&mut self, id: EntityId) {
        if let Some(entity) = self.find_by_id_mut(id) {
            entity.mark_for_cleanup();
            return;
        }
        match &mut self.lent {
            Some(lent) if lent.id == id => lent.marked = true,
            _ => tracing::trace!(entity = %id, "mark_for_cleanup on unknown entity"),
        }
    }

    /// Remove the entity with `id` immediately, skipping the cleanup flag.
    /// Returns whether an entity was removed.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let position = self
            .slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|entity| entity.id() == id));
        if let Some(index) = position {
            self.slots.remove(index);
            if let Some(lent) = &mut self.lent {
                if index < lent.index {
                    lent.index -= 1;
                }
            }
            self.permanent.remove(&id);
            tracing::debug!(entity = %id, "removed entity");
            return true;
        }
        match &mut self.lent {
            Some(lent) if lent.id == id && !lent.removed => {
                lent.removed = true;
                tracing::debug!(entity = %id, "removed lent entity");
                true
            }
            _ => false,
        }
    }

    /// Drop every entity flagged for cleanup. Returns how many were removed.
    ///
    /// A lent entity is held by the visitor, so its own flag is checked when
    /// it is given back: if it is flagged then, it is dropped instead of
    /// returned to the store. Only a flag set through
    /// [`EntityStore::mark_for_cleanup`] is counted here.
    pub fn sweep_cleanup(&mut self) -> usize {
        let mut removed = self.remove_where(Entity::is_marked_for_cleanup);
        if let Some(lent) = &mut self.lent {
            lent.swept = true;
            if lent.marked && !lent.removed {
                lent.removed = true;
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::debug!(removed, "swept entities marked for cleanup");
        }
        removed
    }

    /// Remove every transient entity, and the permanent ones too when
    /// `include_permanent` is set.
    pub fn clear_all(&mut self, include_permanent: bool) {
        let keep = if include_permanent {
            HashSet::new()
        } else {
            self.permanent.clone()
        };
        let mut removed = self.remove_where(|entity| !keep.contains(&entity.id()));
        if let Some(lent) = &mut self.lent {
            if !keep.contains(&lent.id) && !lent.removed {
                lent.removed = true;
                removed += 1;
            }
        }
        if include_permanent {
            self.permanent.clear();
        }
        tracing::debug!(removed, include_permanent, "cleared entities");
    }

    /// Visit entities in creation order until the visitor breaks. Returns
    /// [`ForEachFlow::Break`] if it did.
    pub fn for_each(&self, mut visitor: impl FnMut(&Entity) -> ForEachFlow) -> ForEachFlow {
        for entity in self.iter() {
            if visitor(entity) == ForEachFlow::Break {
                return ForEachFlow::Break;
            }
        }
        ForEachFlow::Normal
    }

    /// Mutable counterpart of [`EntityStore::for_each`].
    pub fn for_each_mut(&mut self, mut visitor: impl FnMut(&mut Entity) -> ForEachFlow) -> ForEachFlow {
        for entity in self.iter_mut() {
            if visitor(entity) == ForEachFlow::Break {
                return ForEachFlow::Break;
            }
        }
        ForEachFlow::Normal
    }

    /// Visit every entity mutably while also handing the visitor the store.
    ///
    /// Entities created during the walk are visited in the same walk, and
    /// entities removed ahead of the cursor are skipped. The visited entity
    /// is lent out, so lookups of its own id through the store come back
    /// empty until the visitor returns. Nested calls visit nothing.
    pub fn for_each_lent(
        &mut self,
        mut visitor: impl FnMut(&mut Entity, &mut EntityStore) -> ForEachFlow,
    ) -> ForEachFlow {
        if self.lent.is_some() {
            tracing::warn!("nested for_each_lent ignored");
            return ForEachFlow::Normal;
        }
        let mut index = 0;
        while let Some(mut entity) = self.lend(index) {
            let flow = visitor(&mut entity, self);
            index = self.give_back(entity);
            if flow == ForEachFlow::Break {
                return ForEachFlow::Break;
            }
        }
        ForEachFlow::Normal
    }

    /// Look up a visible entity by id. A lent entity is not found.
    #[must_use]
    pub fn find_by_id(&self, id: EntityId) -> Option<&Entity> {
        self.iter().find(|entity| entity.id() == id)
    }

    /// Mutable counterpart of [`EntityStore::find_by_id`].
    #[must_use]
    pub fn find_by_id_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.iter_mut().find(|entity| entity.id() == id)
    }

    /// Iterate over visible entities in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.slots.iter().flatten()
    }

    /// Iterate mutably over visible entities in creation order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Returns the ids of all visible entities.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(Entity::id).collect()
    }

    /// Number of visible entities. An entity currently lent out is not
    /// counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - usize::from(self.lent.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_permanent(&self, id: EntityId) -> bool {
        self.permanent.contains(&id)
    }

    fn lend(&mut self, index: usize) -> Option<Entity> {
        let entity = self.slots.get_mut(index)?.take()?;
        self.lent = Some(Lent {
            id: entity.id(),
            index,
            marked: false,
            removed: false,
            swept: false,
        });
        Some(entity)
    }

    /// Put a lent entity back and return the index of the next slot to visit.
    fn give_back(&mut self, mut entity: Entity) -> usize {
        let Some(lent) = self.lent.take() else {
            self.slots.push(Some(entity));
            return self.slots.len();
        };
        if lent.marked {
            entity.mark_for_cleanup();
        }
        if lent.removed || (lent.swept && entity.is_marked_for_cleanup()) {
            self.slots.remove(lent.index);
            self.permanent.remove(&lent.id);
            tracing::debug!(entity = %lent.id, "dropped lent entity on return");
            return lent.index;
        }
        self.slots[lent.index] = Some(entity);
        lent.index + 1
    }

    /// Remove every stored entity matching `doomed`, keeping the lent slot.
    fn remove_where(&mut self, mut doomed: impl FnMut(&Entity) -> bool) -> usize {
        let lent_index = self.lent.as_ref().map(|lent| lent.index);
        let mut removed = Vec::new();
        let mut shift = 0;
        let mut position = 0;
        self.slots.retain(|slot| {
            let keep = match slot {
                Some(entity) if doomed(entity) => {
                    removed.push(entity.id());
                    if lent_index.is_some_and(|lent| position < lent) {
                        shift += 1;
                    }
                    false
                }
                _ => true,
            };
            position += 1;
            keep
        });
        if let Some(lent) = &mut self.lent {
            lent.index -= shift;
        }
        for id in &removed {
            self.permanent.remove(id);
        }
        removed.len()
    }
}
