//! Entities and identifier allocation.
//!
//! An [`Entity`] owns its components outright: one boxed instance per kind,
//! keyed by [`ComponentTypeId`], plus a [`ComponentBitSet`] mirror of which
//! kinds are attached so signature checks never touch the map. Entities are
//! created by an [`EntityStore`](crate::EntityStore) and cannot be cloned.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use crate::bitset::ComponentBitSet;
use crate::component::{Component, ComponentTypeId, is_a, view_as, view_as_mut};
use crate::error::{ComponentError, contract_violation};
use crate::set::{ComponentSet, DefaultComponents};

/// A unique entity identifier.
///
/// Ids are handed out by an [`EntityAllocator`] in increasing order and are
/// never reused, so an id that no longer resolves means the entity is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create an id from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids, starting at zero.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Returns the number of ids allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id
    }
}

/// Predicate used to pick components in the derived matching mode.
pub type KindMatcher = fn(&(dyn Component + 'static)) -> bool;

/// An identity plus a sparse set of attached components.
pub struct Entity {
    id: EntityId,
    membership: ComponentBitSet,
    components: BTreeMap<ComponentTypeId, Box<dyn Component>>,
    cleanup: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            membership: ComponentBitSet::new(),
            components: BTreeMap::new(),
            cleanup: false,
        }
    }

    /// Returns this entity's unique identifier.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the membership bitset: bit `k` is set iff kind `k` is attached.
    #[must_use]
    pub fn membership(&self) -> &ComponentBitSet {
        &self.membership
    }

    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Iterate over attached components in kind-id order.
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> + '_ {
        self.components.values().map(Box::as_ref)
    }

    /// Returns `true` if a `K` is attached.
    #[must_use]
    pub fn has<K: Component>(&self) -> bool {
        self.membership.contains(ComponentTypeId::of::<K>())
    }

    /// Returns `true` if every kind in `S` is attached.
    #[must_use]
    pub fn has_all<S: ComponentSet>(&self) -> bool {
        self.membership.contains_all(&S::mask())
    }

    #[must_use]
    pub fn is_missing<K: Component>(&self) -> bool {
        !self.has::<K>()
    }

    /// Returns `true` if at least one kind in `S` is not attached.
    #[must_use]
    pub fn is_missing_any<S: ComponentSet>(&self) -> bool {
        !self.has_all::<S>()
    }

    /// Returns `true` if any attached component is a `K`, either exactly or
    /// through one of its base kinds.
    #[must_use]
    pub fn has_any_base_of<K: Component>(&self) -> bool {
        self.components().any(is_a::<K>)
    }

    /// Attach `value`, failing if a `K` is already present.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::AlreadyPresent`] and leaves the existing
    /// component untouched if the kind is already attached.
    pub fn try_add<K: Component>(&mut self, value: K) -> Result<&mut K, ComponentError> {
        let kind = ComponentTypeId::of::<K>();
        match self.components.entry(kind) {
            Entry::Occupied(_) => Err(ComponentError::AlreadyPresent {
                entity: self.id,
                component: K::kind_name(),
            }),
            Entry::Vacant(slot) => {
                self.membership.insert(kind);
                tracing::trace!(entity = %self.id, component = K::kind_name(), "added component");
                slot.insert(Box::new(value))
                    .downcast_mut::<K>()
                    .ok_or(ComponentError::Missing {
                        entity: self.id,
                        component: K::kind_name(),
                    })
            }
        }
    }

    /// Attach `value` and return a reference to the stored instance.
    ///
    /// # Panics
    ///
    /// Panics if a `K` is already attached. The existing component is kept.
    #[track_caller]
    pub fn add<K: Component>(&mut self, value: K) -> &mut K {
        match self.try_add(value) {
            Ok(component) => component,
            Err(err) => contract_violation(err),
        }
    }

    /// Attach `value` unless a `K` is already present, then return the
    /// stored instance. The new value is dropped if one existed.
    pub fn add_if_missing<K: Component>(&mut self, value: K) -> &mut K {
        if self.has::<K>() {
            return self.get_mut::<K>();
        }
        self.add(value)
    }

    /// Attach a default instance of every kind in `S` that is not already
    /// present.
    pub fn add_all<S: DefaultComponents>(&mut self) {
        S::add_defaults(self);
    }

    /// Detach and drop the `K` component.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Missing`] if no `K` is attached.
    pub fn try_remove<K: Component>(&mut self) -> Result<(), ComponentError> {
        let kind = ComponentTypeId::of::<K>();
        if self.components.remove(&kind).is_none() {
            return Err(ComponentError::Missing {
                entity: self.id,
                component: K::kind_name(),
            });
        }
        self.membership.remove(kind);
        tracing::trace!(entity = %self.id, component = K::kind_name(), "removed component");
        Ok(())
    }

    /// Detach and drop the `K` component.
    ///
    /// # Panics
    ///
    /// Panics if no `K` is attached.
    #[track_caller]
    pub fn remove<K: Component>(&mut self) {
        if let Err(err) = self.try_remove::<K>() {
            contract_violation(err);
        }
    }

    /// Detach the `K` component if present. Returns whether one was removed.
    pub fn remove_if_exists<K: Component>(&mut self) -> bool {
        self.try_remove::<K>().is_ok()
    }

    #[must_use]
    pub fn try_get<K: Component>(&self) -> Option<&K> {
        self.components
            .get(&ComponentTypeId::of::<K>())?
            .downcast_ref::<K>()
    }

    #[must_use]
    pub fn try_get_mut<K: Component>(&mut self) -> Option<&mut K> {
        self.components
            .get_mut(&ComponentTypeId::of::<K>())?
            .downcast_mut::<K>()
    }

    /// Returns the attached `K`.
    ///
    /// # Panics
    ///
    /// Panics if no `K` is attached. Guard with [`Entity::has`] or use
    /// [`Entity::try_get`] when absence is expected.
    #[track_caller]
    #[must_use]
    pub fn get<K: Component>(&self) -> &K {
        match self.try_get::<K>() {
            Some(component) => component,
            None => contract_violation(self.missing::<K>()),
        }
    }

    /// Mutable counterpart of [`Entity::get`].
    ///
    /// # Panics
    ///
    /// Panics if no `K` is attached.
    #[track_caller]
    pub fn get_mut<K: Component>(&mut self) -> &mut K {
        let missing = self.missing::<K>();
        match self.try_get_mut::<K>() {
            Some(component) => component,
            None => contract_violation(missing),
        }
    }

    /// Returns the first attached component that is a `K`, exactly or
    /// through a base kind, scanning in kind-id order.
    #[must_use]
    pub fn try_get_or_base<K: Component>(&self) -> Option<&K> {
        self.components().find_map(view_as::<K>)
    }

    /// Like [`Entity::try_get_or_base`], but a contract violation when
    /// nothing matches.
    ///
    /// # Panics
    ///
    /// Panics if no attached component is a `K`.
    #[track_caller]
    #[must_use]
    pub fn get_or_base<K: Component>(&self) -> &K {
        match self.try_get_or_base::<K>() {
            Some(component) => component,
            None => contract_violation(self.missing::<K>()),
        }
    }

    /// Mutable counterpart of [`Entity::get_or_base`].
    ///
    /// # Panics
    ///
    /// Panics if no attached component is a `K`.
    #[track_caller]
    pub fn get_or_base_mut<K: Component>(&mut self) -> &mut K {
        let missing = self.missing::<K>();
        let found = self
            .components
            .values_mut()
            .find_map(|component| view_as_mut::<K>(component.as_mut()));
        match found {
            Some(component) => component,
            None => contract_violation(missing),
        }
    }

    /// Log a warning if no `K` is attached. Returns whether one is.
    pub fn warn_if_missing<K: Component>(&self) -> bool {
        let present = self.has::<K>();
        if !present {
            tracing::warn!(entity = %self.id, component = K::kind_name(), "entity is missing component");
        }
        present
    }

    /// Flag this entity for removal at the next cleanup sweep.
    pub fn mark_for_cleanup(&mut self) {
        self.cleanup = true;
    }

    #[must_use]
    pub fn is_marked_for_cleanup(&self) -> bool {
        self.cleanup
    }

    /// Mutably borrow the components of `N` distinct kinds at once.
    ///
    /// Returns `None` if any kind is missing or named twice.
    pub fn disjoint_mut<const N: usize>(
        &mut self,
        kinds: [ComponentTypeId; N],
    ) -> Option<[&mut (dyn Component + 'static); N]> {
        let mut slots: [Option<&mut (dyn Component + 'static)>; N] = [const { None }; N];
        for (kind, component) in &mut self.components {
            if let Some(index) = kinds.iter().position(|wanted| wanted == kind) {
                slots[index] = Some(component.as_mut());
            }
        }
        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()?
            .try_into()
            .ok()
    }

    /// Returns `true` if every predicate can be given its own component.
    ///
    /// This is the same assignment [`Entity::disjoint_matching_mut`] makes,
    /// so a `true` here means that borrow succeeds.
    #[must_use]
    pub fn has_disjoint_matches(&self, matchers: &[KindMatcher]) -> bool {
        self.match_assignment(matchers).is_some()
    }

    /// Mutably borrow `N` distinct components, each chosen by the matching
    /// predicate at the same position.
    ///
    /// A component that satisfies several predicates is placed wherever the
    /// rest can still be filled. Returns `None` if no such placement exists.
    pub fn disjoint_matching_mut<const N: usize>(
        &mut self,
        matchers: [KindMatcher; N],
    ) -> Option<[&mut (dyn Component + 'static); N]> {
        let picks = self.match_assignment(&matchers)?;
        let mut components: Vec<Option<&mut (dyn Component + 'static)>> = self
            .components
            .values_mut()
            .map(|component| Some(component.as_mut()))
            .collect();
        picks
            .into_iter()
            .map(|index| components.get_mut(index)?.take())
            .collect::<Option<Vec<_>>>()?
            .try_into()
            .ok()
    }

    /// Component positions, in map order, chosen for each predicate.
    fn match_assignment(&self, matchers: &[KindMatcher]) -> Option<Vec<usize>> {
        let components: Vec<&(dyn Component + 'static)> = self.components().collect();
        let mut used = vec![false; components.len()];
        let mut picks = Vec::with_capacity(matchers.len());
        assign_matches(&components, matchers, &mut used, &mut picks).then_some(picks)
    }

    fn missing<K: Component>(&self) -> ComponentError {
        ComponentError::Missing {
            entity: self.id,
            component: K::kind_name(),
        }
    }
}

// Backtracking over at most eight predicates.
fn assign_matches(
    components: &[&(dyn Component + 'static)],
    matchers: &[KindMatcher],
    used: &mut [bool],
    picks: &mut Vec<usize>,
) -> bool {
    let Some(matcher) = matchers.get(picks.len()) else {
        return true;
    };
    for (index, component) in components.iter().enumerate() {
        if used[index] || !matcher(*component) {
            continue;
        }
        used[index] = true;
        picks.push(index);
        if assign_matches(components, matchers, used, picks) {
            return true;
        }
        picks.pop();
        used[index] = false;
    }
    false
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("membership", &self.membership)
            .field("components", &self.components.len())
            .field("cleanup", &self.cleanup)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_component;

    #[derive(Debug, Default, PartialEq)]
    struct Health(i32);
    impl_component!(Health);

    #[derive(Debug, Default, PartialEq)]
    struct Armor(i32);
    impl_component!(Armor);

    #[derive(Debug, Default)]
    struct Collider {
        radius: f32,
    }
    impl_component!(Collider);

    struct Paddle {
        collider: Collider,
    }
    impl_component!(Paddle: Collider => collider);

    fn entity() -> Entity {
        Entity::new(EntityId(0))
    }

    #[test]
    fn test_allocator_produces_increasing_ids() {
        let mut alloc = EntityAllocator::new();
        assert_eq!(alloc.allocate(), EntityId(0));
        assert_eq!(alloc.allocate(), EntityId(1));
        assert_eq!(alloc.allocate(), EntityId(2));
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::from_raw(7).to_string(), "Entity(7)");
        assert_eq!(EntityId(7).raw(), 7);
    }

    #[test]
    fn test_has_after_add_and_remove() {
        let mut e = entity();
        assert!(!e.has::<Health>());
        e.add(Health(10));
        assert!(e.has::<Health>());
        assert!(e.membership().contains(ComponentTypeId::of::<Health>()));
        e.remove::<Health>();
        assert!(!e.has::<Health>());
        assert!(e.membership().is_empty());
        assert_eq!(e.component_count(), 0);
    }

    #[test]
    fn test_add_returns_stored_instance() {
        let mut e = entity();
        e.add(Health(10)).0 -= 3;
        assert_eq!(e.get::<Health>(), &Health(7));
    }

    #[test]
    fn test_duplicate_add_is_rejected_without_mutation() {
        let mut e = entity();
        e.add(Health(10));
        let err = e.try_add(Health(99)).unwrap_err();
        assert!(matches!(err, ComponentError::AlreadyPresent { .. }));
        assert_eq!(e.get::<Health>(), &Health(10));
        assert_eq!(e.component_count(), 1);
    }

    #[test]
    #[should_panic(expected = "already has component")]
    fn test_duplicate_add_panics() {
        let mut e = entity();
        e.add(Health(10));
        e.add(Health(20));
    }

    #[test]
    #[should_panic(expected = "is missing component")]
    fn test_get_missing_panics() {
        let e = entity();
        let _ = e.get::<Health>();
    }

    #[test]
    #[should_panic(expected = "is missing component")]
    fn test_remove_missing_panics() {
        let mut e = entity();
        e.remove::<Armor>();
    }

    #[test]
    fn test_try_variants_report_absence() {
        let mut e = entity();
        assert!(e.try_get::<Health>().is_none());
        assert!(e.try_get_mut::<Health>().is_none());
        assert!(matches!(
            e.try_remove::<Health>(),
            Err(ComponentError::Missing { .. })
        ));
        assert!(!e.remove_if_exists::<Health>());
        e.add(Health(1));
        assert!(e.remove_if_exists::<Health>());
    }

    #[test]
    fn test_add_if_missing_keeps_existing() {
        let mut e = entity();
        e.add_if_missing(Health(5));
        e.add_if_missing(Health(50)).0 += 1;
        assert_eq!(e.get::<Health>(), &Health(6));
    }

    #[test]
    fn test_has_all_and_missing_any() {
        let mut e = entity();
        e.add(Health(1));
        assert!(!e.has_all::<(Health, Armor)>());
        assert!(e.is_missing_any::<(Health, Armor)>());
        assert!(e.is_missing::<Armor>());
        e.add_all::<(Health, Armor)>();
        assert!(e.has_all::<(Health, Armor)>());
        assert_eq!(e.get::<Health>(), &Health(1));
        assert_eq!(e.get::<Armor>(), &Armor(0));
    }

    #[test]
    fn test_base_lookup() {
        let mut e = entity();
        e.add(Paddle {
            collider: Collider { radius: 3.0 },
        });
        assert!(e.has_any_base_of::<Collider>());
        assert!(!e.has::<Collider>());
        assert_eq!(e.get_or_base::<Collider>().radius, 3.0);

        e.get_or_base_mut::<Collider>().radius = 4.0;
        assert_eq!(e.get::<Paddle>().collider.radius, 4.0);
        assert!(e.try_get_or_base::<Health>().is_none());
    }

    #[test]
    fn test_get_or_base_prefers_kind_order() {
        let mut e = entity();
        e.add(Collider { radius: 1.0 });
        e.add(Paddle {
            collider: Collider { radius: 2.0 },
        });
        let first = if ComponentTypeId::of::<Collider>() < ComponentTypeId::of::<Paddle>() {
            1.0
        } else {
            2.0
        };
        assert_eq!(e.get_or_base::<Collider>().radius, first);
    }

    #[test]
    #[should_panic(expected = "is missing component")]
    fn test_get_or_base_without_match_panics() {
        let e = entity();
        let _ = e.get_or_base::<Collider>();
    }

    #[test]
    fn test_warn_if_missing() {
        let mut e = entity();
        assert!(!e.warn_if_missing::<Health>());
        e.add(Health(1));
        assert!(e.warn_if_missing::<Health>());
    }

    #[test]
    fn test_cleanup_flag() {
        let mut e = entity();
        assert!(!e.is_marked_for_cleanup());
        e.mark_for_cleanup();
        assert!(e.is_marked_for_cleanup());
    }

    #[test]
    fn test_disjoint_mut_in_requested_order() {
        let mut e = entity();
        e.add(Health(1));
        e.add(Armor(2));
        let [armor, health] = e
            .disjoint_mut([ComponentTypeId::of::<Armor>(), ComponentTypeId::of::<Health>()])
            .unwrap();
        armor.downcast_mut::<Armor>().unwrap().0 += 10;
        health.downcast_mut::<Health>().unwrap().0 += 20;
        assert_eq!(e.get::<Armor>(), &Armor(12));
        assert_eq!(e.get::<Health>(), &Health(21));
    }

    #[test]
    fn test_disjoint_matching_mut_uses_distinct_components() {
        let mut e = entity();
        e.add(Paddle {
            collider: Collider { radius: 1.0 },
        });
        assert!(e
            .disjoint_matching_mut([is_a::<Collider> as KindMatcher, is_a::<Collider>])
            .is_none());
        e.add(Collider { radius: 2.0 });
        assert!(e
            .disjoint_matching_mut([is_a::<Collider> as KindMatcher, is_a::<Collider>])
            .is_some());
    }

    #[test]
    fn test_disjoint_matching_mut_places_derived_component_where_it_fits() {
        struct Shape {
            sides: u32,
        }
        impl_component!(Shape);

        struct Triangle {
            shape: Shape,
        }
        impl_component!(Triangle: Shape => shape);

        // Triangle sorts first and satisfies both predicates.
        let first = ComponentTypeId::of::<Triangle>();
        assert!(first < ComponentTypeId::of::<Shape>());

        let mut e = entity();
        e.add(Shape { sides: 4 });
        e.add(Triangle {
            shape: Shape { sides: 3 },
        });

        let matchers = [is_a::<Shape> as KindMatcher, is_a::<Triangle>];
        assert!(e.has_disjoint_matches(&matchers));
        let [shape, triangle] = e.disjoint_matching_mut(matchers).unwrap();
        assert_eq!(view_as::<Shape>(shape).unwrap().sides, 4);
        assert_eq!(view_as::<Triangle>(triangle).unwrap().shape.sides, 3);
    }

    #[test]
    fn test_has_disjoint_matches_agrees_with_borrow() {
        let mut e = entity();
        e.add(Paddle {
            collider: Collider { radius: 1.0 },
        });
        let pair = [is_a::<Collider> as KindMatcher, is_a::<Paddle>];
        assert!(!e.has_disjoint_matches(&pair));
        assert!(e.disjoint_matching_mut(pair).is_none());
        assert!(e.has_disjoint_matches(&[]));
    }

    #[test]
    fn test_debug_lists_membership() {
        let mut e = entity();
        e.add(Health(1));
        let rendered = format!("{e:?}");
        assert!(rendered.contains("Entity"));
        assert!(rendered.contains(&ComponentTypeId::of::<Health>().index().to_string()));
    }
}
