//! Fluent entity queries.
//!
//! An [`EntityQuery`] snapshots references to the entities of a store (or a
//! caller-supplied subset) and narrows them with an ordered list of
//! modifications:
//!
//! - filters, each a [`Predicate`] tested against one entity at a time;
//! - limits (`take`, `first_only`), which keep at most `n` of the entities
//!   that survived every earlier modification.
//!
//! After all modifications, the survivors are sorted by the single optional
//! ordering comparator. Sorting is stable, so ties keep store order.
//!
//! Results are computed on demand. [`EntityQuery::all`] and the accessors
//! built on it cache the result inside the query instance; builder calls
//! discard that cache. A query borrows the store immutably, so the store
//! cannot change underneath a live query.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;

use engine_math::{Rect, Vec2, distance_sq};

use crate::component::{Component, ComponentTypeId};
use crate::entity::{Entity, EntityId};
use crate::store::EntityStore;

/// A component with a point position, usable by [`EntityQuery::where_in_range`].
pub trait Positioned: Component {
    fn position(&self) -> Vec2;
}

/// A component with an axis-aligned footprint, usable by
/// [`EntityQuery::where_overlaps`].
pub trait Bounded: Component {
    fn bounds(&self) -> Rect;
}

/// A single-entity test used as a query filter.
pub enum Predicate<'a> {
    /// Entity has exactly this id.
    Id(EntityId),
    /// Entity carries this component kind.
    HasComponent(ComponentTypeId),
    /// Entity is flagged for the next cleanup sweep.
    MarkedForCleanup,
    /// Inverts the wrapped predicate.
    Not(Box<Predicate<'a>>),
    /// Caller-supplied test.
    Lambda(Box<dyn Fn(&Entity) -> bool + 'a>),
    /// Squared distance from `center` is strictly below `range_sq`.
    InRange {
        center: Vec2,
        range_sq: f32,
        position: fn(&Entity) -> Option<Vec2>,
    },
    /// Footprint overlaps `rect` with positive area.
    Overlaps {
        rect: Rect,
        bounds: fn(&Entity) -> Option<Rect>,
    },
}

impl<'a> Predicate<'a> {
    #[must_use]
    pub fn has<K: Component>() -> Self {
        Self::HasComponent(ComponentTypeId::of::<K>())
    }

    #[must_use]
    pub fn missing<K: Component>() -> Self {
        Self::has::<K>().not()
    }

    #[must_use]
    pub fn lambda(test: impl Fn(&Entity) -> bool + 'a) -> Self {
        Self::Lambda(Box::new(test))
    }

    /// Entities whose `T` position lies strictly within `range` of `center`.
    /// Entities without a `T` never match.
    #[must_use]
    pub fn in_range<T: Positioned>(center: Vec2, range: f32) -> Self {
        Self::InRange {
            center,
            range_sq: range * range,
            position: position_of::<T>,
        }
    }

    /// Entities whose `T` bounds overlap `rect`. Shared edges do not count.
    #[must_use]
    pub fn overlaps<T: Bounded>(rect: Rect) -> Self {
        Self::Overlaps {
            rect,
            bounds: bounds_of::<T>,
        }
    }

    /// Wrap this predicate in a negation.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Returns whether `entity` satisfies the predicate.
    #[must_use]
    pub fn test(&self, entity: &Entity) -> bool {
        match self {
            Self::Id(id) => entity.id() == *id,
            Self::HasComponent(kind) => entity.membership().contains(*kind),
            Self::MarkedForCleanup => entity.is_marked_for_cleanup(),
            Self::Not(inner) => !inner.test(entity),
            Self::Lambda(test) => test(entity),
            Self::InRange {
                center,
                range_sq,
                position,
            } => position(entity).is_some_and(|at| distance_sq(at, *center) < *range_sq),
            Self::Overlaps { rect, bounds } => bounds(entity).is_some_and(|other| rect.overlaps(&other)),
        }
    }
}

impl fmt::Debug for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::HasComponent(kind) => f.debug_tuple("HasComponent").field(kind).finish(),
            Self::MarkedForCleanup => f.write_str("MarkedForCleanup"),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Self::Lambda(_) => f.write_str("Lambda"),
            Self::InRange { center, range_sq, .. } => f
                .debug_struct("InRange")
                .field("center", center)
                .field("range_sq", range_sq)
                .finish(),
            Self::Overlaps { rect, .. } => f.debug_struct("Overlaps").field("rect", rect).finish(),
        }
    }
}

fn position_of<T: Positioned>(entity: &Entity) -> Option<Vec2> {
    entity.try_get::<T>().map(Positioned::position)
}

fn bounds_of<T: Bounded>(entity: &Entity) -> Option<Rect> {
    entity.try_get::<T>().map(Bounded::bounds)
}

#[derive(Debug)]
enum Modification<'a> {
    Filter(Predicate<'a>),
    Limit(usize),
}

type Comparator<'a> = Box<dyn Fn(&Entity, &Entity) -> Ordering + 'a>;

/// A composable filter/limit/order pipeline over entity references.
///
/// # Examples
///
/// ```rust
/// use engine_component::{EntityQuery, EntityStore, impl_component};
///
/// struct Ball;
/// impl_component!(Ball);
///
/// let mut store = EntityStore::new();
/// store.create().add(Ball);
/// store.create();
///
/// let balls = EntityQuery::new(&store).where_has_component::<Ball>();
/// assert_eq!(balls.count(), 1);
/// ```
pub struct EntityQuery<'a> {
    entities: Vec<&'a Entity>,
    mods: Vec<Modification<'a>>,
    order_by: Option<Comparator<'a>>,
    cache: RefCell<Option<Vec<&'a Entity>>>,
}

impl<'a> EntityQuery<'a> {
    /// Query over every visible entity of `store`.
    #[must_use]
    pub fn new(store: &'a EntityStore) -> Self {
        Self::from_entities(store.iter())
    }

    /// Query over an explicit subset of entities.
    #[must_use]
    pub fn from_entities(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
            mods: Vec::new(),
            order_by: None,
            cache: RefCell::new(None),
        }
    }

    /// Add an arbitrary predicate as a filter.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate<'a>) -> Self {
        self.mods.push(Modification::Filter(predicate));
        self.invalidate();
        self
    }

    #[must_use]
    pub fn where_id(self, id: EntityId) -> Self {
        self.filter(Predicate::Id(id))
    }

    #[must_use]
    pub fn where_not_id(self, id: EntityId) -> Self {
        self.filter(Predicate::Id(id).not())
    }

    #[must_use]
    pub fn where_marked_for_cleanup(self) -> Self {
        self.filter(Predicate::MarkedForCleanup)
    }

    #[must_use]
    pub fn where_not_marked_for_cleanup(self) -> Self {
        self.filter(Predicate::MarkedForCleanup.not())
    }

    #[must_use]
    pub fn where_has_component<K: Component>(self) -> Self {
        self.filter(Predicate::has::<K>())
    }

    #[must_use]
    pub fn where_missing_component<K: Component>(self) -> Self {
        self.filter(Predicate::missing::<K>())
    }

    #[must_use]
    pub fn where_lambda(self, test: impl Fn(&Entity) -> bool + 'a) -> Self {
        self.filter(Predicate::lambda(test))
    }

    /// Add `test` as a filter if one is given; otherwise leave the query
    /// unchanged.
    #[must_use]
    pub fn where_lambda_if<F>(self, test: Option<F>) -> Self
    where
        F: Fn(&Entity) -> bool + 'a,
    {
        match test {
            Some(test) => self.where_lambda(test),
            None => self,
        }
    }

    /// Keep entities whose `T` position is strictly closer than `range` to
    /// `point`. The comparison is done on squared distances.
    #[must_use]
    pub fn where_in_range<T: Positioned>(self, point: Vec2, range: f32) -> Self {
        self.filter(Predicate::in_range::<T>(point, range))
    }

    /// Keep entities whose `T` bounds overlap `rect`. Rectangles that only
    /// share an edge do not overlap.
    #[must_use]
    pub fn where_overlaps<T: Bounded>(self, rect: Rect) -> Self {
        self.filter(Predicate::overlaps::<T>(rect))
    }

    /// Keep entities that fail `predicate`.
    #[must_use]
    pub fn where_not(self, predicate: Predicate<'a>) -> Self {
        self.filter(predicate.not())
    }

    /// Keep at most `n` of the entities that survived the modifications
    /// added before this one.
    #[must_use]
    pub fn take(mut self, n: usize) -> Self {
        self.mods.push(Modification::Limit(n));
        self.invalidate();
        self
    }

    #[must_use]
    pub fn first_only(self) -> Self {
        self.take(1)
    }

    /// Sort results with `compare`. Only one comparator is supported; a
    /// second call is reported and ignored.
    #[must_use]
    pub fn order_by(mut self, compare: impl Fn(&Entity, &Entity) -> Ordering + 'a) -> Self {
        if self.order_by.is_some() {
            tracing::warn!("query already has an ordering; ignoring additional order_by");
            return self;
        }
        self.order_by = Some(Box::new(compare));
        self.invalidate();
        self
    }

    /// Returns `true` if at least one entity matches.
    #[must_use]
    pub fn has_results(&self) -> bool {
        self.first_or_none().is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.has_results()
    }

    /// Returns the first match.
    ///
    /// # Panics
    ///
    /// Panics if nothing matches. Use [`EntityQuery::first_or_none`] when
    /// absence is expected.
    #[track_caller]
    #[must_use]
    pub fn first(&self) -> &'a Entity {
        match self.first_or_none() {
            Some(entity) => entity,
            None => {
                tracing::error!(query = ?self, "first() called on a query with no results");
                panic!("first() called on a query with no results");
            }
        }
    }

    #[must_use]
    pub fn first_or_none(&self) -> Option<&'a Entity> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return cached.first().copied();
        }
        if self.order_by.is_some() {
            return self.all().first().copied();
        }
        self.find_first()
    }

    #[must_use]
    pub fn first_id(&self) -> Option<EntityId> {
        self.first_or_none().map(Entity::id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.all().len()
    }

    #[must_use]
    pub fn all_ids(&self) -> Vec<EntityId> {
        self.all().into_iter().map(Entity::id).collect()
    }

    /// Returns every match, reusing the result of an earlier call on this
    /// query if there was one.
    #[must_use]
    pub fn all(&self) -> Vec<&'a Entity> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return cached.clone();
        }
        self.values_ignore_cache()
    }

    /// Re-run the query even if a cached result exists, and cache the new
    /// result.
    #[must_use]
    pub fn values_ignore_cache(&self) -> Vec<&'a Entity> {
        let results = self.run();
        *self.cache.borrow_mut() = Some(results.clone());
        results
    }

    fn run(&self) -> Vec<&'a Entity> {
        let mut results = self.entities.clone();
        for modification in &self.mods {
            match modification {
                Modification::Filter(predicate) => results.retain(|entity| predicate.test(entity)),
                Modification::Limit(n) => results.truncate(*n),
            }
        }
        if results.len() > 1 {
            if let Some(compare) = &self.order_by {
                results.sort_by(|a, b| compare(a, b));
            }
        }
        tracing::trace!(
            candidates = self.entities.len(),
            matched = results.len(),
            "ran entity query"
        );
        results
    }

    /// Walk the candidates one at a time and stop at the first entity that
    /// passes every modification. Each limit keeps its own count of the
    /// entities that reached it.
    fn find_first(&self) -> Option<&'a Entity> {
        let mut reached = vec![0usize; self.mods.len()];
        self.entities.iter().copied().find(|entity| {
            self.mods.iter().enumerate().all(|(index, modification)| match modification {
                Modification::Filter(predicate) => predicate.test(entity),
                Modification::Limit(n) => {
                    reached[index] += 1;
                    reached[index] <= *n
                }
            })
        })
    }

    fn invalidate(&mut self) {
        self.cache.get_mut().take();
    }
}

impl fmt::Debug for EntityQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityQuery")
            .field("candidates", &self.entities.len())
            .field("mods", &self.mods)
            .field("ordered", &self.order_by.is_some())
            .finish()
    }
}
