//! Core [`Component`] trait and the component registry.
//!
//! Every piece of data attached to an [`Entity`](crate::Entity) implements
//! [`Component`]. The first time a component kind is used it is assigned a
//! small integer [`ComponentTypeId`] from a monotonically increasing counter.
//! That id indexes the entity's membership bitset, so it is bounded by
//! [`MAX_COMPONENTS`]. Ids are never reclaimed and stay stable for the
//! lifetime of the process.
//!
//! ## Base kinds
//!
//! A component can expose *base kinds*: other component types it embeds and
//! is willing to be viewed as. This is how systems and queries match "any
//! component that is a `Transform`" without runtime downcasting between
//! unrelated types. Use [`impl_component!`](crate::impl_component) to declare
//! them.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{LazyLock, Mutex, PoisonError};

use downcast_rs::{Downcast, impl_downcast};

use crate::error::{ComponentError, contract_violation};

/// Maximum number of distinct component kinds a process may register.
pub const MAX_COMPONENTS: usize = 128;

/// The core component trait.
///
/// # Examples
///
/// ```rust
/// use engine_component::{Component, impl_component};
///
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl_component!(Health);
/// ```
pub trait Component: Downcast {
    /// A human-readable name for this component kind.
    fn kind_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// View this component as the base kind identified by `base`.
    ///
    /// Returns `None` when `base` is not one of this component's base kinds.
    /// The exact type is never reported here; it is matched separately.
    fn base_ref(&self, base: TypeId) -> Option<&dyn Any> {
        let _ = base;
        None
    }

    /// Mutable counterpart of [`Component::base_ref`].
    fn base_mut(&mut self, base: TypeId) -> Option<&mut dyn Any> {
        let _ = base;
        None
    }
}

impl_downcast!(Component);

/// Implement [`Component`] for a type, optionally declaring base kinds.
///
/// Each base kind names the field that holds it. Bases of a base are
/// reachable as well.
///
/// ```rust
/// use engine_component::impl_component;
///
/// #[derive(Default)]
/// struct Collider {
///     radius: f32,
/// }
/// impl_component!(Collider);
///
/// struct Bumper {
///     collider: Collider,
///     strength: f32,
/// }
/// impl_component!(Bumper: Collider => collider);
/// ```
#[macro_export]
macro_rules! impl_component {
    ($ty:ty) => {
        impl $crate::Component for $ty {}
    };
    ($ty:ty : $($base:ty => $field:ident),+ $(,)?) => {
        impl $crate::Component for $ty {
            fn base_ref(
                &self,
                base: ::std::any::TypeId,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                $(
                    if base == ::std::any::TypeId::of::<$base>() {
                        return ::std::option::Option::Some(&self.$field);
                    }
                    if let ::std::option::Option::Some(found) =
                        $crate::Component::base_ref(&self.$field, base)
                    {
                        return ::std::option::Option::Some(found);
                    }
                )+
                ::std::option::Option::None
            }

            fn base_mut(
                &mut self,
                base: ::std::any::TypeId,
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                $(
                    if base == ::std::any::TypeId::of::<$base>() {
                        return ::std::option::Option::Some(&mut self.$field);
                    }
                    if let ::std::option::Option::Some(found) =
                        $crate::Component::base_mut(&mut self.$field, base)
                    {
                        return ::std::option::Option::Some(found);
                    }
                )+
                ::std::option::Option::None
            }
        }
    };
}

/// View a stored component as kind `K`, either exactly or through one of its
/// base kinds.
#[must_use]
pub fn view_as<'a, K: Component>(component: &'a (dyn Component + 'static)) -> Option<&'a K> {
    if component.is::<K>() {
        return component.downcast_ref::<K>();
    }
    component.base_ref(TypeId::of::<K>())?.downcast_ref::<K>()
}

/// Mutable counterpart of [`view_as`].
#[must_use]
pub fn view_as_mut<'a, K: Component>(
    component: &'a mut (dyn Component + 'static),
) -> Option<&'a mut K> {
    if component.is::<K>() {
        return component.downcast_mut::<K>();
    }
    component.base_mut(TypeId::of::<K>())?.downcast_mut::<K>()
}

/// Returns `true` if `component` is a `K`, exactly or through a base kind.
#[must_use]
pub fn is_a<K: Component>(component: &(dyn Component + 'static)) -> bool {
    view_as::<K>(component).is_some()
}

/// A small, stable identifier for a component kind. Doubles as the bit index
/// in an entity's membership bitset.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentTypeId(usize);

impl ComponentTypeId {
    /// Returns the id registered for `T`, registering it on first use.
    ///
    /// # Panics
    ///
    /// Panics if registering `T` would exceed [`MAX_COMPONENTS`].
    #[must_use]
    pub fn of<T: Component>() -> Self {
        component_id::<T>()
    }

    /// Returns the raw bit index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentTypeId({})", self.0)
    }
}

/// Assigns [`ComponentTypeId`]s to component kinds.
///
/// The process-wide instance behind [`component_id`] is what entities use;
/// standalone registries exist for inspection and tests.
#[derive(Debug)]
pub struct ComponentRegistry {
    capacity: usize,
    ids: HashMap<TypeId, ComponentTypeId>,
    names: Vec<&'static str>,
}

impl ComponentRegistry {
    /// Create an empty registry with the full [`MAX_COMPONENTS`] capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_COMPONENTS)
    }

    /// Create an empty registry that accepts at most `capacity` kinds.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` exceeds [`MAX_COMPONENTS`], since ids past that
    /// bound cannot be represented in a membership bitset.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(
            capacity <= MAX_COMPONENTS,
            "registry capacity {capacity} exceeds MAX_COMPONENTS ({MAX_COMPONENTS})"
        );
        Self {
            capacity,
            ids: HashMap::new(),
            names: Vec::new(),
        }
    }

    /// Return the id for `T`, assigning the next free one on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::CapacityExceeded`] when `T` is new and every
    /// slot is already taken. The registry is left unchanged.
    pub fn register<T: Component>(&mut self) -> Result<ComponentTypeId, ComponentError> {
        if let Some(&id) = self.ids.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
        if self.names.len() >= self.capacity {
            return Err(ComponentError::CapacityExceeded {
                capacity: self.capacity,
                component: T::kind_name(),
            });
        }
        let id = ComponentTypeId(self.names.len());
        self.ids.insert(TypeId::of::<T>(), id);
        self.names.push(T::kind_name());
        tracing::trace!(component = T::kind_name(), id = id.0, "registered component kind");
        Ok(id)
    }

    /// Returns the id of `T` if it has been registered.
    #[must_use]
    pub fn get<T: Component>(&self) -> Option<ComponentTypeId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the name recorded for `id`.
    #[must_use]
    pub fn name(&self, id: ComponentTypeId) -> Option<&'static str> {
        self.names.get(id.0).copied()
    }

    /// Number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Maximum number of kinds this registry accepts.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: LazyLock<Mutex<ComponentRegistry>> =
    LazyLock::new(|| Mutex::new(ComponentRegistry::new()));

/// Returns the process-wide id for `T`, registering it on first use.
///
/// # Panics
///
/// Panics when the process runs out of component slots. The registry is not
/// modified in that case, so existing bitsets stay valid.
#[must_use]
pub fn component_id<T: Component>() -> ComponentTypeId {
    register_or_abort::<T>(&REGISTRY)
}

#[track_caller]
fn register_or_abort<T: Component>(registry: &Mutex<ComponentRegistry>) -> ComponentTypeId {
    let result = registry
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register::<T>();
    match result {
        Ok(id) => id,
        Err(err) => contract_violation(err),
    }
}

/// Returns the name of a component kind registered in the process-wide
/// registry.
#[must_use]
pub fn component_name(id: ComponentTypeId) -> Option<&'static str> {
    REGISTRY
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .name(id)
}
