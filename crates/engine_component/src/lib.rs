//! # engine_component
//!
//! The "E" and "C" of the framework: what a component is, how entities own
//! them, where entities live and how to find them again.
//!
//! This crate provides:
//!
//! - [`Component`] trait and [`impl_component!`] — the contract all
//!   attachable data satisfies, including optional base kinds.
//! - [`ComponentRegistry`] / [`component_id`] — stable small integer ids per
//!   component kind, bounded by [`MAX_COMPONENTS`].
//! - [`Entity`] — an id, a membership bitset and the owned components.
//! - [`EntityStore`] — creation, cleanup flagging, sweeping and lending.
//! - [`EntityQuery`] — filter/limit/order pipelines over the store.
//! - [`ComponentSet`] — tuples of component kinds fetched together.
//!
//! Everything here is single-threaded. An [`EntityStore`] is neither `Send`
//! nor `Sync`.

pub mod bitset;
pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod set;
pub mod store;

pub use bitset::ComponentBitSet;
pub use component::{
    Component, ComponentRegistry, ComponentTypeId, MAX_COMPONENTS, component_id, component_name,
    is_a, view_as, view_as_mut,
};
pub use entity::{Entity, EntityAllocator, EntityId, KindMatcher};
pub use error::ComponentError;
pub use query::{Bounded, EntityQuery, Positioned, Predicate};
pub use set::{ComponentSet, DefaultComponents};
pub use store::{CreationOptions, EntityStore, ForEachFlow};
