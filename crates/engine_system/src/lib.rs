//! # engine_system
//!
//! The "S" of the framework: behaviour units and the frame scheduler.
//!
//! This crate provides:
//!
//! - [`System`] / [`RenderSystem`] — typed systems with a component
//!   signature, a per-frame `once` hook and a per-entity hook.
//! - [`SystemManager`] — runs update systems, sweeps cleanup-flagged
//!   entities, then runs render systems, once per frame.
//! - [`SystemContext`] / [`RenderContext`] — what a system sees each call.
//! - [`EnforceSingleton`] and [`Plugin`] — development checks and bundles of
//!   systems.
//!
//! ## Usage
//!
//! ```rust
//! use engine_component::{EntityId, EntityStore, impl_component};
//! use engine_system::{System, SystemContext, SystemManager};
//!
//! struct Lifetime(f32);
//! impl_component!(Lifetime);
//!
//! struct Age;
//!
//! impl System for Age {
//!     type Signature = (Lifetime,);
//!
//!     fn for_each_with(
//!         &mut self,
//!         entity: EntityId,
//!         (lifetime,): (&mut Lifetime,),
//!         ctx: &mut SystemContext<'_>,
//!     ) {
//!         lifetime.0 -= ctx.dt;
//!         if lifetime.0 <= 0.0 {
//!             ctx.store.mark_for_cleanup(entity);
//!         }
//!     }
//! }
//!
//! let mut store = EntityStore::new();
//! store.create().add(Lifetime(0.5));
//!
//! let mut systems = SystemManager::new();
//! systems.register_update_system(Age);
//! systems.run(&mut store, 1.0);
//! assert!(store.is_empty());
//! ```

pub mod context;
pub mod developer;
pub mod manager;
pub mod system;

pub use context::{RenderContext, SystemContext};
pub use developer::{EnforceSingleton, Plugin};
pub use manager::SystemManager;
pub use system::{RenderRunner, RenderSystem, System, UpdateRunner, short_type_name};
