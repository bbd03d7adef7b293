//! Component contract errors.

use crate::entity::EntityId;

/// Programmer-contract violations detected by the checked component
/// operations.
///
/// The unchecked variants ([`Entity::add`](crate::Entity::add),
/// [`Entity::get`](crate::Entity::get), ...) log these and panic; the
/// `try_*` variants hand them back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComponentError {
    /// The component kind is already attached to the entity.
    #[error("entity {entity} already has component {component}")]
    AlreadyPresent {
        entity: EntityId,
        component: &'static str,
    },

    /// The component kind is not attached to the entity.
    #[error("entity {entity} is missing component {component}")]
    Missing {
        entity: EntityId,
        component: &'static str,
    },

    /// Registering another component kind would exceed the bitset capacity.
    #[error("cannot register component {component}: all {capacity} component slots are in use")]
    CapacityExceeded {
        capacity: usize,
        component: &'static str,
    },
}

/// Report a contract violation and abort the current operation.
#[track_caller]
pub(crate) fn contract_violation(err: ComponentError) -> ! {
    tracing::error!(%err, "component contract violated");
    panic!("{err}");
}
