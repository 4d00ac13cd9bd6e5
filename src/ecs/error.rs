//! Errors reported by the entity manager, component storages and registry.

use thiserror::Error;

use super::Entity;

/// Result alias used throughout the ECS core.
pub type EcsResult<T> = Result<T, EcsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    /// The entity is not currently alive (never created, or already destroyed).
    #[error("{0} is not alive")]
    InvalidEntity(Entity),

    /// The entity does not hold a component of the requested type.
    #[error("{entity} has no `{component}` component")]
    ComponentNotFound {
        entity: Entity,
        component: &'static str,
    },

    /// No identifier is left to hand out.
    #[error("entity limit reached ({limit} identifiers in use)")]
    ResourceExhausted { limit: u32 },
}

impl EcsError {
    pub(crate) fn missing<T: 'static>(entity: Entity) -> Self {
        EcsError::ComponentNotFound {
            entity,
            component: std::any::type_name::<T>(),
        }
    }
}
