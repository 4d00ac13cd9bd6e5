//! Entity Component System (ECS) core
//!
//! Sparse-set component storages keyed by entity, one per component type,
//! behind a [`Registry`] façade that also owns entity allocation.

pub mod component;
pub mod entity;
pub mod error;
pub mod query;
pub mod registry;

pub use component::{AnyStorage, Component, ComponentStorage};
pub use entity::{Entity, EntityManager};
pub use error::{EcsError, EcsResult};
pub use query::{ComponentBundle, ComponentSet};
pub use registry::{Registry, RegistryConfig};
