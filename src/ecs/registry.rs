//! Registry - the single owner of entities and component storages.
//!
//! There is exactly one registry per simulation. It is constructed by the
//! caller and handed by `&mut` to the engine and each system in turn.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use tracing::{debug, trace};

use super::component::AnyStorage;
use super::query::{ComponentBundle, ComponentSet};
use super::{Component, ComponentStorage, EcsError, EcsResult, Entity, EntityManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Upper bound on simultaneously issued entity identifiers.
    pub max_entities: u32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_entities: u32::MAX,
        }
    }
}

pub struct Registry {
    entities: EntityManager,
    storages: HashMap<TypeId, Box<dyn AnyStorage>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            entities: EntityManager::with_limit(config.max_entities),
            storages: HashMap::new(),
        }
    }

    /// Create a new entity with no components.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        match self.entities.create() {
            Ok(entity) => {
                debug!(%entity, "entity created");
                Ok(entity)
            }
            Err(err) => {
                debug!(%err, "entity creation refused");
                Err(err)
            }
        }
    }

    /// Destroy an entity and purge it from every component storage.
    ///
    /// The identifier only becomes reusable once this returns, by which time
    /// no storage holds data for it.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.destroy(entity)?;
        let purged = self
            .storages
            .values_mut()
            .map(|storage| storage.remove_entity(entity))
            .filter(|removed| *removed)
            .count();
        debug_assert!(self.storages.values().all(|storage| !storage.has(entity)));
        debug!(%entity, purged, "entity destroyed");
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Live entities in ascending identifier order.
    pub fn entities(&self) -> Vec<Entity> {
        self.entities.iter().collect()
    }

    fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Attach a default `T` to `entity`, resetting it if already present.
    pub fn create_component<T: Component + Default>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.ensure_alive(entity)?;
        trace!(%entity, component = type_name::<T>(), "component created");
        Ok(self.storage_or_insert::<T>().create(entity))
    }

    /// Attach `value` to `entity`, replacing any existing `T`.
    pub fn insert_component<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<&mut T> {
        self.ensure_alive(entity)?;
        trace!(%entity, component = type_name::<T>(), "component attached");
        Ok(self.storage_or_insert::<T>().insert(entity, value))
    }

    /// Attach a default value of every type in the bundle, e.g.
    /// `registry.create_components::<(Transform, Collider)>(entity)`.
    pub fn create_components<B: ComponentBundle>(&mut self, entity: Entity) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        B::create_all(self, entity)
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.ensure_alive(entity)?;
        match self.storage::<T>() {
            Some(storage) => storage.get(entity),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.ensure_alive(entity)?;
        match self.storage_mut::<T>() {
            Some(storage) => storage.get_mut(entity),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    /// Detach `entity`'s `T` and hand it back.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> EcsResult<T> {
        self.ensure_alive(entity)?;
        let value = match self.storage_mut::<T>() {
            Some(storage) => storage.remove(entity)?,
            None => return Err(EcsError::missing::<T>(entity)),
        };
        trace!(%entity, component = type_name::<T>(), "component removed");
        Ok(value)
    }

    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.storage::<T>()
            .map(|storage| storage.has(entity))
            .unwrap_or(false)
    }

    /// Snapshot of the entities holding `T`, in insertion order. Empty when no
    /// entity ever held a `T`.
    pub fn entity_container<T: Component>(&self) -> Vec<Entity> {
        self.storage::<T>()
            .map(|storage| storage.entity_snapshot())
            .unwrap_or_default()
    }

    /// Entities holding every component in `S`, ordered by the first type's
    /// insertion order: `registry.collect_linked::<(Collider, Transform)>()`.
    pub fn collect_linked<S: ComponentSet>(&self) -> Vec<Entity> {
        let linked = S::collect_linked(self);
        trace!(components = ?S::type_names(), matched = linked.len(), "linked query");
        linked
    }

    pub fn count_linked<S: ComponentSet>(&self) -> usize {
        S::count_linked(self)
    }

    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentStorage<T>>()
    }

    pub(crate) fn storage_mut<T: Component>(&mut self) -> Option<&mut ComponentStorage<T>> {
        self.storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
    }

    fn storage_or_insert<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .expect("storage is keyed by its own TypeId")
    }

    /// Names of every component type that has a storage, sorted.
    pub fn registered_types(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .storages
            .values()
            .map(|storage| storage.component_name())
            .collect();
        names.sort_unstable();
        names
    }

    /// Drop every entity and component. Storages stay registered.
    pub fn clear(&mut self) {
        for storage in self.storages.values_mut() {
            storage.clear();
        }
        self.entities.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
