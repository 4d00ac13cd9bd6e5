//! Per-type component storage.
//!
//! Each component type gets its own [`ComponentStorage`]: a sparse index from
//! entity id to a dense slot, plus dense entity and value arrays kept in
//! insertion order. Removal shifts the tail down instead of swap-removing, so
//! the order callers observe never changes except by the removal itself.
//!
//! Outside the crate a storage is read-only; every write goes through the
//! [`Registry`](super::Registry), which checks liveness first.

use std::any::{type_name, Any};

use super::{EcsError, EcsResult, Entity};

/// Marker for types that can be attached to entities.
pub trait Component: 'static {}

/// Type-erased view of a storage, used by the registry for operations that
/// do not need the concrete component type.
pub trait AnyStorage {
    /// Drops `entity`'s component if present. Returns whether one was removed.
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn has(&self, entity: Entity) -> bool;
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn component_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

const VACANT: u32 = u32::MAX;

pub struct ComponentStorage<T: Component> {
    sparse: Vec<u32>,
    entities: Vec<Entity>,
    data: Vec<T>,
}

impl<T: Component> ComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Dense slot holding `entity`'s index, whichever generation owns it.
    fn index_slot(&self, entity: Entity) -> Option<usize> {
        match self.sparse.get(entity.index()) {
            Some(&slot) if slot != VACANT => Some(slot as usize),
            _ => None,
        }
    }

    fn slot(&self, entity: Entity) -> Option<usize> {
        self.index_slot(entity)
            .filter(|&slot| self.entities[slot] == entity)
    }

    fn remove_slot(&mut self, slot: usize) -> T {
        let entity = self.entities.remove(slot);
        self.sparse[entity.index()] = VACANT;
        let value = self.data.remove(slot);
        for moved in &self.entities[slot..] {
            self.sparse[moved.index()] -= 1;
        }
        value
    }

    /// Attaches `value` to `entity`, replacing any existing value in place.
    ///
    /// A replaced entity keeps its original position in [`Self::entities`].
    /// An older generation left on the same index is dropped first.
    pub(crate) fn insert(&mut self, entity: Entity, value: T) -> &mut T {
        if let Some(slot) = self.index_slot(entity) {
            if self.entities[slot] == entity {
                self.data[slot] = value;
                return &mut self.data[slot];
            }
            self.remove_slot(slot);
        }
        let idx = entity.index();
        if idx >= self.sparse.len() {
            self.sparse.resize(idx + 1, VACANT);
        }
        self.sparse[idx] = self.entities.len() as u32;
        self.entities.push(entity);
        self.data.push(value);
        let last = self.data.len() - 1;
        &mut self.data[last]
    }

    /// Attaches a default value; re-creating resets the existing value.
    pub(crate) fn create(&mut self, entity: Entity) -> &mut T
    where
        T: Default,
    {
        self.insert(entity, T::default())
    }

    pub fn get(&self, entity: Entity) -> EcsResult<&T> {
        match self.slot(entity) {
            Some(slot) => Ok(&self.data[slot]),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    pub(crate) fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut T> {
        match self.slot(entity) {
            Some(slot) => Ok(&mut self.data[slot]),
            None => Err(EcsError::missing::<T>(entity)),
        }
    }

    /// Detaches and returns `entity`'s value.
    pub(crate) fn remove(&mut self, entity: Entity) -> EcsResult<T> {
        let slot = self
            .slot(entity)
            .ok_or_else(|| EcsError::missing::<T>(entity))?;
        Ok(self.remove_slot(slot))
    }

    pub fn has(&self, entity: Entity) -> bool {
        self.slot(entity).is_some()
    }

    /// Entities holding this component, in insertion order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Owned copy of [`Self::entities`], safe to iterate while mutating.
    pub fn entity_snapshot(&self) -> Vec<Entity> {
        self.entities.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.sparse.clear();
        self.entities.clear();
        self.data.clear();
    }
}

impl<T: Component> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> AnyStorage for ComponentStorage<T> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_ok()
    }

    fn has(&self, entity: Entity) -> bool {
        ComponentStorage::has(self, entity)
    }

    fn clear(&mut self) {
        ComponentStorage::clear(self);
    }

    fn len(&self) -> usize {
        ComponentStorage::len(self)
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
