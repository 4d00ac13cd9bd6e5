//! Entity identifiers and their allocation.

use std::fmt;

use super::{EcsError, EcsResult};

/// Opaque entity handle.
///
/// An entity carries no data; it is valid only while the [`EntityManager`]
/// that issued it reports it alive. Indices of destroyed entities are
/// recycled under a new generation, so a stale handle never aliases the
/// entity that reuses its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    id: u32,
    generation: u32,
}

impl Entity {
    /// Handle for index `id` in its first generation.
    pub const fn from_raw(id: u32) -> Self {
        Self { id, generation: 0 }
    }

    pub const fn raw(self) -> u32 {
        self.id
    }

    pub const fn generation(self) -> u32 {
        self.generation
    }

    pub(crate) const fn index(self) -> usize {
        self.id as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "Entity({})", self.id)
        } else {
            write!(f, "Entity({}v{})", self.id, self.generation)
        }
    }
}

/// Issues, tracks and recycles entity identifiers.
///
/// The manager knows nothing about components. Purging a destroyed entity's
/// components is the job of the [`Registry`](super::Registry), which owns both.
pub struct EntityManager {
    next_id: u32,
    limit: u32,
    free_list: Vec<u32>,
    alive: Vec<bool>,
    generations: Vec<u32>,
    count: usize,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    /// Manager that hands out at most `limit` distinct identifiers (`0..limit`).
    pub fn with_limit(limit: u32) -> Self {
        Self {
            next_id: 0,
            limit,
            free_list: Vec::new(),
            alive: Vec::new(),
            generations: Vec::new(),
            count: 0,
        }
    }

    /// Returns a handle that is not currently alive.
    ///
    /// Recycled indices are preferred, most recently destroyed first.
    pub fn create(&mut self) -> EcsResult<Entity> {
        let id = if let Some(id) = self.free_list.pop() {
            id
        } else {
            if self.next_id >= self.limit {
                return Err(EcsError::ResourceExhausted { limit: self.limit });
            }
            let id = self.next_id;
            self.next_id += 1;
            self.alive.push(false);
            self.generations.push(0);
            id
        };
        self.alive[id as usize] = true;
        self.count += 1;
        Ok(Entity {
            id,
            generation: self.generations[id as usize],
        })
    }

    /// Marks `entity` dead and makes its identifier available again.
    ///
    /// Destroying an entity that is not alive is an error and changes nothing.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidEntity(entity));
        }
        let idx = entity.index();
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(entity.id);
        self.count -= 1;
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index();
        self.alive.get(idx).copied().unwrap_or(false) && self.generations[idx] == entity.generation
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Live entities in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(idx, _)| Entity {
                id: idx as u32,
                generation: self.generations[idx],
            })
    }

    pub fn clear(&mut self) {
        self.next_id = 0;
        self.free_list.clear();
        self.alive.clear();
        self.generations.clear();
        self.count = 0;
    }
}

impl Default for EntityManager {
    fn default() -> Self {
        Self::new()
    }
}
