//! Entity Component System (ECS)
//!
//! Slot-based entity registry with typed, sparse-set component storage.
//! Features:
//! - Stable entity IDs with generation counters
//! - Per-entity transform (position, rotation), name and category
//! - Dense component arrays indexed through a sparse slot table
//! - Capability traits for components that follow their entity's transform

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Entity identifier with generation counter for stable IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    /// Entity index
    index: u32,
    /// Generation counter to detect stale references
    generation: u32,
}

impl Entity {
    /// Create a new entity with the given index and generation
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Get the entity index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get the entity generation
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Create a null entity (invalid reference)
    pub fn null() -> Self {
        Self {
            index: u32::MAX,
            generation: 0,
        }
    }

    /// Check if this is a null entity
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index, self.generation)
        }
    }
}

/// Gameplay category of an entity, used to bucket entities into per-category
/// spatial indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EntityCategory {
    Player,
    Enemy,
    Npc,
    Projectile,
    #[default]
    Obstacle,
    Vehicle,
    Trigger,
    Environment,
    Pickup,
    Door,
    Checkpoint,
    Camera,
    UiElement,
}

/// Component that tracks its owning entity's position.
pub trait Positionable {
    /// Called whenever the owning entity moves.
    fn set_entity_position(&mut self, position: Vec2);
}

/// Component that tracks its owning entity's rotation (degrees).
pub trait Rotatable {
    /// Called whenever the owning entity rotates.
    fn set_entity_rotation(&mut self, angle: f32);
}

/// Internal entity metadata
#[derive(Debug)]
struct EntityMeta {
    generation: u32,
    alive: bool,
    name: String,
    position: Vec2,
    rotation: f32,
    category: EntityCategory,
}

/// Registry of all entities and their transforms
#[derive(Debug, Default)]
pub struct World {
    /// Entity metadata indexed by entity index
    entities: Vec<EntityMeta>,
    /// Free entity indices for recycling
    free_indices: Vec<u32>,
    alive_count: usize,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new named entity at the origin
    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        let name = name.into();
        let (index, generation) = if let Some(index) = self.free_indices.pop() {
            let meta = &mut self.entities[index as usize];
            meta.generation = meta.generation.wrapping_add(1);
            meta.alive = true;
            meta.name = name;
            meta.position = Vec2::ZERO;
            meta.rotation = 0.0;
            meta.category = EntityCategory::default();
            (index, meta.generation)
        } else {
            let index = self.entities.len() as u32;
            self.entities.push(EntityMeta {
                generation: 0,
                alive: true,
                name,
                position: Vec2::ZERO,
                rotation: 0.0,
                category: EntityCategory::default(),
            });
            (index, 0)
        };

        self.alive_count += 1;
        Entity::new(index, generation)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> bool {
        let Some(meta) = self.meta_mut(entity) else {
            return false;
        };
        meta.alive = false;
        meta.name.clear();

        self.free_indices.push(entity.index());
        self.alive_count -= 1;
        true
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.meta(entity).is_some()
    }

    /// Get the number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive_count
    }

    /// Iterate over alive entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, meta)| meta.alive)
            .map(|(index, meta)| Entity::new(index as u32, meta.generation))
    }

    /// Find the first alive entity with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Entity> {
        self.iter()
            .find(|&entity| self.name(entity) == Some(name))
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.meta(entity).map(|meta| meta.name.as_str())
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.meta(entity).map(|meta| meta.position)
    }

    /// Move an entity. Returns `false` for dead handles.
    pub fn set_position(&mut self, entity: Entity, position: Vec2) -> bool {
        match self.meta_mut(entity) {
            Some(meta) => {
                meta.position = position;
                true
            }
            None => false,
        }
    }

    /// Rotation in degrees
    pub fn rotation(&self, entity: Entity) -> Option<f32> {
        self.meta(entity).map(|meta| meta.rotation)
    }

    pub fn set_rotation(&mut self, entity: Entity, angle: f32) -> bool {
        match self.meta_mut(entity) {
            Some(meta) => {
                meta.rotation = angle;
                true
            }
            None => false,
        }
    }

    pub fn category(&self, entity: Entity) -> Option<EntityCategory> {
        self.meta(entity).map(|meta| meta.category)
    }

    pub fn set_category(&mut self, entity: Entity, category: EntityCategory) -> bool {
        match self.meta_mut(entity) {
            Some(meta) => {
                meta.category = category;
                true
            }
            None => false,
        }
    }

    fn meta(&self, entity: Entity) -> Option<&EntityMeta> {
        self.entities
            .get(entity.index() as usize)
            .filter(|meta| meta.alive && meta.generation == entity.generation())
    }

    fn meta_mut(&mut self, entity: Entity) -> Option<&mut EntityMeta> {
        self.entities
            .get_mut(entity.index() as usize)
            .filter(|meta| meta.alive && meta.generation == entity.generation())
    }
}

/// Typed component storage using a sparse set.
///
/// Values live densely in insertion order (disturbed only by swap-removal);
/// the sparse table maps an entity index to its dense slot. Lookups compare
/// the full handle, so a recycled index never resolves to the previous
/// occupant's component.
#[derive(Debug)]
pub struct ComponentStorage<T> {
    dense: Vec<T>,
    owners: Vec<Entity>,
    sparse: Vec<Option<u32>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            owners: Vec::new(),
            sparse: Vec::new(),
        }
    }

    /// Attach a component, returning the value it replaced (if any).
    pub fn insert(&mut self, entity: Entity, value: T) -> Option<T> {
        if entity.is_null() {
            return Some(value);
        }

        let slot = entity.index() as usize;
        if let Some(Some(dense)) = self.sparse.get(slot).copied() {
            let dense = dense as usize;
            self.owners[dense] = entity;
            return Some(std::mem::replace(&mut self.dense[dense], value));
        }

        if self.sparse.len() <= slot {
            self.sparse.resize(slot + 1, None);
        }
        self.sparse[slot] = Some(self.dense.len() as u32);
        self.dense.push(value);
        self.owners.push(entity);
        None
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.dense_index(entity).map(|index| &self.dense[index])
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.dense_index(entity).map(|index| &mut self.dense[index])
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Detach a component
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        let index = self.dense_index(entity)?;
        self.sparse[entity.index() as usize] = None;

        let value = self.dense.swap_remove(index);
        self.owners.swap_remove(index);
        if let Some(moved) = self.owners.get(index) {
            self.sparse[moved.index() as usize] = Some(index as u32);
        }
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.owners.clear();
        self.sparse.clear();
    }

    /// Iterate over `(owner, component)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut T)> + '_ {
        self.owners.iter().copied().zip(self.dense.iter_mut())
    }

    fn dense_index(&self, entity: Entity) -> Option<usize> {
        let dense = (*self.sparse.get(entity.index() as usize)?)? as usize;
        (self.owners[dense] == entity).then_some(dense)
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
