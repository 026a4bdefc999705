//! Scene: entities plus the components the physics system works with.
//!
//! Moving or rotating an entity through the scene propagates the new
//! transform to its bounding box and to every attached follower, so
//! component geometry never lags the entity.

use glam::Vec2;
use tumble_core::{ComponentStorage, Entity, EntityCategory, Positionable, Rotatable, World};

use crate::components::{BoundingBoxComponent, PhysicsComponent, SurfaceEffects};
use crate::{PhysicsError, PhysicsResult};

/// Callback fired when a trigger surface reports a contact.
///
/// Receives the entity whose trigger fired and the entity that caused it.
pub type TriggerCallback = Box<dyn FnMut(Entity, Option<Entity>)>;

/// Entity container for the physics system
#[derive(Default)]
pub struct Scene {
    world: World,
    bounding_boxes: ComponentStorage<BoundingBoxComponent>,
    bodies: ComponentStorage<PhysicsComponent>,
    followers: ComponentStorage<Vec<Box<dyn Positionable>>>,
    rotators: ComponentStorage<Vec<Box<dyn Rotatable>>>,
    triggers: ComponentStorage<TriggerCallback>,
    effects: SurfaceEffects,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn spawn(&mut self, name: impl Into<String>) -> Entity {
        self.world.spawn(name)
    }

    pub fn spawn_at(&mut self, name: impl Into<String>, position: Vec2) -> Entity {
        let entity = self.world.spawn(name);
        self.world.set_position(entity, position);
        entity
    }

    /// Remove an entity and every component attached to it.
    ///
    /// Deregister it from the physics system first; a registration that
    /// outlives its entity is reported by `PhysicsSystem::validate`.
    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.world.despawn(entity) {
            return false;
        }
        self.bounding_boxes.remove(entity);
        self.bodies.remove(entity);
        self.followers.remove(entity);
        self.rotators.remove(entity);
        self.triggers.remove(entity);
        log::debug!("Despawned {entity}");
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.is_alive(entity)
    }

    /// Alive entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.world.iter()
    }

    pub fn name(&self, entity: Entity) -> Option<&str> {
        self.world.name(entity)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.position(entity)
    }

    /// Move an entity and everything that follows it
    pub fn set_position(&mut self, entity: Entity, position: Vec2) -> bool {
        if !self.world.set_position(entity, position) {
            return false;
        }
        if let Some(component) = self.bounding_boxes.get_mut(entity) {
            component.set_entity_position(position);
        }
        if let Some(followers) = self.followers.get_mut(entity) {
            for follower in followers.iter_mut() {
                follower.set_entity_position(position);
            }
        }
        true
    }

    pub fn rotation(&self, entity: Entity) -> Option<f32> {
        self.world.rotation(entity)
    }

    /// Rotate an entity (degrees) and everything that follows it
    pub fn set_rotation(&mut self, entity: Entity, angle: f32) -> bool {
        if !self.world.set_rotation(entity, angle) {
            return false;
        }
        if let Some(component) = self.bounding_boxes.get_mut(entity) {
            component.set_entity_rotation(angle);
        }
        if let Some(rotators) = self.rotators.get_mut(entity) {
            for rotator in rotators.iter_mut() {
                rotator.set_entity_rotation(angle);
            }
        }
        true
    }

    pub fn category(&self, entity: Entity) -> Option<EntityCategory> {
        self.world.category(entity)
    }

    pub fn set_category(&mut self, entity: Entity, category: EntityCategory) -> bool {
        self.world.set_category(entity, category)
    }

    /// Attach collision shapes, synced to the entity's current transform
    pub fn attach_bounding_box(
        &mut self,
        entity: Entity,
        mut component: BoundingBoxComponent,
    ) -> PhysicsResult<()> {
        let (position, rotation) = self.transform(entity)?;
        component.set_owner(entity);
        component.set_entity_position(position);
        component.set_entity_rotation(rotation);
        self.bounding_boxes.insert(entity, component);
        Ok(())
    }

    pub fn attach_body(&mut self, entity: Entity, body: PhysicsComponent) -> PhysicsResult<()> {
        self.transform(entity)?;
        self.bodies.insert(entity, body);
        Ok(())
    }

    /// Attach a component that tracks the entity's position
    pub fn attach_follower(
        &mut self,
        entity: Entity,
        mut follower: Box<dyn Positionable>,
    ) -> PhysicsResult<()> {
        let (position, _) = self.transform(entity)?;
        follower.set_entity_position(position);
        match self.followers.get_mut(entity) {
            Some(followers) => followers.push(follower),
            None => {
                self.followers.insert(entity, vec![follower]);
            }
        }
        Ok(())
    }

    /// Attach a component that tracks the entity's rotation
    pub fn attach_rotatable(
        &mut self,
        entity: Entity,
        mut rotator: Box<dyn Rotatable>,
    ) -> PhysicsResult<()> {
        let (_, rotation) = self.transform(entity)?;
        rotator.set_entity_rotation(rotation);
        match self.rotators.get_mut(entity) {
            Some(rotators) => rotators.push(rotator),
            None => {
                self.rotators.insert(entity, vec![rotator]);
            }
        }
        Ok(())
    }

    /// Install the callback fired when a trigger surface hits this entity
    pub fn set_trigger(&mut self, entity: Entity, callback: TriggerCallback) -> PhysicsResult<()> {
        self.transform(entity)?;
        self.triggers.insert(entity, callback);
        Ok(())
    }

    /// Run an entity's trigger callback. Returns `false` when it has none.
    pub fn fire_trigger(&mut self, target: Entity, instigator: Option<Entity>) -> bool {
        match self.triggers.get_mut(target) {
            Some(callback) => {
                callback(target, instigator);
                true
            }
            None => false,
        }
    }

    pub fn bounding_box(&self, entity: Entity) -> Option<&BoundingBoxComponent> {
        self.bounding_boxes.get(entity)
    }

    pub fn bounding_box_mut(&mut self, entity: Entity) -> Option<&mut BoundingBoxComponent> {
        self.bounding_boxes.get_mut(entity)
    }

    pub fn body(&self, entity: Entity) -> Option<&PhysicsComponent> {
        self.bodies.get(entity)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<&mut PhysicsComponent> {
        self.bodies.get_mut(entity)
    }

    /// Effects queued since the last physics update
    pub fn effects(&self) -> &SurfaceEffects {
        &self.effects
    }

    pub(crate) fn effects_mut(&mut self) -> &mut SurfaceEffects {
        &mut self.effects
    }

    pub(crate) fn take_effects(&mut self) -> SurfaceEffects {
        std::mem::take(&mut self.effects)
    }

    /// Detach a body for the duration of its own update
    pub(crate) fn take_body(&mut self, entity: Entity) -> Option<PhysicsComponent> {
        self.bodies.remove(entity)
    }

    pub(crate) fn restore_body(&mut self, entity: Entity, body: PhysicsComponent) {
        if self.world.is_alive(entity) {
            self.bodies.insert(entity, body);
        }
    }

    /// An entity's bounding box together with the effect queue
    pub(crate) fn surface_context(
        &mut self,
        entity: Entity,
    ) -> Option<(&BoundingBoxComponent, &mut SurfaceEffects)> {
        let component = self.bounding_boxes.get(entity)?;
        Some((component, &mut self.effects))
    }

    /// A contact partner's bounding box, its body if any, and the effect queue
    pub(crate) fn partner_context(
        &mut self,
        entity: Entity,
    ) -> Option<(&BoundingBoxComponent, Option<&mut PhysicsComponent>, &mut SurfaceEffects)> {
        let component = self.bounding_boxes.get(entity)?;
        Some((component, self.bodies.get_mut(entity), &mut self.effects))
    }

    fn transform(&self, entity: Entity) -> PhysicsResult<(Vec2, f32)> {
        match (self.world.position(entity), self.world.rotation(entity)) {
            (Some(position), Some(rotation)) => Ok((position, rotation)),
            _ => Err(PhysicsError::EntityNotFound(entity)),
        }
    }
}
