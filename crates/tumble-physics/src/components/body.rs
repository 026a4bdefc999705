//! Rigid body motion and collision response.
//!
//! Each frame a body integrates forces into velocity, moves its entity, and
//! scans the scene for the first overlapping shape pair. That single contact
//! is resolved (snap out, then impulse or surface response) and the scan
//! stops until the next step.

use std::borrow::Cow;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tumble_core::math::approach;
use tumble_core::{Circle, Entity, OrientedBox, Rect, TickAccumulator};

use super::bounding_box::BoundingBoxComponent;
use super::surface::{SurfaceResponse, SurfaceType};
use crate::config::PhysicsConfig;
use crate::constants::*;
use crate::response;
use crate::scene::Scene;

/// Update tier; picks the grid a body is indexed in and its base tick rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateFrequency {
    High,
    #[default]
    Normal,
    Low,
}

/// Build-time description of a physics body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsProperties {
    /// Share of velocity transferred to a dynamic body on contact
    #[serde(alias = "force")]
    pub push_force: f32,
    pub friction: f32,
    pub damping: f32,
    pub density: f32,
    pub mass: f32,
    pub restitution: f32,
    pub rotation_speed: f32,
    pub rotation: bool,
    pub gravity: bool,
    pub gravity_scale: f32,
    #[serde(rename = "static")]
    pub is_static: bool,
    #[serde(rename = "kinematic")]
    pub is_kinematic: bool,
    pub update_frequency: UpdateFrequency,
}

impl Default for PhysicsProperties {
    fn default() -> Self {
        Self {
            push_force: DEFAULT_PUSH_FORCE,
            friction: DEFAULT_FRICTION,
            damping: DEFAULT_DAMPING,
            density: DEFAULT_DENSITY,
            mass: DEFAULT_MASS,
            restitution: DEFAULT_BOUNCE_FACTOR,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            rotation: false,
            gravity: false,
            gravity_scale: DEFAULT_GRAVITY_SCALE,
            is_static: false,
            is_kinematic: false,
            update_frequency: UpdateFrequency::Normal,
        }
    }
}

/// Physics body component
#[derive(Debug, Clone)]
pub struct PhysicsComponent {
    pub velocity: Vec2,
    /// Cleared after every integration step
    pub acceleration: Vec2,
    /// Accumulated until the next integration step
    pub force: Vec2,
    /// Degrees per second
    pub angular_velocity: f32,
    pub angular_acceleration: f32,
    /// Degrees
    pub rotation: f32,
    /// Angular velocity picked up on impact
    pub rotation_speed: f32,
    /// Linear deceleration per second
    pub friction: f32,
    /// Velocity loss against static bodies
    pub damping: f32,
    /// Drag factor per second
    pub density: f32,
    pub mass: f32,
    pub push_force: f32,
    pub restitution: f32,
    pub gravity_scale: f32,
    pub rotation_enabled: bool,
    pub gravity_enabled: bool,
    /// Never moves; contacts against it take the surface response path
    pub is_static: bool,
    /// Moves by velocity only: no gravity, no resistance
    pub is_kinematic: bool,
    pub active: bool,
    pub update_frequency: UpdateFrequency,
    ticks: TickAccumulator,
    touching_static: bool,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self::from_properties(&PhysicsProperties::default())
    }
}

/// Shapes of one side of a contact test. A proxy replaces every shape with
/// the proxy bounds.
#[derive(Debug, Clone)]
struct ContactShapes<'a> {
    boxes: Cow<'a, [Rect]>,
    oriented: Cow<'a, [OrientedBox]>,
    circles: Cow<'a, [Circle]>,
    oriented_test: bool,
}

impl<'a> ContactShapes<'a> {
    fn of(component: &'a BoundingBoxComponent) -> Self {
        if component.proxy().is_some() {
            return Self {
                boxes: Cow::Owned(component.bounds().into_iter().collect()),
                oriented: Cow::Borrowed(&[]),
                circles: Cow::Borrowed(&[]),
                oriented_test: false,
            };
        }
        Self {
            boxes: Cow::Borrowed(component.boxes()),
            oriented: Cow::Borrowed(component.oriented_boxes()),
            circles: Cow::Borrowed(component.circles()),
            oriented_test: component.uses_oriented_test(),
        }
    }

    fn into_owned(self) -> ContactShapes<'static> {
        ContactShapes {
            boxes: Cow::Owned(self.boxes.into_owned()),
            oriented: Cow::Owned(self.oriented.into_owned()),
            circles: Cow::Owned(self.circles.into_owned()),
            oriented_test: self.oriented_test,
        }
    }
}

/// First pair `(a, b)` for which `test` yields an offset
fn first_overlap<A, B>(
    own: &[A],
    other: &[B],
    test: impl Fn(&A, &B) -> Option<Vec2>,
) -> Option<Vec2> {
    own.iter()
        .find_map(|a| other.iter().find_map(|b| test(a, b)))
}

/// Snap offsets of the first overlap in each shape category, in priority
/// order: box-box, box-circle, circle-circle, circle-box.
fn find_contacts(
    own: &ContactShapes<'_>,
    other: &ContactShapes<'_>,
    motion: Vec2,
) -> SmallVec<[Vec2; 4]> {
    let mut contacts = SmallVec::new();

    let box_box = if own.oriented_test || other.oriented_test {
        first_overlap(&own.oriented, &other.oriented, |a, b| {
            a.intersects(b)
                .then(|| response::oriented_snap_offset(a, b, motion))
        })
    } else {
        first_overlap(&own.boxes, &other.boxes, |a, b| {
            a.intersects(b).then(|| response::rect_snap_offset(a, b, motion))
        })
    };
    contacts.extend(box_box);

    contacts.extend(first_overlap(&own.boxes, &other.circles, |a, b| {
        a.intersects_circle(b)
            .then(|| response::rect_circle_snap_offset(a, b))
    }));
    contacts.extend(first_overlap(&own.circles, &other.circles, |a, b| {
        a.intersects(b).then(|| response::circle_snap_offset(a, b, motion))
    }));
    contacts.extend(first_overlap(&own.circles, &other.boxes, |a, b| {
        a.intersects_rect(b)
            .then(|| response::circle_rect_snap_offset(a, b))
    }));

    contacts
}

impl PhysicsComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a body from its declarative description
    pub fn from_properties(properties: &PhysicsProperties) -> Self {
        let body = Self {
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            force: Vec2::ZERO,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            rotation: 0.0,
            rotation_speed: properties.rotation_speed,
            friction: properties.friction,
            damping: properties.damping,
            density: properties.density,
            mass: properties.mass,
            push_force: properties.push_force,
            restitution: properties.restitution,
            gravity_scale: properties.gravity_scale,
            rotation_enabled: properties.rotation,
            gravity_enabled: properties.gravity,
            is_static: properties.is_static,
            is_kinematic: properties.is_kinematic,
            active: true,
            update_frequency: properties.update_frequency,
            ticks: TickAccumulator::default(),
            touching_static: false,
        };
        log::debug!(
            "Built physics body: mass {}, friction {}, static {}, kinematic {}",
            body.mass,
            body.friction,
            body.is_static,
            body.is_kinematic
        );
        body
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Accumulate a force for the next integration step
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn add_velocity(&mut self, delta: Vec2) {
        self.velocity += delta;
    }

    pub fn weight(&self, gravity: f32) -> f32 {
        self.mass * gravity
    }

    /// Zero for massless or infinitely heavy bodies
    pub fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 { 1.0 / self.mass } else { 0.0 }
    }

    /// Seconds per sub-step; zero steps once per frame
    pub fn tick_rate(&self) -> f32 {
        self.ticks.rate()
    }

    pub fn set_tick_rate(&mut self, rate: f32) {
        self.ticks.set_rate(rate);
    }

    /// Whether the last step ended against a static body
    pub fn is_touching_static(&self) -> bool {
        self.touching_static
    }

    /// Scale velocity by `1 - friction`
    pub fn apply_friction(&mut self, friction: f32) {
        self.velocity *= 1.0 - friction;
    }

    /// Impulse exchange with another body.
    ///
    /// The normal points from `position` to `other_position`; coincident
    /// bodies use the dominant axis of this body's velocity. Separating
    /// pairs and pairs without finite mass are left untouched.
    pub fn resolve_collision_with(
        &mut self,
        position: Vec2,
        other: &mut PhysicsComponent,
        other_position: Vec2,
        restitution: f32,
    ) {
        let mut normal = other_position - position;
        if normal.length_squared() == 0.0 {
            normal = if self.velocity.x.abs() > self.velocity.y.abs() {
                Vec2::new(if self.velocity.x > 0.0 { 1.0 } else { -1.0 }, 0.0)
            } else {
                Vec2::new(0.0, if self.velocity.y > 0.0 { 1.0 } else { -1.0 })
            };
        }
        let Some(normal) = normal.try_normalize() else {
            return;
        };

        let velocity_along_normal = (other.velocity - self.velocity).dot(normal);
        if velocity_along_normal > 0.0 {
            return;
        }

        let inverse_mass = self.inverse_mass();
        let other_inverse_mass = other.inverse_mass();
        let total_inverse_mass = inverse_mass + other_inverse_mass;
        if total_inverse_mass <= 0.0 {
            log::trace!("Skipping impulse between two bodies without finite mass");
            return;
        }

        let j = -(1.0 + restitution) * velocity_along_normal / total_inverse_mass;
        let impulse = normal * j;
        self.velocity =
            response::clamp_velocity(self.velocity - impulse * inverse_mass, TERMINAL_VELOCITY);
        other.velocity = response::clamp_velocity(
            other.velocity + impulse * other_inverse_mass,
            TERMINAL_VELOCITY,
        );
    }

    /// Advance this body by one frame.
    ///
    /// `owner` is the entity the body belongs to; the body itself must not be
    /// stored in `scene` while this runs.
    pub fn update(
        &mut self,
        owner: Entity,
        scene: &mut Scene,
        config: &PhysicsConfig,
        delta_time: f32,
    ) {
        if !self.active {
            return;
        }
        for step in self.ticks.split(delta_time) {
            self.step(owner, scene, config, step);
        }
    }

    fn step(&mut self, owner: Entity, scene: &mut Scene, config: &PhysicsConfig, delta_time: f32) {
        if self.is_static {
            self.force = Vec2::ZERO;
            self.acceleration = Vec2::ZERO;
            return;
        }
        self.touching_static = false;

        if !self.is_kinematic && self.gravity_enabled {
            let weight = self.weight(config.gravity) * self.gravity_scale;
            self.force += config.gravity_direction * weight;
        }

        response::apply_forces(
            &mut self.velocity,
            &mut self.acceleration,
            &mut self.force,
            self.mass,
            delta_time,
        );
        if !self.is_kinematic {
            response::apply_resistance(&mut self.velocity, self.friction, self.density, delta_time);
        }
        self.velocity = response::clamp_velocity(self.velocity, TERMINAL_VELOCITY);

        let Some(old_position) = scene.position(owner) else {
            log::trace!("{owner} has no transform, skipping step");
            return;
        };
        let position = old_position + self.velocity * delta_time;
        scene.set_position(owner, position);

        let collided = self.detect_collision(owner, scene, config, position, delta_time);
        if self.rotation_enabled {
            self.update_rotation(owner, scene, delta_time, collided);
        }

        if self.touching_static && self.damping > 0.0 {
            let factor = (1.0 - self.damping * delta_time).max(0.0);
            self.velocity =
                response::zero_small_components(self.velocity * factor, config.collision_threshold);
        }
    }

    /// Brute-force scan for the first contact; true once one is resolved
    fn detect_collision(
        &mut self,
        owner: Entity,
        scene: &mut Scene,
        config: &PhysicsConfig,
        position: Vec2,
        delta_time: f32,
    ) -> bool {
        let Some(own_box) = scene.bounding_box(owner) else {
            return false;
        };
        if !own_box.is_interactive() {
            return false;
        }
        let own = ContactShapes::of(own_box).into_owned();
        let own_surface = own_box.surface_type();
        let own_reach = own_box.bounds().map(|bounds| bounds.expanded(COLLISION_PADDING));
        let own_name = scene.name(owner).unwrap_or_default().to_string();
        let motion = self.velocity * delta_time;

        let candidates: Vec<Entity> = scene.entities().filter(|&entity| entity != owner).collect();
        for other in candidates {
            let contacts = {
                let (Some(own_box), Some(other_box)) =
                    (scene.bounding_box(owner), scene.bounding_box(other))
                else {
                    continue;
                };
                if !other_box.is_interactive() {
                    continue;
                }
                if own_surface == SurfaceType::DestroyOnHit
                    && other_box.surface_type() == SurfaceType::DestroyOnHit
                {
                    continue;
                }
                let other_name = scene.name(other).unwrap_or_default();
                if own_box.is_ignoring(other_name) || other_box.is_ignoring(&own_name) {
                    continue;
                }
                if let (Some(reach), Some(bounds)) = (own_reach, other_box.bounds()) {
                    if !reach.intersects(&bounds) {
                        continue;
                    }
                }
                find_contacts(&own, &ContactShapes::of(other_box), motion)
            };

            for offset in contacts {
                let response = self.handle_contact(owner, other, offset, position, scene, config);
                if response == SurfaceResponse::Resolved {
                    return true;
                }
            }
        }

        false
    }

    fn handle_contact(
        &mut self,
        owner: Entity,
        other: Entity,
        offset: Vec2,
        position: Vec2,
        scene: &mut Scene,
        config: &PhysicsConfig,
    ) -> SurfaceResponse {
        let (Some(own_box), Some(other_box)) =
            (scene.bounding_box(owner), scene.bounding_box(other))
        else {
            return SurfaceResponse::Passed;
        };
        let own_solid = own_box.is_solid();
        let own_surface = own_box.surface_type();
        let other_solid = other_box.is_solid();
        let other_surface = other_box.surface_type();
        let bounce = (own_box.restitution() + other_box.restitution()) * 0.5;
        let friction = (own_box.friction() + other_box.friction()) * 0.5;

        if !own_solid || !other_solid {
            return self.handle_trigger_contact(owner, other, offset, bounce, friction, scene);
        }

        let partner_is_static = scene.body(other).map(|body| body.is_static);
        let dynamic_partner = partner_is_static == Some(false);

        if dynamic_partner && self.push_force > 0.0 {
            if let Some(other_body) = scene.body_mut(other) {
                let push = self.velocity * self.push_force;
                other_body.velocity += push;
                self.velocity -= push;
            }
        }

        let snapped = position + offset;
        scene.set_position(owner, snapped);

        if dynamic_partner {
            let other_position = scene.position(other).unwrap_or(snapped);
            if let Some(other_body) = scene.body_mut(other) {
                self.resolve_collision_with(snapped, other_body, other_position, bounce);
                self.apply_friction(friction);
                other_body.apply_friction(friction);
                other_body.velocity = response::zero_small_components(
                    other_body.velocity,
                    config.collision_threshold,
                );
                self.velocity =
                    response::zero_small_components(self.velocity, config.collision_threshold);
            }
        } else {
            let response = match scene.surface_context(owner) {
                Some((own_box, effects)) => own_box.handle_surface_interaction(
                    other_surface,
                    other,
                    offset,
                    bounce,
                    friction,
                    &mut self.velocity,
                    effects,
                ),
                None => SurfaceResponse::Resolved,
            };
            if response == SurfaceResponse::Passed {
                scene.set_position(owner, position);
                return SurfaceResponse::Passed;
            }
            if partner_is_static == Some(true) {
                self.touching_static = true;
                if self.damping > 0.0 {
                    self.velocity *= (1.0 - self.damping).max(0.0);
                }
            }
        }

        if own_surface == SurfaceType::DestroyOnHit {
            scene.effects_mut().destroy(owner);
        }
        log::trace!("{owner} resolved contact with {other}, offset {offset}");
        SurfaceResponse::Resolved
    }

    /// Contact where either side is non-solid. Nothing is snapped. A
    /// non-solid own box applies the partner's surface to the partner; a
    /// non-solid partner with a body applies this surface to itself. The
    /// contact only counts when some interaction took effect.
    fn handle_trigger_contact(
        &mut self,
        owner: Entity,
        other: Entity,
        offset: Vec2,
        bounce: f32,
        friction: f32,
        scene: &mut Scene,
    ) -> SurfaceResponse {
        let (Some(own_box), Some(other_box)) =
            (scene.bounding_box(owner), scene.bounding_box(other))
        else {
            return SurfaceResponse::Passed;
        };
        let own_solid = own_box.is_solid();
        let own_surface = own_box.surface_type();
        let other_solid = other_box.is_solid();
        let other_surface = other_box.surface_type();

        let mut resolved = false;
        if !own_solid {
            if let Some((own_box, effects)) = scene.surface_context(owner) {
                let response = own_box.handle_surface_interaction(
                    other_surface,
                    other,
                    offset,
                    bounce,
                    friction,
                    &mut self.velocity,
                    effects,
                );
                resolved |= response == SurfaceResponse::Resolved;
            }
        }
        if !other_solid {
            if let Some((other_box, Some(other_body), effects)) = scene.partner_context(other) {
                let response = other_box.handle_surface_interaction(
                    own_surface,
                    other,
                    -offset,
                    bounce,
                    friction,
                    &mut other_body.velocity,
                    effects,
                );
                resolved |= response == SurfaceResponse::Resolved;
            }
        }
        if own_surface == SurfaceType::DestroyOnHit {
            scene.effects_mut().destroy(owner);
            resolved = true;
        }

        if resolved {
            log::trace!("{owner} touched trigger contact {other}");
            SurfaceResponse::Resolved
        } else {
            SurfaceResponse::Passed
        }
    }

    fn update_rotation(
        &mut self,
        owner: Entity,
        scene: &mut Scene,
        delta_time: f32,
        collided: bool,
    ) {
        if collided && self.rotation_speed != 0.0 {
            self.angular_velocity = self.rotation_speed;
        }

        self.angular_velocity += self.angular_acceleration * delta_time;
        self.angular_acceleration = 0.0;

        if self.friction > 0.0 {
            self.angular_velocity =
                approach(self.angular_velocity, 0.0, self.friction * delta_time);
        }

        self.rotation += self.angular_velocity * delta_time;
        if let Some(component) = scene.bounding_box_mut(owner) {
            component.set_rotation_enabled(true);
        }
        scene.set_rotation(owner, self.rotation);

        if self.velocity == Vec2::ZERO {
            self.angular_velocity = 0.0;
        }
    }
}
