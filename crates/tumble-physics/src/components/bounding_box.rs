//! Collision shapes attached to an entity.
//!
//! Shapes are stored in entity-local coordinates. World-space copies are
//! computed lazily: moving or rotating the entity empties the cache, and
//! every shape getter refills it before returning, so callers always see
//! geometry for the current transform.

use std::cell::OnceCell;

use ahash::AHashSet;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tumble_core::{Capsule, Circle, Entity, OrientedBox, Polygon, Positionable, Rect, Rotatable};

use super::surface::{SurfaceEffects, SurfaceResponse, SurfaceType};
use crate::constants::{DEFAULT_BOUNCE_FACTOR, DEFAULT_FRICTION};

/// One shape entry of [`BoundingBoxProperties`]: a circle when `radius > 0`,
/// otherwise a box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeProperties {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub radius: f32,
}

/// Build-time description of a bounding box, typically loaded from a script
/// or data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundingBoxProperties {
    #[serde(alias = "boxes")]
    pub shapes: Vec<ShapeProperties>,
    pub active: bool,
    pub solid: bool,
    pub friction: f32,
    pub restitution: f32,
    pub surface: SurfaceType,
    pub rotation: bool,
    pub ignored: Vec<String>,
    /// Local-space broad-phase bounds overriding the shape union
    pub proxy: Option<Rect>,
}

impl Default for BoundingBoxProperties {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            active: true,
            solid: false,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_BOUNCE_FACTOR,
            surface: SurfaceType::default(),
            rotation: false,
            ignored: Vec::new(),
            proxy: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct WorldShapes {
    boxes: Vec<Rect>,
    /// One per box (same index), then the explicit oriented boxes
    oriented_boxes: Vec<OrientedBox>,
    circles: Vec<Circle>,
    polygons: Vec<Polygon>,
    capsules: Vec<Capsule>,
    bounds: Option<Rect>,
}

/// Collision geometry and surface properties of an entity
#[derive(Debug, Clone)]
pub struct BoundingBoxComponent {
    boxes: Vec<Rect>,
    oriented_boxes: Vec<OrientedBox>,
    circles: Vec<Circle>,
    polygons: Vec<Polygon>,
    capsules: Vec<Capsule>,

    position: Vec2,
    /// Degrees
    rotation: f32,
    /// `(sin, cos)` of `rotation`; emptied only when the angle changes
    trig: OnceCell<(f32, f32)>,
    /// Empty while dirty
    world: OnceCell<WorldShapes>,

    owner: Option<Entity>,
    surface_type: SurfaceType,
    solid: bool,
    active: bool,
    friction: f32,
    restitution: f32,
    rotation_enabled: bool,
    ignored: AHashSet<String>,
    proxy: Option<Rect>,
}

impl Default for BoundingBoxComponent {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            oriented_boxes: Vec::new(),
            circles: Vec::new(),
            polygons: Vec::new(),
            capsules: Vec::new(),
            position: Vec2::ZERO,
            rotation: 0.0,
            trig: OnceCell::new(),
            world: OnceCell::new(),
            owner: None,
            surface_type: SurfaceType::default(),
            solid: false,
            active: true,
            friction: DEFAULT_FRICTION,
            restitution: DEFAULT_BOUNCE_FACTOR,
            rotation_enabled: false,
            ignored: AHashSet::new(),
            proxy: None,
        }
    }
}

impl BoundingBoxComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a component from its declarative description
    pub fn from_properties(properties: &BoundingBoxProperties) -> Self {
        let mut component = Self::new();
        for shape in &properties.shapes {
            if shape.radius > 0.0 {
                component.add_circle(Circle::new(shape.x, shape.y, shape.radius));
            } else {
                component.add_box(Rect::new(shape.x, shape.y, shape.w, shape.h));
            }
        }
        component.active = properties.active;
        component.solid = properties.solid;
        component.friction = properties.friction;
        component.restitution = properties.restitution;
        component.surface_type = properties.surface;
        component.rotation_enabled = properties.rotation;
        component.ignored = properties.ignored.iter().cloned().collect();
        component.proxy = properties.proxy;

        log::debug!(
            "Built bounding box: {} boxes, {} circles, surface {}, solid {}",
            component.boxes.len(),
            component.circles.len(),
            component.surface_type,
            component.solid
        );
        component
    }

    pub fn with_box(mut self, rect: Rect) -> Self {
        self.add_box(rect);
        self
    }

    pub fn with_circle(mut self, circle: Circle) -> Self {
        self.add_circle(circle);
        self
    }

    pub fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    pub fn with_surface(mut self, surface: SurfaceType) -> Self {
        self.surface_type = surface;
        self
    }

    pub fn with_material(mut self, friction: f32, restitution: f32) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    pub fn add_box(&mut self, rect: Rect) {
        self.boxes.push(rect);
        self.invalidate();
    }

    pub fn add_circle(&mut self, circle: Circle) {
        self.circles.push(circle);
        self.invalidate();
    }

    pub fn add_oriented_box(&mut self, oriented_box: OrientedBox) {
        self.oriented_boxes.push(oriented_box);
        self.invalidate();
    }

    pub fn add_polygon(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
        self.invalidate();
    }

    pub fn add_capsule(&mut self, capsule: Capsule) {
        self.capsules.push(capsule);
        self.invalidate();
    }

    pub fn clear_shapes(&mut self) {
        self.boxes.clear();
        self.oriented_boxes.clear();
        self.circles.clear();
        self.polygons.clear();
        self.capsules.clear();
        self.invalidate();
    }

    /// World-space boxes. With rotation enabled these are the bounds of the
    /// rotated boxes.
    pub fn boxes(&self) -> &[Rect] {
        &self.world().boxes
    }

    /// World-space oriented boxes: one per box (same index) followed by the
    /// explicitly added ones
    pub fn oriented_boxes(&self) -> &[OrientedBox] {
        &self.world().oriented_boxes
    }

    pub fn circles(&self) -> &[Circle] {
        &self.world().circles
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.world().polygons
    }

    pub fn capsules(&self) -> &[Capsule] {
        &self.world().capsules
    }

    /// Broad-phase bounds: the proxy if set, else the union of every shape.
    /// `None` for a component without shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.world().bounds
    }

    /// Whether the world-space cache needs recomputing
    pub fn is_dirty(&self) -> bool {
        self.world.get().is_none()
    }

    /// Whether box-box contacts must use the oriented (SAT) test
    pub fn uses_oriented_test(&self) -> bool {
        self.rotation_enabled || !self.oriented_boxes.is_empty()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Cached `(sin, cos)` of the current rotation
    pub fn rotation_sin_cos(&self) -> (f32, f32) {
        *self.trig.get_or_init(|| self.rotation.to_radians().sin_cos())
    }

    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Entity) {
        self.owner = Some(owner);
    }

    pub fn surface_type(&self) -> SurfaceType {
        self.surface_type
    }

    pub fn set_surface_type(&mut self, surface: SurfaceType) {
        self.surface_type = surface;
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Active, and either solid or carrying a trigger-only surface
    pub fn is_interactive(&self) -> bool {
        self.active && (self.solid || self.surface_type.is_trigger_only())
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f32) {
        self.friction = friction;
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f32) {
        self.restitution = restitution;
    }

    pub fn is_rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn set_rotation_enabled(&mut self, enabled: bool) {
        if self.rotation_enabled != enabled {
            self.rotation_enabled = enabled;
            self.invalidate();
        }
    }

    /// Ignore contacts with entities of the given name
    pub fn ignore(&mut self, name: impl Into<String>) {
        self.ignored.insert(name.into());
    }

    pub fn is_ignoring(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    pub fn proxy(&self) -> Option<Rect> {
        self.proxy
    }

    pub fn set_proxy(&mut self, proxy: Option<Rect>) {
        self.proxy = proxy;
        self.invalidate();
    }

    /// React to running into a surface of the given type.
    ///
    /// `offset` is the snap correction applied to the moving body; its larger
    /// axis is the contact normal for `Slide`. Removals and triggers are only
    /// queued in `effects`.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_surface_interaction(
        &self,
        surface: SurfaceType,
        target: Entity,
        offset: Vec2,
        bounce: f32,
        friction: f32,
        velocity: &mut Vec2,
        effects: &mut SurfaceEffects,
    ) -> SurfaceResponse {
        match surface {
            SurfaceType::Slide => {
                if offset.x.abs() > offset.y.abs() {
                    velocity.x = 0.0;
                    velocity.y *= 1.0 - friction;
                } else {
                    velocity.y = 0.0;
                    velocity.x *= 1.0 - friction;
                }
            }
            SurfaceType::Stick | SurfaceType::Rest => *velocity = Vec2::ZERO,
            SurfaceType::DestroyOnHit => effects.destroy(target),
            SurfaceType::TriggerEvent => effects.trigger(target, self.owner),
            SurfaceType::GhostPass => return SurfaceResponse::Passed,
            SurfaceType::Bounce => *velocity *= -bounce * (1.0 - friction),
        }
        SurfaceResponse::Resolved
    }

    fn invalidate(&mut self) {
        self.world.take();
    }

    fn world(&self) -> &WorldShapes {
        self.world.get_or_init(|| self.compute_world())
    }

    fn compute_world(&self) -> WorldShapes {
        let offset = self.position;
        let rotation = self.rotation_enabled.then(|| self.rotation_sin_cos());

        let mut world = WorldShapes::default();

        for rect in &self.boxes {
            let moved = rect.translated(offset);
            let oriented = OrientedBox::from_rect(&moved);
            match rotation {
                Some((sin, cos)) => {
                    let rotated = oriented.rotated_about(moved.center(), sin, cos);
                    world.boxes.push(rotated.bounds());
                    world.oriented_boxes.push(rotated);
                }
                None => {
                    world.boxes.push(moved);
                    world.oriented_boxes.push(oriented);
                }
            }
        }

        for oriented in &self.oriented_boxes {
            let moved = oriented.translated(offset);
            world.oriented_boxes.push(match rotation {
                Some((sin, cos)) => moved.rotated_about(moved.center(), sin, cos),
                None => moved,
            });
        }

        world.circles = self.circles.iter().map(|c| c.translated(offset)).collect();

        world.polygons = self
            .polygons
            .iter()
            .map(|polygon| {
                let moved = polygon.translated(offset);
                match rotation {
                    Some((sin, cos)) => moved.rotated_about(moved.bounds().center(), sin, cos),
                    None => moved,
                }
            })
            .collect();

        world.capsules = self
            .capsules
            .iter()
            .map(|capsule| {
                let moved = capsule.translated(offset);
                match rotation {
                    Some((sin, cos)) => moved.rotated_about(moved.center(), sin, cos),
                    None => moved,
                }
            })
            .collect();

        world.bounds = match self.proxy {
            Some(proxy) => Some(proxy.translated(offset)),
            None => world
                .boxes
                .iter()
                .copied()
                .chain(world.oriented_boxes.iter().map(OrientedBox::bounds))
                .chain(world.circles.iter().map(Circle::bounds))
                .chain(world.polygons.iter().map(Polygon::bounds))
                .chain(world.capsules.iter().map(Capsule::bounds))
                .reduce(|a, b| a.union(&b)),
        };

        world
    }
}

impl Positionable for BoundingBoxComponent {
    fn set_entity_position(&mut self, position: Vec2) {
        self.position = position;
        self.invalidate();
    }
}

impl Rotatable for BoundingBoxComponent {
    fn set_entity_rotation(&mut self, angle: f32) {
        if angle != self.rotation {
            self.rotation = angle;
            self.trig.take();
        }
        self.invalidate();
    }
}
