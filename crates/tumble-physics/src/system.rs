//! Physics system: per-frame broad-phase rebuild, body updates and the
//! deferred surface-effect flush.

use ahash::AHashSet;
use glam::Vec2;
use indexmap::IndexMap;
use tumble_core::{Entity, EntityCategory, Ray, Rect, Stopwatch};

use crate::components::UpdateFrequency;
use crate::config::PhysicsConfig;
use crate::constants::{
    DEFAULT_TICK_RATE, FAR_DISTANCE_MULTIPLIER, FAR_DISTANCE_THRESHOLD, HIGH_TICK_RATE,
    LOW_TICK_RATE, MID_DISTANCE_MULTIPLIER, MID_DISTANCE_THRESHOLD,
};
use crate::scene::Scene;
use crate::spatial::{Bvh, Collider, QuadTree, SpatialHashGrid, SweepAndPrune};
use crate::{PhysicsError, PhysicsResult};

/// Timing counters. Purely informational.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PerformanceMetrics {
    pub query_count: usize,
    pub total_query_ms: f32,
    pub last_broad_phase_ms: f32,
    /// Overlapping dynamic pairs found by the last sweep
    pub broad_phase_pairs: usize,
}

impl PerformanceMetrics {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of a raycast against collider bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub collider: Collider,
    pub point: Vec2,
    pub distance: f32,
}

/// Drives every registered body once per frame
pub struct PhysicsSystem {
    config: PhysicsConfig,
    metrics: PerformanceMetrics,
    grid: SpatialHashGrid,
    high_priority_grid: SpatialHashGrid,
    low_priority_grid: SpatialHashGrid,
    category_grids: IndexMap<EntityCategory, SpatialHashGrid>,
    quadtree: QuadTree,
    bvh: Bvh,
    sweep_pairs: Vec<(Collider, Collider)>,
    pair_keys: AHashSet<(Entity, Entity)>,
    world_bounds: Rect,
    components: Vec<Entity>,
    static_colliders: Vec<Entity>,
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        let cell_size = config.default_cell_size;
        let world_bounds = config.default_world_bounds;
        Self {
            grid: SpatialHashGrid::new(cell_size),
            high_priority_grid: SpatialHashGrid::new(cell_size),
            low_priority_grid: SpatialHashGrid::new(cell_size),
            category_grids: IndexMap::new(),
            quadtree: QuadTree::with_limits(
                world_bounds,
                config.quadtree_max_depth,
                config.quadtree_max_objects,
            ),
            bvh: Bvh::new(),
            sweep_pairs: Vec::new(),
            pair_keys: AHashSet::new(),
            world_bounds,
            components: Vec::new(),
            static_colliders: Vec::new(),
            metrics: PerformanceMetrics::default(),
            config,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Register an entity whose body this system updates
    pub fn add(&mut self, entity: Entity) {
        if !self.components.contains(&entity) {
            self.components.push(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.components.retain(|&registered| registered != entity);
    }

    /// Register an entity whose bounding box takes part in the broad phase
    /// without a body
    pub fn add_static_collider(&mut self, entity: Entity) {
        if !self.static_colliders.contains(&entity) {
            self.static_colliders.push(entity);
        }
    }

    pub fn remove_static_collider(&mut self, entity: Entity) {
        self.static_colliders.retain(|&registered| registered != entity);
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.components.clear();
        self.static_colliders.clear();
    }

    pub fn bodies(&self) -> &[Entity] {
        &self.components
    }

    pub fn static_colliders(&self) -> &[Entity] {
        &self.static_colliders
    }

    /// Check that every registration still refers to a live entity
    pub fn validate(&self, scene: &Scene) -> PhysicsResult<()> {
        match self
            .components
            .iter()
            .chain(&self.static_colliders)
            .find(|&&entity| !scene.is_alive(entity))
        {
            Some(&entity) => Err(PhysicsError::StaleRegistration(entity)),
            None => Ok(()),
        }
    }

    /// Advance the simulation by one frame
    pub fn update(&mut self, scene: &mut Scene, delta_time: f32) {
        let _span =
            tracing::trace_span!("physics_update", bodies = self.components.len()).entered();

        self.rebuild_broad_phase(scene);

        for index in 0..self.components.len() {
            let entity = self.components[index];
            if !scene.is_alive(entity) {
                log::warn!("Skipping stale physics registration {entity}");
                continue;
            }
            let Some(mut body) = scene.take_body(entity) else {
                continue;
            };
            body.update(entity, scene, &self.config, delta_time);
            scene.restore_body(entity, body);
        }

        self.flush_effects(scene);
    }

    fn rebuild_broad_phase(&mut self, scene: &mut Scene) {
        let _span = tracing::trace_span!("broad_phase").entered();
        let stopwatch = Stopwatch::new();

        let dynamic: Vec<(Rect, Collider)> = self
            .components
            .iter()
            .copied()
            .filter(|&entity| scene.body(entity).is_some_and(|b| b.active))
            .map(Collider::new_dynamic)
            .filter_map(|collider| broad_phase_entry(scene, collider))
            .collect();
        let statics: Vec<(Rect, Collider)> = self
            .static_colliders
            .iter()
            .copied()
            .map(Collider::new_static)
            .filter_map(|collider| broad_phase_entry(scene, collider))
            .collect();

        self.world_bounds = match dynamic
            .iter()
            .chain(&statics)
            .map(|(bounds, _)| *bounds)
            .reduce(|a, b| a.union(&b))
        {
            Some(mut bounds) => {
                if bounds.w <= 0.0 {
                    bounds.w = 1.0;
                }
                if bounds.h <= 0.0 {
                    bounds.h = 1.0;
                }
                bounds
            }
            None => self.config.default_world_bounds,
        };

        let live = self
            .components
            .iter()
            .chain(&self.static_colliders)
            .filter(|&&entity| scene.is_alive(entity))
            .count();
        let cell_size = self.config.cell_size_for(self.world_bounds.area(), live);
        log::trace!(
            "Broad phase over {:?} with cell size {cell_size}",
            self.world_bounds
        );

        self.grid.set_cell_size(cell_size);
        self.high_priority_grid.set_cell_size(cell_size);
        self.low_priority_grid.set_cell_size(cell_size);
        for grid in self.category_grids.values_mut() {
            grid.set_cell_size(cell_size);
        }
        self.quadtree = QuadTree::with_limits(
            self.world_bounds,
            self.config.quadtree_max_depth,
            self.config.quadtree_max_objects,
        );

        let centre = self.world_bounds.center();
        for (bounds, collider) in &dynamic {
            let entity = collider.entity;
            let Some(frequency) = scene.body(entity).map(|body| body.update_frequency) else {
                continue;
            };
            if self.config.adaptive_tick_rate {
                let distance = scene
                    .position(entity)
                    .map_or(0.0, |position| position.distance(centre));
                if let Some(body) = scene.body_mut(entity) {
                    body.set_tick_rate(lod_tick_rate(frequency, distance));
                }
            }

            let tier = match frequency {
                UpdateFrequency::High => &mut self.high_priority_grid,
                UpdateFrequency::Low => &mut self.low_priority_grid,
                UpdateFrequency::Normal => &mut self.grid,
            };
            tier.insert(*collider, bounds);
            self.quadtree.insert(*collider, bounds);
            if let Some(category) = scene.category(entity) {
                self.category_grid_mut(category, cell_size).insert(*collider, bounds);
            }
        }

        for (bounds, collider) in &statics {
            self.quadtree.insert(*collider, bounds);
            if let Some(category) = scene.category(collider.entity) {
                self.category_grid_mut(category, cell_size).insert(*collider, bounds);
            }
        }

        self.sweep_pairs = SweepAndPrune::find_pairs(&dynamic);
        self.pair_keys = self
            .sweep_pairs
            .iter()
            .map(|(a, b)| pair_key(a.entity, b.entity))
            .collect();

        let mut all = dynamic;
        all.extend(statics);
        self.bvh.build(all);

        self.metrics.broad_phase_pairs = self.sweep_pairs.len();
        self.metrics.last_broad_phase_ms = stopwatch.elapsed_ms();
    }

    fn category_grid_mut(
        &mut self,
        category: EntityCategory,
        cell_size: f32,
    ) -> &mut SpatialHashGrid {
        self.category_grids
            .entry(category)
            .or_insert_with(|| SpatialHashGrid::new(cell_size))
    }

    /// Run queued trigger callbacks, then deregister and despawn queued
    /// removals
    fn flush_effects(&mut self, scene: &mut Scene) {
        let effects = scene.take_effects();
        for &(target, instigator) in effects.triggers() {
            if !scene.fire_trigger(target, instigator) {
                log::trace!("{target} has no trigger callback");
            }
        }
        for &entity in effects.removals() {
            self.remove(entity);
            self.remove_static_collider(entity);
            scene.despawn(entity);
        }
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Account for a spatial query timed by the caller
    pub fn record_spatial_query(&mut self, ms: f32) {
        self.metrics.query_count += 1;
        self.metrics.total_query_ms += ms;
    }

    /// World bounds used by the last broad phase
    pub fn world_bounds(&self) -> Rect {
        self.world_bounds
    }

    pub fn cell_size(&self) -> f32 {
        self.grid.cell_size()
    }

    /// Overlapping dynamic pairs from the last sweep
    pub fn broad_phase_pairs(&self) -> &[(Collider, Collider)] {
        &self.sweep_pairs
    }

    /// Whether two bodies were paired by the last sweep, in either order
    pub fn is_broad_phase_pair(&self, a: Entity, b: Entity) -> bool {
        self.pair_keys.contains(&pair_key(a, b))
    }

    /// Colliders whose bounds overlap `area`, as of the last broad phase
    pub fn query_region(&mut self, area: &Rect) -> Vec<Collider> {
        let stopwatch = Stopwatch::new();
        let found = self.bvh.query(area);
        self.record_spatial_query(stopwatch.elapsed_ms());
        found
    }

    /// Nearest collider whose bounds the ray crosses within `max_distance`
    pub fn raycast(
        &mut self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
    ) -> Option<RaycastHit> {
        let stopwatch = Stopwatch::new();
        let ray = Ray::new(origin, direction);
        let hit = self
            .bvh
            .raycast(&ray, max_distance)
            .map(|(collider, distance)| RaycastHit {
                collider,
                point: ray.at(distance),
                distance,
            });
        self.record_spatial_query(stopwatch.elapsed_ms());
        hit
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn high_priority_grid(&self) -> &SpatialHashGrid {
        &self.high_priority_grid
    }

    pub fn low_priority_grid(&self) -> &SpatialHashGrid {
        &self.low_priority_grid
    }

    pub fn category_grid(&self, category: EntityCategory) -> Option<&SpatialHashGrid> {
        self.category_grids.get(&category)
    }

    pub fn quadtree(&self) -> &QuadTree {
        &self.quadtree
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds of an entity's bounding box, if it is alive, active and has shapes
fn active_bounds(scene: &Scene, entity: Entity) -> Option<Rect> {
    if !scene.is_alive(entity) {
        return None;
    }
    scene.bounding_box(entity).filter(|component| component.is_active())?.bounds()
}

fn broad_phase_entry(scene: &Scene, collider: Collider) -> Option<(Rect, Collider)> {
    Some((active_bounds(scene, collider.entity)?, collider))
}

fn pair_key(a: Entity, b: Entity) -> (Entity, Entity) {
    (a.min(b), a.max(b))
}

/// Tick rate for a body of the given tier at `distance` from the world
/// centre. Zero means one step per frame.
fn lod_tick_rate(frequency: UpdateFrequency, distance: f32) -> f32 {
    let tick = match frequency {
        UpdateFrequency::Low => LOW_TICK_RATE,
        UpdateFrequency::High | UpdateFrequency::Normal => HIGH_TICK_RATE,
    };
    let base = if tick > HIGH_TICK_RATE { tick } else { DEFAULT_TICK_RATE };

    if distance > FAR_DISTANCE_THRESHOLD {
        base * FAR_DISTANCE_MULTIPLIER
    } else if distance > MID_DISTANCE_THRESHOLD {
        base * MID_DISTANCE_MULTIPLIER
    } else {
        tick
    }
}
