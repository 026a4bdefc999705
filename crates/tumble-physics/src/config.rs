//! Physics system configuration

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tumble_core::Rect;

use crate::constants::*;

/// Physics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Lower clamp for the per-frame grid cell size
    pub min_cell_size: f32,
    /// Upper clamp for the per-frame grid cell size
    pub max_cell_size: f32,
    /// Cell size of freshly created grids
    pub default_cell_size: f32,
    /// World bounds used when nothing is registered
    pub default_world_bounds: Rect,
    pub quadtree_max_depth: u32,
    pub quadtree_max_objects: usize,
    /// Gravity acceleration magnitude
    pub gravity: f32,
    pub gravity_direction: Vec2,
    /// Velocity components below this are zeroed after contacts
    pub collision_threshold: f32,
    /// Assign tick rates from update frequency and distance to the world centre
    pub adaptive_tick_rate: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            min_cell_size: MIN_CELL_SIZE,
            max_cell_size: MAX_CELL_SIZE,
            default_cell_size: DEFAULT_CELL_SIZE,
            default_world_bounds: DEFAULT_WORLD_BOUNDS,
            quadtree_max_depth: QUADTREE_MAX_DEPTH,
            quadtree_max_objects: QUADTREE_MAX_OBJECTS,
            gravity: GRAVITY,
            gravity_direction: GRAVITY_DIRECTION,
            collision_threshold: DEFAULT_COLLISION_THRESHOLD,
            adaptive_tick_rate: true,
        }
    }
}

impl PhysicsConfig {
    /// Cell size for a world of the given area holding `colliders` objects
    pub fn cell_size_for(&self, world_area: f32, colliders: usize) -> f32 {
        let size = (world_area / (colliders as f32 + 1.0)).sqrt();
        if size.is_nan() {
            return self.default_cell_size;
        }
        size.max(self.min_cell_size).min(self.max_cell_size)
    }
}
