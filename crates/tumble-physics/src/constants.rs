//! Engine-wide physics defaults.

use glam::Vec2;
use tumble_core::Rect;

/// Maximum speed of any body, in units per second
pub const TERMINAL_VELOCITY: f32 = 800.0;
pub const GRAVITY: f32 = 9.81;
/// Screen-space down
pub const GRAVITY_DIRECTION: Vec2 = Vec2::new(0.0, 1.0);

pub const DEFAULT_FRICTION: f32 = 0.1;
pub const DEFAULT_BOUNCE_FACTOR: f32 = 0.5;
pub const DEFAULT_DAMPING: f32 = 0.1;
pub const DEFAULT_DENSITY: f32 = 0.1;
pub const DEFAULT_MASS: f32 = 1.0;
pub const DEFAULT_PUSH_FORCE: f32 = 1.0;
/// Degrees per second applied on impact when rotation is enabled
pub const DEFAULT_ROTATION_SPEED: f32 = 90.0;
pub const DEFAULT_GRAVITY_SCALE: f32 = 1.0;
/// Velocity components below this are zeroed after contacts
pub const DEFAULT_COLLISION_THRESHOLD: f32 = 0.1;

pub const MIN_CELL_SIZE: f32 = 32.0;
pub const MAX_CELL_SIZE: f32 = 256.0;
pub const DEFAULT_CELL_SIZE: f32 = 128.0;
pub const DEFAULT_WORLD_BOUNDS: Rect = Rect::new(0.0, 0.0, 10_000.0, 10_000.0);

pub const QUADTREE_MAX_DEPTH: u32 = 5;
pub const QUADTREE_MAX_OBJECTS: usize = 4;

// Tick rates in seconds per step; zero steps once per frame.
pub const HIGH_TICK_RATE: f32 = 0.0;
pub const DEFAULT_TICK_RATE: f32 = 1.0 / 60.0;
pub const LOW_TICK_RATE: f32 = 1.0 / 15.0;

/// Distance from the world centre beyond which the tick rate is doubled
pub const MID_DISTANCE_THRESHOLD: f32 = 500.0;
pub const MID_DISTANCE_MULTIPLIER: f32 = 2.0;
/// Distance from the world centre beyond which the tick rate is quadrupled
pub const FAR_DISTANCE_THRESHOLD: f32 = 1000.0;
pub const FAR_DISTANCE_MULTIPLIER: f32 = 4.0;

/// Margin around a body's bounds when pre-filtering narrow-phase candidates
pub const COLLISION_PADDING: f32 = 50.0;
