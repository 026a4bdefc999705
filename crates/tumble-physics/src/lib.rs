//! # Tumble Physics
//!
//! 2-D collision detection and collision response.
//!
//! ## Features
//! - Bounding-box components with lazily cached world geometry
//! - Spatial hash grids, quadtree and BVH rebuilt every frame
//! - Sweep-and-prune broad phase for pair metrics and queries
//! - Velocity integration with gravity, friction and drag
//! - Impulse resolution and per-surface responses (bounce, slide, stick,
//!   ghost, trigger, destroy)
//! - Distance-based tick-rate level of detail
//!
//! The per-frame entry point is [`PhysicsSystem::update`], driven over a
//! [`Scene`] that owns entities and their components.

use thiserror::Error;
use tumble_core::Entity;

pub mod components;
pub mod config;
pub mod constants;
pub mod response;
pub mod scene;
pub mod spatial;
pub mod system;

pub use components::{
    BoundingBoxComponent, BoundingBoxProperties, PhysicsComponent, PhysicsProperties,
    ShapeProperties, SurfaceEffects, SurfaceResponse, SurfaceType, UpdateFrequency,
};
pub use config::PhysicsConfig;
pub use scene::{Scene, TriggerCallback};
pub use spatial::{Bvh, Collider, QuadTree, SpatialHashGrid, SweepAndPrune};
pub use system::{PerformanceMetrics, PhysicsSystem, RaycastHit};

/// Physics errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("Entity not found: {0}")]
    EntityNotFound(Entity),

    #[error("Stale registration: {0} was despawned while still registered")]
    StaleRegistration(Entity),

    #[error("Unknown surface type: {0}")]
    UnknownSurfaceType(String),
}

/// Result type for physics set-up and validation
pub type PhysicsResult<T> = Result<T, PhysicsError>;
