//! Spatial partitioning structures, rebuilt from scratch every frame.
//!
//! Every structure is generic over a small `Copy` payload identifying the
//! stored object, [`Collider`] by default.

pub mod bvh;
pub mod grid;
pub mod quadtree;
pub mod sweep;

pub use bvh::Bvh;
pub use grid::SpatialHashGrid;
pub use quadtree::QuadTree;
pub use sweep::SweepAndPrune;

use tumble_core::Entity;

/// Non-owning reference to a collidable entity.
///
/// Shapes and bodies are looked up through the scene by `entity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Collider {
    pub entity: Entity,
    /// Registered as a moving body rather than a static collider
    pub dynamic: bool,
}

impl Collider {
    pub fn new_dynamic(entity: Entity) -> Self {
        Self {
            entity,
            dynamic: true,
        }
    }

    pub fn new_static(entity: Entity) -> Self {
        Self {
            entity,
            dynamic: false,
        }
    }
}
