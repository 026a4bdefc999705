//! Components attached to scene entities.

pub mod body;
pub mod bounding_box;
pub mod surface;

pub use body::{PhysicsComponent, PhysicsProperties, UpdateFrequency};
pub use bounding_box::{BoundingBoxComponent, BoundingBoxProperties, ShapeProperties};
pub use surface::{SurfaceEffects, SurfaceResponse, SurfaceType};
