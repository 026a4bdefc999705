//! # Tumble Core
//!
//! Foundational types shared by the Tumble physics crates.
//!
//! This crate provides:
//! - **ECS**: Generation-checked entity handles, sparse-set component storage and
//!   the positionable/rotatable capabilities components implement to follow
//!   their entity
//! - **Math**: 2-D shapes (rect, circle, oriented box, polygon, capsule), their
//!   pairwise intersection predicates and ray tests
//! - **Time**: Stopwatch for frame metrics and tick accumulation for sub-stepped
//!   integration

pub mod ecs;
pub mod math;
pub mod time;

pub use ecs::{ComponentStorage, Entity, EntityCategory, Positionable, Rotatable, World};
pub use math::{Capsule, Circle, OrientedBox, Polygon, Ray, Rect, Vec2};
pub use time::{Stopwatch, TickAccumulator};
