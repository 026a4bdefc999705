//! Surface behaviours and the deferred effects they produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tumble_core::Entity;

use crate::PhysicsError;

/// How a bounding box reacts when something runs into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SurfaceType {
    /// Reflect velocity scaled by restitution and friction
    #[default]
    Bounce,
    /// Remove the entity that was hit
    DestroyOnHit,
    /// No response; the contact is ignored
    GhostPass,
    /// Stop dead
    Rest,
    /// Cancel motion into the surface, keep sliding along it
    Slide,
    /// Stop dead
    Stick,
    /// Fire the hit entity's trigger callback
    TriggerEvent,
}

impl SurfaceType {
    pub const ALL: [SurfaceType; 7] = [
        SurfaceType::Bounce,
        SurfaceType::DestroyOnHit,
        SurfaceType::GhostPass,
        SurfaceType::Rest,
        SurfaceType::Slide,
        SurfaceType::Stick,
        SurfaceType::TriggerEvent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceType::Bounce => "BOUNCE",
            SurfaceType::DestroyOnHit => "DESTROY_ON_HIT",
            SurfaceType::GhostPass => "GHOST_PASS",
            SurfaceType::Rest => "REST",
            SurfaceType::Slide => "SLIDE",
            SurfaceType::Stick => "STICK",
            SurfaceType::TriggerEvent => "TRIGGER_EVENT",
        }
    }

    /// Lenient lookup for scripted input: unknown names fall back to `Rest`.
    pub fn resolve(name: &str) -> SurfaceType {
        name.parse().unwrap_or_else(|err: PhysicsError| {
            log::warn!("{err}, falling back to {}", SurfaceType::Rest);
            SurfaceType::Rest
        })
    }

    /// Surfaces that still report contacts on a non-solid box
    pub fn is_trigger_only(&self) -> bool {
        matches!(
            self,
            SurfaceType::TriggerEvent | SurfaceType::DestroyOnHit | SurfaceType::GhostPass
        )
    }
}

impl FromStr for SurfaceType {
    type Err = PhysicsError;

    /// Case-insensitive match on the upper snake case name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        SurfaceType::ALL
            .into_iter()
            .find(|surface| surface.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PhysicsError::UnknownSurfaceType(s.to_string()))
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for SurfaceType {
    fn from(name: String) -> Self {
        SurfaceType::resolve(&name)
    }
}

impl From<SurfaceType> for String {
    fn from(surface: SurfaceType) -> Self {
        surface.name().to_string()
    }
}

/// Outcome of a surface interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceResponse {
    /// The contact was handled
    Resolved,
    /// The surface let the body through; treat as no collision
    Passed,
}

/// Entity removals and trigger callbacks requested during a frame.
///
/// Surfaces never despawn anything directly. The physics system flushes the
/// queue once every body has been updated.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SurfaceEffects {
    removals: Vec<Entity>,
    triggers: Vec<(Entity, Option<Entity>)>,
}

impl SurfaceEffects {
    /// Queue `entity` for removal (once)
    pub fn destroy(&mut self, entity: Entity) {
        if !self.removals.contains(&entity) {
            log::debug!("Queued {entity} for removal");
            self.removals.push(entity);
        }
    }

    /// Queue the trigger callback of `target`, fired by `instigator`
    pub fn trigger(&mut self, target: Entity, instigator: Option<Entity>) {
        log::debug!("Queued trigger on {target}");
        self.triggers.push((target, instigator));
    }

    pub fn removals(&self) -> &[Entity] {
        &self.removals
    }

    pub fn triggers(&self) -> &[(Entity, Option<Entity>)] {
        &self.triggers
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.triggers.is_empty()
    }
}
