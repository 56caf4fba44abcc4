//! Global events used for cross-system communication.
//!
//! Events allow decoupled systems to communicate. The detection zone reports
//! targets entering and leaving, the combat system turns `DamageEvent`s into
//! health changes and deaths, and the enemy state machines consume all of them
//! in one fixed place per frame.

use bevy::prelude::*;

/// Sent when something should lose health.
///
/// The damage system listens for these events and applies the actual
/// health reduction.
#[derive(Event, Debug, Clone)]
pub struct DamageEvent {
    /// Entity receiving damage
    pub target: Entity,
    /// Entity that caused the damage
    pub source: Entity,
    /// Damage amount
    pub amount: f32,
}

/// Sent after an entity's health was reduced but it is still alive.
#[derive(Event, Debug, Clone)]
pub struct HealthChangedEvent {
    pub entity: Entity,
    /// Health after the change
    pub current: f32,
}

/// Sent when an entity dies (health reaches 0).
#[derive(Event, Debug, Clone)]
pub struct DeathEvent {
    /// Entity that died
    pub entity: Entity,
    /// Entity that killed them (if any)
    pub killed_by: Option<Entity>,
}

/// Detection zone notifications.
#[derive(Event, Debug, Clone, PartialEq)]
pub enum DetectionEvent {
    /// A target walked into the observer's zone.
    Entered { observer: Entity, target: Entity },
    /// A target left the zone, died, or was despawned.
    Exited { observer: Entity, target: Entity },
}

impl DetectionEvent {
    pub fn observer(&self) -> Entity {
        match self {
            DetectionEvent::Entered { observer, .. } | DetectionEvent::Exited { observer, .. } => {
                *observer
            }
        }
    }
}
