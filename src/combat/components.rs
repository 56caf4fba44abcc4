//! Combat-related components.

use bevy::prelude::*;

// Re-export from core to avoid duplication
pub use crate::core::{DamageEvent, DeathEvent, HealthChangedEvent};

/// Minimal capability a target must expose to receive damage from an enemy attack.
pub trait DamageAcceptor {
    /// Whether damage can currently be applied.
    fn accepts_damage(&self) -> bool;

    fn apply_damage(&mut self, amount: f32);
}

/// Component for entities that can take damage.
#[derive(Component, Debug, Clone)]
pub struct Health {
    pub current: f32,
    pub maximum: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self {
            current: max,
            maximum: max,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.current);
        self.current -= actual;
        actual
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

impl DamageAcceptor for Health {
    fn accepts_damage(&self) -> bool {
        !self.is_dead()
    }

    fn apply_damage(&mut self, amount: f32) {
        self.take_damage(amount);
    }
}

/// Marker component for entities that have died (prevents multiple death events).
#[derive(Component)]
pub struct Dead;
