//! Core plugin that registers global events and the per-frame ordering.

use bevy::prelude::*;

use super::events::*;

/// Per-frame ordering of simulation work.
///
/// Transition requests coming from detection and health events are always
/// processed before any state runs its per-tick logic.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// Detection zones report targets entering and leaving.
    Sense,
    /// Pending damage is applied and health notifications are sent.
    Damage,
    /// Notifications are funneled into the state machines.
    React,
    /// Active states run their timers and per-tick behavior.
    Act,
}

/// Core plugin - must be added first as other plugins depend on it.
///
/// This plugin sets up:
/// - Global events (DamageEvent, DeathEvent, etc.)
/// - The `TickSet` chain every gameplay system slots into
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app
            // Register global events
            .add_event::<DamageEvent>()
            .add_event::<HealthChangedEvent>()
            .add_event::<DeathEvent>()
            .add_event::<DetectionEvent>()

            // System ordering
            .configure_sets(
                Update,
                (TickSet::Sense, TickSet::Damage, TickSet::React, TickSet::Act).chain(),
            );
    }
}
