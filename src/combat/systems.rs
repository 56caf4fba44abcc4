//! Combat systems - damage handling and health notifications.

use bevy::prelude::*;

use super::components::*;
use crate::core::TickSet;

/// Configure combat systems.
pub fn setup_combat_systems(app: &mut App) {
    app.add_systems(Update, apply_damage.in_set(TickSet::Damage));
}

/// Apply damage to entities and announce the result.
///
/// Survivors get a `HealthChangedEvent`; entities that drop to zero are
/// marked `Dead` and get exactly one `DeathEvent`.
pub fn apply_damage(
    mut commands: Commands,
    mut damage_events: EventReader<DamageEvent>,
    mut health_query: Query<(&mut Health, Option<&Dead>)>,
    mut health_events: EventWriter<HealthChangedEvent>,
    mut death_events: EventWriter<DeathEvent>,
) {
    // Track entities that died this frame to avoid duplicate death events
    let mut died_this_frame = std::collections::HashSet::new();

    for event in damage_events.read() {
        if died_this_frame.contains(&event.target) {
            continue;
        }

        let Ok((mut health, dead)) = health_query.get_mut(event.target) else {
            continue;
        };

        // Skip if already dead (from previous frames)
        if dead.is_some() || health.is_dead() {
            continue;
        }

        let dealt = health.take_damage(event.amount);
        if dealt <= 0.0 {
            continue;
        }

        if health.is_dead() {
            died_this_frame.insert(event.target);
            commands.entity(event.target).insert(Dead);
            death_events.send(DeathEvent {
                entity: event.target,
                killed_by: Some(event.source),
            });
        } else {
            health_events.send(HealthChangedEvent {
                entity: event.target,
                current: health.current,
            });
        }
    }
}
