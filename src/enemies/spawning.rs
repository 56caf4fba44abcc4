//! Enemy spawning.

use bevy::prelude::*;

use super::animation::Animator;
use super::components::{DetectionZone, Enemy};
use super::data::EnemyDefinition;
use super::machine::EnemyStateMachine;
use crate::combat::Health;

/// Spawn an enemy built from `definition` at `position`.
///
/// The detection zone radius is the attack range, so entering the zone is
/// what starts an attack. `seed` drives patrol waypoint selection.
pub fn spawn_enemy(
    commands: &mut Commands,
    definition: &EnemyDefinition,
    position: Vec2,
    seed: u64,
) -> Entity {
    let config = definition.to_config();

    commands
        .spawn((
            Enemy,
            Name::new(definition.name.clone()),
            Transform::from_translation(position.extend(0.0)),
            Health::new(definition.max_health),
            DetectionZone::new(config.attack_range),
            Animator::default(),
            EnemyStateMachine::new(config, seed),
        ))
        .id()
}
