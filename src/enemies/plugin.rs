//! Enemy plugin - registers all enemy systems.

use bevy::prelude::*;

use super::ai;
use super::data::{load_enemy_definitions, EnemyDataDir, EnemyRegistry};
use crate::core::TickSet;

/// Enemy plugin - handles enemy data, detection, and the behavior state machines.
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<EnemyRegistry>()
            .init_resource::<EnemyDataDir>()
            // Load definitions once at startup
            .add_systems(Startup, load_enemy_definitions)
            // Detection zones report before anything reacts
            .add_systems(Update, ai::detect_targets.in_set(TickSet::Sense))
            // Notifications are turned into transitions before states tick
            .add_systems(Update, ai::route_enemy_events.in_set(TickSet::React))
            .add_systems(Update, ai::tick_enemies.in_set(TickSet::Act));
    }
}
