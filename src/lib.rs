//! Enemy FSM - a reactive enemy behavior controller for 2D games, built on Bevy.
//!
//! Each enemy patrols a set of waypoints, attacks whatever walks into its
//! detection zone, flinches when hit, and dies when its health runs out. One
//! state machine per enemy arbitrates between these, so concurrent
//! notifications (a hit and a death in the same frame, a target leaving while
//! the hit reaction plays) always resolve the same way.
//!
//! # Architecture
//!
//! The crate is organized into plugins, each handling a specific aspect:
//!
//! - **Core**: Global events and the per-frame system ordering
//! - **Combat**: Health, damage application, death notifications
//! - **Enemies**: The state machine, patrol and attack behavior, detection,
//!   enemy data files, and spawning

pub mod combat;
pub mod core;
pub mod enemies;

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

/// Main plugin that adds all sub-plugins.
pub struct EnemyFsmPlugin;

impl Plugin for EnemyFsmPlugin {
    fn build(&self, app: &mut App) {
        app
            // Core systems (must be first)
            .add_plugins(core::CorePlugin)

            // Combat systems
            .add_plugins(combat::CombatPlugin)

            // Enemy systems
            .add_plugins(enemies::EnemyPlugin);
    }
}

/// Build a windowless app that advances simulation time by `step` per update.
pub fn create_headless_app(step: Duration) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(step))
        .add_plugins(EnemyFsmPlugin);
    app
}
