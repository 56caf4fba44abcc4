//! Enemies module - enemy state machine, AI systems, data, and spawning.

mod ai;
pub mod animation;
pub mod attack;
mod behaviors;
mod components;
pub mod data;
mod error;
pub mod host;
mod machine;
pub mod patrol;
mod plugin;
pub mod schedule;
mod spawning;

#[cfg(test)]
mod machine_tests;

pub use animation::{AnimTrigger, Animator, VisualSink};
pub use behaviors::{FollowUp, StateBehavior};
pub use components::*;
pub use data::{EnemyDataDir, EnemyDefinition, EnemyRegistry};
pub use error::EnemyDataError;
pub use host::EnemyHost;
pub use machine::{EnemyContext, EnemyEvent, EnemyStateMachine};
pub use plugin::EnemyPlugin;
pub use spawning::spawn_enemy;
