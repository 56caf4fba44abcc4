//! Combat module - health, damage application, and death notifications.

mod components;
mod plugin;
mod systems;

pub use components::*;
pub use plugin::CombatPlugin;
pub use systems::apply_damage;
