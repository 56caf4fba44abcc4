//! Enemy-related components and shared data.

use bevy::prelude::*;

/// Distance under which a patrol waypoint counts as reached.
pub const ARRIVAL_THRESHOLD: f32 = 0.1;

/// How long the hit reaction locks the state machine, in seconds.
pub const DEFAULT_HIT_REACTION_DELAY: f32 = 1.0;

/// Marker component for all enemies.
#[derive(Component)]
pub struct Enemy;

/// Marker for entities enemies can detect and attack.
#[derive(Component)]
pub struct Player;

/// Inserted when an enemy dies; the AI stops ticking it.
#[derive(Component)]
pub struct Inactive;

/// Behavior state of an enemy.
#[derive(Default, PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum EnemyState {
    /// Freshly created, nothing has run yet.
    #[default]
    Startup,
    /// Walking between waypoints.
    Patrol,
    /// Repeatedly hitting the current target.
    Attack,
    /// Playing the hit reaction; only death can interrupt it.
    TakeDamage,
    /// Terminal.
    Dead,
}

/// Non-owning handle to another entity.
///
/// The target may be despawned at any time by unrelated systems, so every use
/// goes back through the host to check it is still alive.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TargetRef(pub Entity);

impl TargetRef {
    pub fn entity(self) -> Entity {
        self.0
    }
}

impl From<Entity> for TargetRef {
    fn from(entity: Entity) -> Self {
        Self(entity)
    }
}

/// Tuning values for one enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyConfig {
    pub move_speed: f32,
    pub attack_range: f32,
    /// Seconds between two attacks.
    pub attack_cooldown: f32,
    pub damage: f32,
    /// Seconds the hit reaction holds the transition lock.
    pub hit_reaction_delay: f32,
    pub waypoints: Vec<Vec2>,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            move_speed: 2.0,
            attack_range: 1.0,
            attack_cooldown: 1.0,
            damage: 10.0,
            hit_reaction_delay: DEFAULT_HIT_REACTION_DELAY,
            waypoints: Vec::new(),
        }
    }
}

/// Distance-based detection zone around an enemy.
#[derive(Component, Debug, Default)]
pub struct DetectionZone {
    pub radius: f32,
    /// Targets currently inside, in arrival order.
    pub inside: Vec<Entity>,
}

impl DetectionZone {
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            inside: Vec::new(),
        }
    }
}
