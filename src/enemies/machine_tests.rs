//! Tests for the enemy state machine against a scripted in-memory host.

use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::*;

use super::animation::{AnimTrigger, VisualSink, SPEED_MOVING};
use super::components::{EnemyConfig, EnemyState, TargetRef};
use super::host::{step_toward, EnemyHost};
use super::machine::{EnemyEvent, EnemyStateMachine};
use crate::combat::DamageAcceptor;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Command {
    Speed(f32),
    Trigger(AnimTrigger),
    Reset(AnimTrigger),
}

#[derive(Default)]
struct RecordingSink {
    commands: Vec<Command>,
}

impl VisualSink for RecordingSink {
    fn set_speed_indicator(&mut self, value: f32) {
        self.commands.push(Command::Speed(value));
    }
    fn trigger(&mut self, trigger: AnimTrigger) {
        self.commands.push(Command::Trigger(trigger));
    }
    fn reset_trigger(&mut self, trigger: AnimTrigger) {
        self.commands.push(Command::Reset(trigger));
    }
}

struct FakeTarget {
    position: Vec2,
    /// Despawned targets still sit in the map but are invisible to the enemy.
    alive: bool,
    accepts: bool,
    damage_taken: f32,
}

impl DamageAcceptor for FakeTarget {
    fn accepts_damage(&self) -> bool {
        self.accepts
    }
    fn apply_damage(&mut self, amount: f32) {
        self.damage_taken += amount;
    }
}

struct TestHost {
    position: Vec2,
    facing: Option<Vec2>,
    targets: HashMap<TargetRef, FakeTarget>,
    sink: Option<RecordingSink>,
    deactivated: bool,
}

impl TestHost {
    fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            facing: None,
            targets: HashMap::new(),
            sink: Some(RecordingSink::default()),
            deactivated: false,
        }
    }

    fn without_visuals() -> Self {
        Self {
            sink: None,
            ..Self::new()
        }
    }

    fn add_target(&mut self, id: u32, position: Vec2) -> TargetRef {
        let target = TargetRef(Entity::from_raw(id));
        self.targets.insert(
            target,
            FakeTarget {
                position,
                alive: true,
                accepts: true,
                damage_taken: 0.0,
            },
        );
        target
    }

    fn damage_taken(&self, target: TargetRef) -> f32 {
        self.targets[&target].damage_taken
    }

    fn commands(&self) -> &[Command] {
        match &self.sink {
            Some(sink) => &sink.commands,
            None => &[],
        }
    }

    fn count(&self, command: Command) -> usize {
        self.commands().iter().filter(|c| **c == command).count()
    }

    /// Patrol is the only state that sets the "moving" indicator.
    fn patrol_entries(&self) -> usize {
        self.count(Command::Speed(SPEED_MOVING))
    }
}

impl EnemyHost for TestHost {
    fn name(&self) -> &str {
        "test-enemy"
    }
    fn position(&self) -> Vec2 {
        self.position
    }
    fn move_toward(&mut self, point: Vec2, max_distance: f32) {
        self.position = step_toward(self.position, point, max_distance);
    }
    fn face(&mut self, point: Vec2) {
        self.facing = Some(point);
    }
    fn target_position(&self, target: TargetRef) -> Option<Vec2> {
        self.targets
            .get(&target)
            .filter(|t| t.alive)
            .map(|t| t.position)
    }
    fn damage_acceptor(&mut self, target: TargetRef) -> Option<&mut dyn DamageAcceptor> {
        self.targets
            .get_mut(&target)
            .filter(|t| t.alive)
            .map(|t| t as &mut dyn DamageAcceptor)
    }
    fn visuals(&mut self) -> Option<&mut dyn VisualSink> {
        self.sink.as_mut().map(|sink| sink as &mut dyn VisualSink)
    }
    fn deactivate(&mut self) {
        self.deactivated = true;
    }
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn config() -> EnemyConfig {
    EnemyConfig {
        move_speed: 2.0,
        attack_cooldown: 1.0,
        damage: 10.0,
        hit_reaction_delay: 1.0,
        waypoints: vec![Vec2::new(4.0, 0.0), Vec2::new(0.0, 4.0), Vec2::new(-4.0, 0.0)],
        ..default()
    }
}

fn patrolling(host: &mut TestHost) -> EnemyStateMachine {
    let mut machine = EnemyStateMachine::new(config(), 11);
    machine.start(host);
    assert_eq!(machine.state(), EnemyState::Patrol);
    machine
}

#[test]
fn starts_in_startup_then_patrols() {
    let mut host = TestHost::new();
    let mut machine = EnemyStateMachine::new(config(), 1);
    assert_eq!(machine.state(), EnemyState::Startup);

    machine.start(&mut host);
    assert_eq!(machine.state(), EnemyState::Patrol);
    assert!(!machine.is_locked());
    assert_eq!(host.patrol_entries(), 1);

    // A second start is a no-op.
    machine.start(&mut host);
    assert_eq!(host.patrol_entries(), 1);
}

#[test]
fn requesting_the_active_state_runs_no_hooks() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::new(0.5, 0.0));
    let mut machine = patrolling(&mut host);

    let before = host.commands().len();
    assert!(!machine.request_transition(&mut host, EnemyState::Patrol, None));
    assert_eq!(host.commands().len(), before);

    machine.request_transition(&mut host, EnemyState::Attack, Some(target));
    let before = host.commands().len();
    assert!(!machine.request_transition(&mut host, EnemyState::Attack, Some(target)));
    assert_eq!(host.commands().len(), before);
    assert_eq!(host.damage_taken(target), 10.0);

    machine.request_transition(&mut host, EnemyState::Dead, None);
    let before = host.commands().len();
    assert!(!machine.request_transition(&mut host, EnemyState::Dead, None));
    assert_eq!(host.commands().len(), before);
}

#[test]
fn lock_blocks_everything_but_death() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(40.0));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert!(machine.is_locked());

    for state in [EnemyState::Patrol, EnemyState::Attack, EnemyState::Startup] {
        assert!(!machine.request_transition(&mut host, state, Some(target)));
        assert_eq!(machine.state(), EnemyState::TakeDamage);
    }

    assert!(machine.request_transition(&mut host, EnemyState::Dead, None));
    assert_eq!(machine.state(), EnemyState::Dead);
}

#[test]
fn dead_is_absorbing() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::Died);
    assert_eq!(machine.state(), EnemyState::Dead);
    assert!(host.deactivated);
    assert!(!machine.is_active());

    for state in [
        EnemyState::Startup,
        EnemyState::Patrol,
        EnemyState::Attack,
        EnemyState::TakeDamage,
        EnemyState::Dead,
    ] {
        assert!(!machine.request_transition(&mut host, state, Some(target)));
        assert_eq!(machine.state(), EnemyState::Dead);
    }
}

#[test]
fn death_resets_triggers_and_plays_death_cue() {
    let mut host = TestHost::new();
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::Died);

    let tail = &host.commands()[host.commands().len() - 4..];
    assert_eq!(
        tail,
        &[
            Command::Reset(AnimTrigger::TakeDamage),
            Command::Reset(AnimTrigger::Attack),
            Command::Speed(0.0),
            Command::Trigger(AnimTrigger::Dead),
        ]
    );
}

#[test]
fn attack_strikes_on_entry_then_every_cooldown() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::new(0.0, 0.5));
    let mut machine = patrolling(&mut host);

    machine.request_transition(&mut host, EnemyState::Attack, Some(target));
    assert_eq!(host.damage_taken(target), 10.0);
    assert_eq!(host.facing, Some(Vec2::new(0.0, 0.5)));

    machine.tick(&mut host, ms(500));
    assert_eq!(host.damage_taken(target), 10.0);
    machine.tick(&mut host, ms(500));
    assert_eq!(host.damage_taken(target), 20.0);
    machine.tick(&mut host, ms(2000));
    assert_eq!(host.damage_taken(target), 40.0);
    assert_eq!(machine.attack_loop().strikes(), 4);
    assert_eq!(host.count(Command::Trigger(AnimTrigger::Attack)), 4);
}

#[test]
fn stale_target_skips_damage_but_keeps_swinging() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.request_transition(&mut host, EnemyState::Attack, Some(target));
    host.targets.get_mut(&target).unwrap().alive = false;

    machine.tick(&mut host, ms(3000));
    assert_eq!(host.damage_taken(target), 10.0);
    assert_eq!(host.count(Command::Trigger(AnimTrigger::Attack)), 4);
    assert!(machine.attack_loop().is_running());
    assert_eq!(machine.state(), EnemyState::Attack);
}

#[test]
fn target_refusing_damage_is_not_hit() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    host.targets.get_mut(&target).unwrap().accepts = false;
    let mut machine = patrolling(&mut host);

    machine.request_transition(&mut host, EnemyState::Attack, Some(target));
    machine.tick(&mut host, ms(1000));
    assert_eq!(host.damage_taken(target), 0.0);
    assert_eq!(machine.attack_loop().strikes(), 2);
}

#[test]
fn reentering_attack_keeps_one_loop_on_latest_target() {
    let mut host = TestHost::new();
    let first = host.add_target(1, Vec2::X);
    let second = host.add_target(2, Vec2::Y);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::TargetEntered(first));
    machine.handle_event(&mut host, EnemyEvent::TargetExited(first));
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(second));

    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(machine.target(), Some(second));
    assert_eq!(machine.attack_loop().target(), Some(second));

    machine.tick(&mut host, ms(3000));
    assert_eq!(host.damage_taken(first), 10.0);
    assert_eq!(host.damage_taken(second), 40.0);
}

#[test]
fn leaving_attack_cancels_loop_and_clears_target() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));
    machine.handle_event(&mut host, EnemyEvent::TargetExited(target));

    assert_eq!(machine.state(), EnemyState::Patrol);
    assert_eq!(machine.target(), None);
    assert!(!machine.attack_loop().is_running());

    machine.tick(&mut host, ms(5000));
    assert_eq!(host.damage_taken(target), 10.0);
}

#[test]
fn attack_without_target_stands_still() {
    let mut host = TestHost::new();
    let mut machine = patrolling(&mut host);

    assert!(machine.request_transition(&mut host, EnemyState::Attack, None));
    assert!(!machine.attack_loop().is_running());

    let position = host.position;
    machine.tick(&mut host, ms(1000));
    assert_eq!(host.position, position);
}

#[test]
fn patrol_walks_toward_active_waypoint() {
    let mut host = TestHost::new();
    let mut machine = patrolling(&mut host);
    let waypoint = machine.config().waypoints[0];

    machine.tick(&mut host, ms(500));
    assert_eq!(host.position, Vec2::new(1.0, 0.0));
    assert_eq!(host.facing, Some(waypoint));

    machine.tick(&mut host, ms(1500));
    assert_eq!(host.position, waypoint);
    assert_ne!(machine.patrol_index(), 0);
}

#[test]
fn exited_state_gets_no_tick_in_the_same_frame() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::new(0.0, -1.0));
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));
    machine.tick(&mut host, ms(500));

    // Patrol would have moved toward (4, 0).
    assert_eq!(host.position, Vec2::ZERO);
    assert_eq!(host.facing, Some(Vec2::new(0.0, -1.0)));
}

#[test]
fn scenario_b_detection_starts_attack_with_immediate_hit() {
    let mut host = TestHost::new();
    let target = host.add_target(7, Vec2::new(0.8, 0.0));
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(machine.target(), Some(target));
    assert!(machine.attack_loop().is_running());
    assert_eq!(host.damage_taken(target), 10.0);
}

#[test]
fn scenario_c_hit_during_attack_returns_to_same_target() {
    let mut host = TestHost::new();
    let target = host.add_target(7, Vec2::X);
    let mut machine = patrolling(&mut host);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(30.0));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert!(machine.is_locked());
    assert!(!machine.attack_loop().is_running());

    machine.tick(&mut host, ms(500));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert_eq!(host.damage_taken(target), 10.0);

    machine.tick(&mut host, ms(500));
    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(machine.target(), Some(target));
    assert!(!machine.is_locked());
    // Re-entering Attack strikes immediately.
    assert_eq!(host.damage_taken(target), 20.0);
}

#[test]
fn hit_without_known_target_returns_to_patrol() {
    let mut host = TestHost::new();
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(30.0));
    assert_eq!(host.count(Command::Trigger(AnimTrigger::TakeDamage)), 1);

    machine.tick(&mut host, ms(1000));
    assert_eq!(machine.state(), EnemyState::Patrol);
    assert!(!machine.is_locked());
    assert_eq!(host.patrol_entries(), 2);
}

#[test]
fn scenario_d_dead_ignores_detection() {
    let mut host = TestHost::new();
    let target = host.add_target(3, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::Died);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    assert_eq!(machine.state(), EnemyState::Dead);
    assert_eq!(host.damage_taken(target), 0.0);

    let position = host.position;
    machine.tick(&mut host, ms(1000));
    assert_eq!(host.position, position);
}

#[test]
fn scenario_e_second_hit_restarts_the_reaction_window() {
    let mut host = TestHost::new();
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(40.0));
    machine.tick(&mut host, ms(600));
    machine.handle_event(&mut host, EnemyEvent::HealthChanged(30.0));
    assert_eq!(host.count(Command::Trigger(AnimTrigger::TakeDamage)), 2);

    // One second after the first hit, but only 0.6s after the second.
    machine.tick(&mut host, ms(600));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert!(machine.is_locked());

    machine.tick(&mut host, ms(400));
    assert_eq!(machine.state(), EnemyState::Patrol);

    machine.tick(&mut host, ms(5000));
    assert_eq!(host.patrol_entries(), 2);
}

#[test]
fn second_hit_during_attack_returns_once_to_the_same_target() {
    let mut host = TestHost::new();
    let target = host.add_target(4, Vec2::X);
    let mut machine = patrolling(&mut host);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(40.0));
    machine.tick(&mut host, ms(600));
    machine.handle_event(&mut host, EnemyEvent::HealthChanged(30.0));

    machine.tick(&mut host, ms(600));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert_eq!(host.damage_taken(target), 10.0);

    machine.tick(&mut host, ms(400));
    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(machine.target(), Some(target));
    assert!(!machine.is_locked());
    assert!(!machine.reaction_pending());
    assert_eq!(host.damage_taken(target), 20.0);

    // Only the cadence of the one restarted loop from here on.
    machine.tick(&mut host, ms(3000));
    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(host.damage_taken(target), 50.0);
    assert_eq!(host.count(Command::Trigger(AnimTrigger::Attack)), 5);
    assert_eq!(host.patrol_entries(), 1);
}

#[test]
fn target_leaving_during_hit_reaction_ends_in_patrol() {
    let mut host = TestHost::new();
    let target = host.add_target(2, Vec2::X);
    let mut machine = patrolling(&mut host);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(25.0));
    machine.handle_event(&mut host, EnemyEvent::TargetExited(target));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert!(machine.is_locked());

    machine.tick(&mut host, ms(1000));
    assert_eq!(machine.state(), EnemyState::Patrol);
    assert_eq!(machine.target(), None);

    machine.tick(&mut host, ms(5000));
    assert_eq!(host.damage_taken(target), 10.0);
}

#[test]
fn target_arriving_during_hit_reaction_is_attacked_afterwards() {
    let mut host = TestHost::new();
    let target = host.add_target(6, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(25.0));
    machine.tick(&mut host, ms(300));
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));
    assert_eq!(machine.state(), EnemyState::TakeDamage);
    assert_eq!(host.damage_taken(target), 0.0);

    // The window still ends one second after the hit.
    machine.tick(&mut host, ms(700));
    assert_eq!(machine.state(), EnemyState::Attack);
    assert_eq!(machine.target(), Some(target));
    assert_eq!(host.damage_taken(target), 10.0);
}

#[test]
fn zero_cooldown_strikes_every_tick() {
    let mut host = TestHost::new();
    let target = host.add_target(8, Vec2::X);
    let mut machine = EnemyStateMachine::new(
        EnemyConfig {
            attack_cooldown: 0.0,
            ..config()
        },
        3,
    );
    machine.start(&mut host);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    for _ in 0..5 {
        machine.tick(&mut host, ms(100));
    }

    assert!(machine.attack_loop().is_running());
    assert_eq!(machine.attack_loop().strikes(), 6);
    assert_eq!(host.damage_taken(target), 60.0);
}

#[test]
fn death_wins_over_pending_hit_reaction() {
    let mut host = TestHost::new();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);
    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));

    machine.handle_event(&mut host, EnemyEvent::HealthChanged(5.0));
    assert!(machine.reaction_pending());
    machine.handle_event(&mut host, EnemyEvent::Died);

    assert_eq!(machine.state(), EnemyState::Dead);
    assert!(!machine.reaction_pending());

    machine.tick(&mut host, ms(2000));
    assert_eq!(machine.state(), EnemyState::Dead);
    assert!(machine.is_locked());
    assert_eq!(host.damage_taken(target), 10.0);
}

#[test]
fn missing_visuals_fall_back_to_logging() {
    let mut host = TestHost::without_visuals();
    let target = host.add_target(1, Vec2::X);
    let mut machine = patrolling(&mut host);

    machine.handle_event(&mut host, EnemyEvent::TargetEntered(target));
    machine.handle_event(&mut host, EnemyEvent::HealthChanged(20.0));
    machine.tick(&mut host, ms(1000));
    machine.handle_event(&mut host, EnemyEvent::Died);

    assert_eq!(machine.state(), EnemyState::Dead);
    assert_eq!(host.damage_taken(target), 20.0);
    assert!(host.commands().is_empty());
}
