//! Enemy FSM - headless demo.
//!
//! Spawns one enemy on its patrol route and a scripted player that walks
//! through it, lands a couple of hits, and finally kills it. State changes are
//! logged as they happen.

use std::collections::HashMap;
use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use enemy_fsm::combat::{DamageEvent, DeathEvent, Health};
use enemy_fsm::enemies::data::load_enemy_definitions;
use enemy_fsm::enemies::{spawn_enemy, Enemy, EnemyDefinition, EnemyRegistry, EnemyStateMachine, Player};

/// Simulation step per update.
const STEP: Duration = Duration::from_millis(50);
/// Updates to run before exiting.
const FRAMES: u32 = 600;

/// Scripted player: walks right and strikes the enemy at fixed times.
#[derive(Component)]
struct DemoPlayer {
    speed: f32,
    /// (time in seconds, damage) still to be dealt.
    strikes: Vec<(f32, f32)>,
}

fn main() {
    let mut app = enemy_fsm::create_headless_app(STEP);
    app.add_plugins(LogPlugin::default())
        .add_systems(Startup, setup_demo.after(load_enemy_definitions))
        .add_systems(Update, (drive_player, report_state_changes, report_deaths));

    for _ in 0..FRAMES {
        app.update();
    }

    info!("Demo finished after {} frames", FRAMES);
}

fn setup_demo(mut commands: Commands, registry: Res<EnemyRegistry>) {
    let definition = registry.get("grunt").cloned().unwrap_or_else(|| {
        warn!("No 'grunt' definition found, using built-in stats");
        EnemyDefinition {
            name: "Grunt".to_string(),
            max_health: 30.0,
            move_speed: 2.0,
            attack_range: 1.0,
            attack_cooldown: 1.0,
            damage: 10.0,
            hit_reaction_delay: None,
            waypoints: vec![(-3.0, 0.0), (3.0, 0.0), (0.0, 3.0)],
        }
    });

    spawn_enemy(&mut commands, &definition, Vec2::ZERO, 42);

    commands.spawn((
        Player,
        Name::new("Player"),
        Transform::from_xyz(-8.0, 0.0, 0.0),
        Health::new(100.0),
        DemoPlayer {
            speed: 0.8,
            strikes: vec![(12.0, 12.0), (12.5, 12.0), (24.0, 40.0)],
        },
    ));
}

fn drive_player(
    time: Res<Time>,
    mut players: Query<(Entity, &mut Transform, &mut DemoPlayer, &Health), Without<Enemy>>,
    enemies: Query<Entity, With<Enemy>>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let now = time.elapsed_secs();

    for (player, mut transform, mut script, health) in players.iter_mut() {
        if health.is_dead() {
            continue;
        }
        transform.translation.x += script.speed * time.delta_secs();

        let due = script.strikes.iter().take_while(|(at, _)| *at <= now).count();
        for (_, amount) in script.strikes.drain(..due) {
            for enemy in enemies.iter() {
                damage_events.send(DamageEvent {
                    target: enemy,
                    source: player,
                    amount,
                });
            }
        }
    }
}

fn report_state_changes(
    time: Res<Time>,
    enemies: Query<(Entity, &EnemyStateMachine, &Transform)>,
    players: Query<&Health, With<Player>>,
    mut last: Local<HashMap<Entity, String>>,
) {
    for (entity, machine, transform) in enemies.iter() {
        let state = format!("{:?}", machine.state());
        if last.get(&entity) != Some(&state) {
            let (current, maximum) = players
                .iter()
                .next()
                .map_or((0.0, 0.0), |h| (h.current, h.maximum));
            info!(
                "[{:6.2}s] enemy at ({:.1}, {:.1}) is now {} (player health {}/{})",
                time.elapsed_secs(),
                transform.translation.x,
                transform.translation.y,
                state,
                current,
                maximum
            );
            last.insert(entity, state);
        }
    }
}

fn report_deaths(mut death_events: EventReader<DeathEvent>, names: Query<&Name>) {
    for event in death_events.read() {
        let victim = names.get(event.entity).map_or("something", |n| n.as_str());
        match event.killed_by.and_then(|killer| names.get(killer).ok()) {
            Some(killer) => info!("{} was killed by {}", victim, killer.as_str()),
            None => info!("{} died", victim),
        }
    }
}
