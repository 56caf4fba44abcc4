//! Enemy AI systems.
//!
//! The state machines never touch the ECS world directly. Each system wraps
//! one enemy's components in an `EcsHost` and hands that to the machine.

use bevy::prelude::*;
use std::collections::HashMap;

use super::animation::{Animator, VisualSink};
use super::components::{DetectionZone, Enemy, EnemyState, Inactive, Player, TargetRef};
use super::host::{facing_rotation, step_toward, EnemyHost};
use super::machine::{EnemyEvent, EnemyStateMachine};
use crate::combat::{DamageAcceptor, DamageEvent, DeathEvent, Health, HealthChangedEvent};
use crate::core::DetectionEvent;

type EnemyQuery<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static mut EnemyStateMachine,
        &'static mut Transform,
        Option<&'static mut Animator>,
        Option<&'static Name>,
    ),
    (With<Enemy>, Without<Inactive>),
>;

type TargetQuery<'w, 's> =
    Query<'w, 's, (&'static Transform, Option<&'static Health>), (With<Player>, Without<Enemy>)>;

/// Damage acceptor handed to the attack loop; hits become `DamageEvent`s so
/// the combat system stays the only writer of `Health`.
struct DamageOutbox {
    source: Entity,
    target: Option<Entity>,
    sent: Vec<DamageEvent>,
}

impl DamageAcceptor for DamageOutbox {
    fn accepts_damage(&self) -> bool {
        self.target.is_some()
    }

    fn apply_damage(&mut self, amount: f32) {
        if let Some(target) = self.target {
            self.sent.push(DamageEvent {
                target,
                source: self.source,
                amount,
            });
        }
    }
}

/// One enemy's view of the ECS world for the duration of a system call.
struct EcsHost<'a, 'w, 's> {
    name: String,
    transform: &'a mut Transform,
    animator: Option<&'a mut Animator>,
    targets: &'a TargetQuery<'w, 's>,
    outbox: DamageOutbox,
    deactivated: bool,
}

impl EnemyHost for EcsHost<'_, '_, '_> {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec2 {
        self.transform.translation.truncate()
    }

    fn move_toward(&mut self, point: Vec2, max_distance: f32) {
        let next = step_toward(self.position(), point, max_distance);
        self.transform.translation.x = next.x;
        self.transform.translation.y = next.y;
    }

    fn face(&mut self, point: Vec2) {
        if let Some(rotation) = facing_rotation(point - self.position()) {
            self.transform.rotation = rotation;
        }
    }

    fn target_position(&self, target: TargetRef) -> Option<Vec2> {
        let (transform, health) = self.targets.get(target.entity()).ok()?;
        if health.is_some_and(Health::is_dead) {
            return None;
        }
        Some(transform.translation.truncate())
    }

    fn damage_acceptor(&mut self, target: TargetRef) -> Option<&mut dyn DamageAcceptor> {
        let alive = matches!(
            self.targets.get(target.entity()),
            Ok((_, Some(health))) if !health.is_dead()
        );
        if !alive {
            return None;
        }
        self.outbox.target = Some(target.entity());
        Some(&mut self.outbox as &mut dyn DamageAcceptor)
    }

    fn visuals(&mut self) -> Option<&mut dyn VisualSink> {
        self.animator
            .as_deref_mut()
            .map(|animator| animator as &mut dyn VisualSink)
    }

    fn deactivate(&mut self) {
        self.deactivated = true;
    }
}

/// Build a host for every active enemy, run `drive`, then flush side effects.
fn drive_enemies(
    commands: &mut Commands,
    enemies: &mut EnemyQuery,
    targets: &TargetQuery,
    damage_events: &mut EventWriter<DamageEvent>,
    mut drive: impl FnMut(Entity, &mut EnemyStateMachine, &mut dyn EnemyHost),
) {
    for (entity, mut machine, mut transform, mut animator, name) in enemies.iter_mut() {
        let mut host = EcsHost {
            name: name.map_or_else(|| format!("enemy {entity:?}"), |n| n.as_str().to_string()),
            transform: &mut *transform,
            animator: animator.as_deref_mut(),
            targets,
            outbox: DamageOutbox {
                source: entity,
                target: None,
                sent: Vec::new(),
            },
            deactivated: false,
        };

        drive(entity, &mut *machine, &mut host as &mut dyn EnemyHost);

        for event in host.outbox.sent.drain(..) {
            damage_events.send(event);
        }
        if host.deactivated {
            commands.entity(entity).insert(Inactive);
        }
    }
}

/// Report targets entering and leaving each enemy's detection zone.
///
/// Dead or despawned targets count as having left.
pub fn detect_targets(
    mut zones: Query<(Entity, &Transform, &mut DetectionZone), (With<Enemy>, Without<Inactive>)>,
    targets: Query<(Entity, &Transform, Option<&Health>), (With<Player>, Without<Enemy>)>,
    mut detection_events: EventWriter<DetectionEvent>,
) {
    for (observer, transform, mut zone) in zones.iter_mut() {
        let origin = transform.translation.truncate();
        let radius = zone.radius;
        let in_range = |target: Entity| {
            targets.get(target).is_ok_and(|(_, target_transform, health)| {
                !health.is_some_and(Health::is_dead)
                    && origin.distance(target_transform.translation.truncate()) <= radius
            })
        };

        let mut left = Vec::new();
        zone.inside.retain(|&target| {
            let keep = in_range(target);
            if !keep {
                left.push(target);
            }
            keep
        });
        for target in left {
            detection_events.send(DetectionEvent::Exited { observer, target });
        }

        for (target, _, _) in targets.iter() {
            if !zone.inside.contains(&target) && in_range(target) {
                zone.inside.push(target);
                detection_events.send(DetectionEvent::Entered { observer, target });
            }
        }
    }
}

/// Funnel this frame's notifications into the state machines.
///
/// Per enemy the order is fixed: detection, then health changes, then death,
/// so death always has the last word.
pub fn route_enemy_events(
    mut commands: Commands,
    mut enemies: EnemyQuery,
    targets: TargetQuery,
    mut detection_events: EventReader<DetectionEvent>,
    mut health_events: EventReader<HealthChangedEvent>,
    mut death_events: EventReader<DeathEvent>,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let mut inbox: HashMap<Entity, Vec<EnemyEvent>> = HashMap::new();

    for event in detection_events.read() {
        let routed = match *event {
            DetectionEvent::Entered { target, .. } => EnemyEvent::TargetEntered(target.into()),
            DetectionEvent::Exited { target, .. } => EnemyEvent::TargetExited(target.into()),
        };
        inbox.entry(event.observer()).or_default().push(routed);
    }
    for event in health_events.read() {
        inbox
            .entry(event.entity)
            .or_default()
            .push(EnemyEvent::HealthChanged(event.current));
    }
    for event in death_events.read() {
        inbox.entry(event.entity).or_default().push(EnemyEvent::Died);
    }

    drive_enemies(
        &mut commands,
        &mut enemies,
        &targets,
        &mut damage_events,
        |entity, machine, host| {
            if machine.state() == EnemyState::Startup {
                machine.start(host);
            }
            for event in inbox.remove(&entity).into_iter().flatten() {
                machine.handle_event(host, event);
            }
        },
    );
}

/// Advance timers and run per-tick behavior for every live enemy.
pub fn tick_enemies(
    mut commands: Commands,
    time: Res<Time>,
    mut enemies: EnemyQuery,
    targets: TargetQuery,
    mut damage_events: EventWriter<DamageEvent>,
) {
    let delta = time.delta();
    drive_enemies(
        &mut commands,
        &mut enemies,
        &targets,
        &mut damage_events,
        |_, machine, host| machine.tick(host, delta),
    );
}
