//! The world as seen from one enemy.

use bevy::prelude::*;

use super::animation::{AnimTrigger, VisualSink};
use super::components::TargetRef;
use crate::combat::DamageAcceptor;

/// Everything the state machine needs from the outside, handed in explicitly
/// on every call.
pub trait EnemyHost {
    /// Display name used in log lines.
    fn name(&self) -> &str;

    fn position(&self) -> Vec2;

    /// Move toward `point` by at most `max_distance`, never overshooting.
    fn move_toward(&mut self, point: Vec2, max_distance: f32);

    /// Orient the entity so it looks at `point`.
    fn face(&mut self, point: Vec2);

    /// Position of the target, or `None` if it no longer exists.
    fn target_position(&self, target: TargetRef) -> Option<Vec2>;

    /// The target's damage-acceptor capability, if it currently exposes one.
    fn damage_acceptor(&mut self, target: TargetRef) -> Option<&mut dyn DamageAcceptor>;

    /// Optional animation sink.
    fn visuals(&mut self) -> Option<&mut dyn VisualSink>;

    /// Remove the entity from the per-tick update set.
    fn deactivate(&mut self);
}

/// Issue a trigger, or log `fallback` when there is nothing to animate.
pub(crate) fn cue(host: &mut dyn EnemyHost, trigger: AnimTrigger, fallback: &str) {
    match host.visuals() {
        Some(sink) => sink.trigger(trigger),
        None => info!("{} {}", host.name(), fallback),
    }
}

pub(crate) fn set_speed(host: &mut dyn EnemyHost, value: f32) {
    if let Some(sink) = host.visuals() {
        sink.set_speed_indicator(value);
    }
}

pub(crate) fn reset_trigger(host: &mut dyn EnemyHost, trigger: AnimTrigger) {
    if let Some(sink) = host.visuals() {
        sink.reset_trigger(trigger);
    }
}

/// Rotation about Z that makes a sprite's up axis point along `direction`.
pub fn facing_rotation(direction: Vec2) -> Option<Quat> {
    if direction.length_squared() <= f32::EPSILON {
        return None;
    }
    let angle = direction.y.atan2(direction.x) - std::f32::consts::FRAC_PI_2;
    Some(Quat::from_rotation_z(angle))
}

/// Step from `from` toward `to` by at most `max_distance`.
pub fn step_toward(from: Vec2, to: Vec2, max_distance: f32) -> Vec2 {
    let offset = to - from;
    let distance = offset.length();
    if distance <= max_distance || distance <= f32::EPSILON {
        to
    } else {
        from + offset / distance * max_distance
    }
}
