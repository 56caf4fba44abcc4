//! Repeating attack against a single target.

use std::time::Duration;

use bevy::prelude::*;

use super::animation::AnimTrigger;
use super::components::TargetRef;
use super::host::{cue, EnemyHost};
use super::schedule::ScheduledTask;

/// Hits one target every `cooldown` until cancelled.
///
/// The loop never stops on its own. Whether the target died or walked away is
/// for the state machine to decide.
#[derive(Debug, Default)]
pub struct AttackLoop {
    target: Option<TargetRef>,
    damage: f32,
    task: ScheduledTask,
    /// Firings since the last start.
    strikes: u32,
}

impl AttackLoop {
    /// Cancel any running loop, then face `target` and strike immediately.
    pub fn start(
        &mut self,
        host: &mut dyn EnemyHost,
        target: TargetRef,
        cooldown: f32,
        damage: f32,
    ) {
        self.cancel();

        self.target = Some(target);
        self.damage = damage;
        self.task.arm_repeating(Duration::from_secs_f32(cooldown.max(0.0)));

        if let Some(point) = host.target_position(target) {
            host.face(point);
        }
        self.strike(host);
    }

    /// Stop the loop. Safe to call when nothing is running.
    pub fn cancel(&mut self) {
        self.task.cancel();
        self.target = None;
        self.strikes = 0;
    }

    pub fn is_running(&self) -> bool {
        self.task.is_armed()
    }

    /// Target the running loop is bound to.
    pub fn target(&self) -> Option<TargetRef> {
        self.target
    }

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    /// Advance the cooldown and strike once per elapsed period.
    pub fn advance(&mut self, host: &mut dyn EnemyHost, delta: Duration) {
        let fired = self.task.advance(delta);
        for _ in 0..fired {
            self.strike(host);
        }
    }

    fn strike(&mut self, host: &mut dyn EnemyHost) {
        let Some(target) = self.target else {
            return;
        };
        self.strikes += 1;

        let hit = match host.damage_acceptor(target) {
            Some(acceptor) if acceptor.accepts_damage() => {
                acceptor.apply_damage(self.damage);
                true
            }
            _ => false,
        };
        if !hit {
            debug!("{}: target {:?} cannot take damage, skipping hit", host.name(), target);
        }

        cue(host, AnimTrigger::Attack, "- is attacking!");
    }
}
