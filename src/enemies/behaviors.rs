//! Per-state behavior: what happens on entering, leaving, and ticking a state.

use std::time::Duration;

use bevy::prelude::*;

use super::animation::{AnimTrigger, SPEED_BUSY, SPEED_MOVING, SPEED_STOPPED};
use super::components::{EnemyState, TargetRef};
use super::host::{cue, reset_trigger, set_speed, EnemyHost};
use super::machine::EnemyContext;
use super::schedule::ScheduledTask;

/// Hooks every enemy state implements.
pub trait StateBehavior: Sync {
    fn on_enter(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, target: Option<TargetRef>);

    fn on_exit(&self, _ctx: &mut EnemyContext, _host: &mut dyn EnemyHost) {}

    fn on_tick(&self, _ctx: &mut EnemyContext, _host: &mut dyn EnemyHost, _delta: Duration) {}
}

/// Dispatch table from state tag to behavior.
pub fn behavior_for(state: EnemyState) -> &'static dyn StateBehavior {
    match state {
        EnemyState::Startup => &StartupBehavior,
        EnemyState::Patrol => &PatrolBehavior,
        EnemyState::Attack => &AttackBehavior,
        EnemyState::TakeDamage => &TakeDamageBehavior,
        EnemyState::Dead => &DeadBehavior,
    }
}

/// Transition the hit reaction requests once its delay has run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FollowUp {
    pub state: EnemyState,
    pub target: Option<TargetRef>,
}

/// Pending end of a hit reaction.
#[derive(Debug, Default)]
pub struct HitReaction {
    task: ScheduledTask,
    follow_up: Option<FollowUp>,
}

impl HitReaction {
    /// (Re)start the reaction window. Anything pending is dropped first.
    fn arm(&mut self, follow_up: FollowUp, delay: f32) {
        self.cancel();
        self.follow_up = Some(follow_up);
        self.task.arm_once(Duration::from_secs_f32(delay.max(0.0)));
    }

    pub fn cancel(&mut self) {
        self.task.cancel();
        self.follow_up = None;
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_armed()
    }

    pub fn follow_up(&self) -> Option<FollowUp> {
        self.follow_up
    }

    /// Replace the pending follow-up. The delay keeps running.
    pub fn redirect(&mut self, follow_up: FollowUp) {
        if self.is_pending() {
            self.follow_up = Some(follow_up);
        }
    }

    /// Returns the follow-up once the delay has elapsed.
    pub fn advance(&mut self, delta: Duration) -> Option<FollowUp> {
        if self.task.advance(delta) == 0 {
            return None;
        }
        self.follow_up.take()
    }
}

struct StartupBehavior;

impl StateBehavior for StartupBehavior {
    fn on_enter(&self, _ctx: &mut EnemyContext, _host: &mut dyn EnemyHost, _target: Option<TargetRef>) {}
}

struct PatrolBehavior;

impl StateBehavior for PatrolBehavior {
    fn on_enter(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, _target: Option<TargetRef>) {
        ctx.transition_locked = false;
        set_speed(host, SPEED_MOVING);
        reset_trigger(host, AnimTrigger::Attack);
    }

    fn on_tick(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, delta: Duration) {
        let reached = ctx.patrol.step(
            host,
            &ctx.config.waypoints,
            ctx.config.move_speed,
            delta.as_secs_f32(),
            &mut ctx.rng,
        );
        if let Some(next) = reached {
            debug!("{}: waypoint reached, heading to #{}", host.name(), next);
        }
    }
}

struct AttackBehavior;

impl StateBehavior for AttackBehavior {
    fn on_enter(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, target: Option<TargetRef>) {
        set_speed(host, SPEED_BUSY);

        // Only one loop per entry, bound to the latest target.
        ctx.attack.cancel();
        ctx.target = target;

        match target {
            Some(target) => {
                let (cooldown, damage) = (ctx.config.attack_cooldown, ctx.config.damage);
                ctx.attack.start(host, target, cooldown, damage);
            }
            None => warn!("{}: entered Attack without a target, standing still", host.name()),
        }
    }

    fn on_exit(&self, ctx: &mut EnemyContext, _host: &mut dyn EnemyHost) {
        ctx.attack.cancel();
    }

    fn on_tick(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, _delta: Duration) {
        // Keep looking at the target while it exists; the cadence lives in the loop.
        if let Some(point) = ctx.target.and_then(|target| host.target_position(target)) {
            host.face(point);
        }
    }
}

pub(super) struct TakeDamageBehavior;

impl TakeDamageBehavior {
    /// Another hit landed during the reaction: replay the cue and start the
    /// window over instead of stacking a second follow-up.
    pub(super) fn restart(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost) {
        let target = ctx.reaction.follow_up().and_then(|follow_up| follow_up.target);
        self.react(ctx, host, target);
    }

    fn react(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, target: Option<TargetRef>) {
        ctx.transition_locked = true;

        set_speed(host, SPEED_BUSY);
        cue(host, AnimTrigger::TakeDamage, "- took damage!");

        let state = if target.is_some() {
            EnemyState::Attack
        } else {
            EnemyState::Patrol
        };
        let delay = ctx.config.hit_reaction_delay;
        ctx.reaction.arm(FollowUp { state, target }, delay);
    }
}

impl StateBehavior for TakeDamageBehavior {
    fn on_enter(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, target: Option<TargetRef>) {
        self.react(ctx, host, target);
    }
}

struct DeadBehavior;

impl StateBehavior for DeadBehavior {
    fn on_enter(&self, ctx: &mut EnemyContext, host: &mut dyn EnemyHost, _target: Option<TargetRef>) {
        ctx.transition_locked = true;
        ctx.reaction.cancel();
        ctx.attack.cancel();
        ctx.target = None;

        reset_trigger(host, AnimTrigger::TakeDamage);
        reset_trigger(host, AnimTrigger::Attack);
        set_speed(host, SPEED_STOPPED);
        cue(host, AnimTrigger::Dead, "is dead!");

        ctx.active = false;
        host.deactivate();
    }
}
