//! The enemy state machine: the one place allowed to change an enemy's state.
//!
//! Every external notification ends up in [`EnemyStateMachine::request_transition`],
//! which applies these rules in order:
//!
//! 1. Dead is absorbing: nothing leaves it.
//! 2. While the transition lock is held only Dead gets through.
//! 3. Asking for the current state does nothing.
//! 4. Leaving Attack stops the attack loop and releases the target.
//! 5. The state tag is switched, then the old state's exit hook and the new
//!    state's enter hook run.
//!
//! Deferred work (the attack cadence and the end of a hit reaction) is owned
//! here and advanced by [`EnemyStateMachine::tick`] against simulation time.

use std::time::Duration;

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::attack::AttackLoop;
use super::behaviors::{behavior_for, FollowUp, HitReaction, TakeDamageBehavior};
use super::components::{EnemyConfig, EnemyState, TargetRef};
use super::host::EnemyHost;
use super::patrol::PatrolNavigator;

/// External notifications an enemy reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyEvent {
    /// A target entered the detection zone.
    TargetEntered(TargetRef),
    /// A target left the detection zone.
    TargetExited(TargetRef),
    /// Own health dropped but is still above zero.
    HealthChanged(f32),
    /// Own health reached zero.
    Died,
}

/// Mutable state owned by the state machine.
#[derive(Debug)]
pub struct EnemyContext {
    pub(super) current_state: EnemyState,
    pub(super) target: Option<TargetRef>,
    pub(super) transition_locked: bool,
    pub(super) config: EnemyConfig,
    pub(super) patrol: PatrolNavigator,
    pub(super) attack: AttackLoop,
    pub(super) reaction: HitReaction,
    /// Cleared on death; a deactivated machine ignores ticks.
    pub(super) active: bool,
    pub(super) rng: StdRng,
}

/// Behavior controller for one enemy.
#[derive(Component, Debug)]
pub struct EnemyStateMachine {
    ctx: EnemyContext,
}

impl EnemyStateMachine {
    /// Create a machine in `Startup`. `seed` drives waypoint selection.
    pub fn new(config: EnemyConfig, seed: u64) -> Self {
        Self {
            ctx: EnemyContext {
                current_state: EnemyState::Startup,
                target: None,
                transition_locked: false,
                config,
                patrol: PatrolNavigator::default(),
                attack: AttackLoop::default(),
                reaction: HitReaction::default(),
                active: true,
                rng: StdRng::seed_from_u64(seed),
            },
        }
    }

    pub fn state(&self) -> EnemyState {
        self.ctx.current_state
    }

    pub fn target(&self) -> Option<TargetRef> {
        self.ctx.target
    }

    pub fn is_locked(&self) -> bool {
        self.ctx.transition_locked
    }

    pub fn is_active(&self) -> bool {
        self.ctx.active
    }

    pub fn config(&self) -> &EnemyConfig {
        &self.ctx.config
    }

    pub fn patrol_index(&self) -> usize {
        self.ctx.patrol.index()
    }

    pub fn attack_loop(&self) -> &AttackLoop {
        &self.ctx.attack
    }

    /// Whether a hit reaction is waiting to hand control back.
    pub fn reaction_pending(&self) -> bool {
        self.ctx.reaction.is_pending()
    }

    /// Leave `Startup` and begin patrolling.
    pub fn start(&mut self, host: &mut dyn EnemyHost) {
        if self.ctx.current_state == EnemyState::Startup {
            self.request_transition(host, EnemyState::Patrol, None);
        }
    }

    /// Map an external notification onto a transition request.
    ///
    /// Detection changes that arrive during a hit reaction cannot transition,
    /// so they decide where the reaction hands control back instead.
    pub fn handle_event(&mut self, host: &mut dyn EnemyHost, event: EnemyEvent) {
        match event {
            EnemyEvent::TargetEntered(target) if self.ctx.reaction.is_pending() => {
                let follow_up = FollowUp {
                    state: EnemyState::Attack,
                    target: Some(target),
                };
                self.redirect_reaction(host, follow_up);
            }
            EnemyEvent::TargetExited(_) if self.ctx.reaction.is_pending() => {
                let follow_up = FollowUp {
                    state: EnemyState::Patrol,
                    target: None,
                };
                self.redirect_reaction(host, follow_up);
            }
            EnemyEvent::TargetEntered(target) => {
                self.request_transition(host, EnemyState::Attack, Some(target));
            }
            EnemyEvent::TargetExited(_) => {
                self.request_transition(host, EnemyState::Patrol, None);
            }
            EnemyEvent::HealthChanged(_) if self.ctx.current_state == EnemyState::TakeDamage => {
                TakeDamageBehavior.restart(&mut self.ctx, host);
            }
            EnemyEvent::HealthChanged(_) => {
                self.request_transition(host, EnemyState::TakeDamage, None);
            }
            EnemyEvent::Died => {
                self.request_transition(host, EnemyState::Dead, None);
            }
        }
    }

    /// Ask to move to `new_state`. Returns whether the transition happened.
    pub fn request_transition(
        &mut self,
        host: &mut dyn EnemyHost,
        new_state: EnemyState,
        target: Option<TargetRef>,
    ) -> bool {
        let current = self.ctx.current_state;

        if current == EnemyState::Dead {
            debug!("{}: ignoring {:?}, already dead", host.name(), new_state);
            return false;
        }
        if self.ctx.transition_locked && new_state != EnemyState::Dead {
            debug!("{}: ignoring {:?}, transitions are locked", host.name(), new_state);
            return false;
        }
        if new_state == current {
            debug!("{}: ignoring {:?}, already active", host.name(), new_state);
            return false;
        }

        let mut released = None;
        if current == EnemyState::Attack {
            self.ctx.attack.cancel();
            released = self.ctx.target.take();
        }
        let entry_target = target.or(released).or(self.ctx.target);

        self.ctx.current_state = new_state;
        behavior_for(current).on_exit(&mut self.ctx, host);
        behavior_for(new_state).on_enter(&mut self.ctx, host, entry_target);

        debug!("{}: {:?} -> {:?}", host.name(), current, new_state);
        true
    }

    fn redirect_reaction(&mut self, host: &mut dyn EnemyHost, follow_up: FollowUp) {
        debug!(
            "{}: hit reaction will hand over to {:?}",
            host.name(),
            follow_up.state
        );
        self.ctx.reaction.redirect(follow_up);
    }

    /// Advance deferred work and run the active state's per-tick behavior.
    pub fn tick(&mut self, host: &mut dyn EnemyHost, delta: Duration) {
        if !self.ctx.active {
            return;
        }

        self.ctx.attack.advance(host, delta);

        if let Some(follow_up) = self.ctx.reaction.advance(delta) {
            self.ctx.transition_locked = false;
            self.request_transition(host, follow_up.state, follow_up.target);
        }

        if self.ctx.active {
            behavior_for(self.ctx.current_state).on_tick(&mut self.ctx, host, delta);
        }
    }
}
