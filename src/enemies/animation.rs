//! Visual cues emitted by the enemy state machine.
//!
//! The state machine never talks to a renderer. It issues discrete commands to
//! a `VisualSink`; the `Animator` component is the ECS implementation that a
//! presentation layer reads every frame.

use bevy::prelude::*;

/// Speed indicator while walking a patrol route.
pub const SPEED_MOVING: f32 = 1.0;
/// Speed indicator while attacking or reacting to a hit.
pub const SPEED_BUSY: f32 = -1.0;
/// Speed indicator once dead.
pub const SPEED_STOPPED: f32 = 0.0;

/// One-shot animation triggers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AnimTrigger {
    Attack,
    TakeDamage,
    Dead,
}

impl AnimTrigger {
    pub fn name(self) -> &'static str {
        match self {
            AnimTrigger::Attack => "Attack",
            AnimTrigger::TakeDamage => "TakeDamage",
            AnimTrigger::Dead => "Dead",
        }
    }
}

/// Receiver for the discrete animation commands an enemy issues.
pub trait VisualSink {
    fn set_speed_indicator(&mut self, value: f32);
    fn trigger(&mut self, trigger: AnimTrigger);
    fn reset_trigger(&mut self, trigger: AnimTrigger);
}

/// Animation parameters for an enemy, mirroring an animator controller.
///
/// Triggers stay set until the state machine resets them.
#[derive(Component, Debug, Default, Clone)]
pub struct Animator {
    pub speed: f32,
    pending: Vec<AnimTrigger>,
    /// Total number of times each trigger was fired, for diagnostics.
    fired: Vec<(AnimTrigger, u32)>,
}

impl Animator {
    pub fn is_set(&self, trigger: AnimTrigger) -> bool {
        self.pending.contains(&trigger)
    }

    pub fn fire_count(&self, trigger: AnimTrigger) -> u32 {
        self.fired
            .iter()
            .find(|(t, _)| *t == trigger)
            .map_or(0, |(_, count)| *count)
    }
}

impl VisualSink for Animator {
    fn set_speed_indicator(&mut self, value: f32) {
        self.speed = value;
    }

    fn trigger(&mut self, trigger: AnimTrigger) {
        if !self.pending.contains(&trigger) {
            self.pending.push(trigger);
        }
        match self.fired.iter_mut().find(|(t, _)| *t == trigger) {
            Some((_, count)) => *count += 1,
            None => self.fired.push((trigger, 1)),
        }
    }

    fn reset_trigger(&mut self, trigger: AnimTrigger) {
        self.pending.retain(|t| *t != trigger);
    }
}
