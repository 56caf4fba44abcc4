//! Cancellable deferred actions driven by simulation time.

use std::time::Duration;

use bevy::prelude::*;

/// A one-shot or repeating action armed against the simulation clock.
///
/// Nothing runs on its own: the owner advances it once per tick and acts on
/// the number of firings it reports.
#[derive(Debug, Default)]
pub struct ScheduledTask {
    timer: Option<Timer>,
}

impl ScheduledTask {
    /// Arm a single firing after `delay`. Replaces anything already armed.
    pub fn arm_once(&mut self, delay: Duration) {
        self.timer = Some(Timer::new(delay, TimerMode::Once));
    }

    /// Arm a firing every `period`. Replaces anything already armed.
    pub fn arm_repeating(&mut self, period: Duration) {
        self.timer = Some(Timer::new(period, TimerMode::Repeating));
    }

    /// Safe to call any number of times, armed or not.
    pub fn cancel(&mut self) {
        self.timer = None;
    }

    pub fn is_armed(&self) -> bool {
        self.timer.is_some()
    }

    /// Move the clock forward and return how many times the action fired.
    ///
    /// A one-shot disarms itself once it fires. A zero period fires once per
    /// call.
    pub fn advance(&mut self, delta: Duration) -> u32 {
        let Some(timer) = self.timer.as_mut() else {
            return 0;
        };

        let fired = if timer.duration().is_zero() {
            1
        } else {
            timer.tick(delta);
            timer.times_finished_this_tick()
        };

        if fired > 0 && timer.mode() == TimerMode::Once {
            self.timer = None;
        }
        fired
    }
}
