//! Waypoint patrol movement.

use bevy::prelude::*;
use rand::Rng;

use super::components::ARRIVAL_THRESHOLD;
use super::host::EnemyHost;

/// Walks an enemy between waypoints, picking the next one at random.
#[derive(Debug, Default, Clone)]
pub struct PatrolNavigator {
    index: usize,
}

impl PatrolNavigator {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Index of the waypoint currently being walked to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance one simulation step toward the active waypoint.
    ///
    /// Returns the newly selected index when the waypoint was reached.
    pub fn step(
        &mut self,
        host: &mut dyn EnemyHost,
        waypoints: &[Vec2],
        move_speed: f32,
        delta_secs: f32,
        rng: &mut impl Rng,
    ) -> Option<usize> {
        if waypoints.is_empty() {
            return None;
        }
        if self.index >= waypoints.len() {
            self.index = 0;
        }

        let point = waypoints[self.index];
        host.move_toward(point, move_speed * delta_secs);
        host.face(point);

        if host.position().distance(point) < ARRIVAL_THRESHOLD {
            let next = self.select_next(waypoints.len(), rng);
            return Some(next);
        }
        None
    }

    /// Pick a new waypoint index uniformly at random, never the current one.
    pub fn select_next(&mut self, count: usize, rng: &mut impl Rng) -> usize {
        if count == 0 {
            return self.index;
        }
        let draw = rng.gen_range(0..count);
        self.index = next_patrol_index(self.index, draw, count);
        self.index
    }
}

/// Resolve a random draw into the next waypoint index.
///
/// A draw equal to `previous` is corrected to the following index, so with two
/// or more waypoints the same point is never picked twice in a row. With a
/// single waypoint the only index is picked again.
pub fn next_patrol_index(previous: usize, draw: usize, count: usize) -> usize {
    if draw == previous {
        (previous + 1) % count
    } else {
        draw
    }
}
