//! Spawn cadence timer
//!
//! One scheduler per entity family. The scheduler only decides *when* a spawn
//! attempt is due; placement and the on-screen cap are the caller's problem.
//! The interval re-rolls on every fire, whether or not the attempt produced an
//! entity, so a crowded track cannot compress the cadence.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Timer-driven spawn cadence with randomized interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Interval bounds for the uniform re-roll (seconds)
    pub min_interval: f32,
    pub max_interval: f32,
    /// Delay from start() to the first attempt (seconds)
    pub initial_delay: f32,
    /// Live-entity cap enforced by the caller at spawn time
    pub max_on_screen: usize,
    /// Time since the last fire; negative while the initial delay runs
    elapsed: f32,
    /// Next fire threshold; 0 until the first fire so the initial delay
    /// alone gates the first attempt
    next_fire: f32,
    active: bool,
}

impl SpawnScheduler {
    pub fn new(min_interval: f32, max_interval: f32, initial_delay: f32, max_on_screen: usize) -> Self {
        Self {
            min_interval,
            max_interval,
            initial_delay,
            max_on_screen,
            elapsed: 0.0,
            next_fire: 0.0,
            active: false,
        }
    }

    /// Arm the scheduler. The negative elapsed models the pre-roll delay
    /// without a separate state.
    pub fn start(&mut self) {
        self.elapsed = -self.initial_delay;
        self.next_fire = 0.0;
        self.active = true;
    }

    /// Halt without clearing the timer; start() re-arms from scratch.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Back to the unarmed post-construction state.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.next_fire = 0.0;
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Elapsed timer value (test hook; negative during the initial delay)
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the timer. Returns true when a spawn attempt is due this tick.
    /// On fire the interval is re-rolled and `elapsed` zeroed immediately -
    /// the attempt is consumed even if the caller then fails to place.
    pub fn tick(&mut self, dt: f32, rng: &mut Pcg32) -> bool {
        if !self.active {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.next_fire {
            self.elapsed = 0.0;
            self.next_fire = rng.random_range(self.min_interval..=self.max_interval);
            true
        } else {
            false
        }
    }
}
