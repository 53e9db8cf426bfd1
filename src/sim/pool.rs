//! Round-robin burst-record pool
//!
//! Collection and hazard destruction emit short-lived burst records that a
//! renderer can turn into particles. Slots are reused round-robin; when the
//! pool is full the oldest slot is overwritten. Single-threaded access only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::EntityKind;

/// One pooled burst marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    pub pos: Vec2,
    pub kind: EntityKind,
    pub remaining: f32,
    pub live: bool,
}

/// Fixed-capacity free-list of burst records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BurstPool {
    slots: Vec<Burst>,
    cursor: usize,
    capacity: usize,
}

impl BurstPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Claim the next slot, evicting the oldest when full.
    pub fn emit(&mut self, pos: Vec2, kind: EntityKind, ttl: f32) {
        let burst = Burst {
            pos,
            kind,
            remaining: ttl,
            live: true,
        };
        if self.slots.len() < self.capacity {
            self.slots.push(burst);
        } else {
            self.slots[self.cursor] = burst;
        }
        self.cursor = (self.cursor + 1) % self.capacity;
    }

    /// Age all live slots; expired slots go back on the free list.
    pub fn tick(&mut self, dt: f32) {
        for slot in &mut self.slots {
            if slot.live {
                slot.remaining -= dt;
                if slot.remaining <= 0.0 {
                    slot.live = false;
                }
            }
        }
    }

    pub fn live(&self) -> impl Iterator<Item = &Burst> {
        self.slots.iter().filter(|b| b.live)
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|b| b.live).count()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}
