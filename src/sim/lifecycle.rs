//! Per-entity lifecycle
//!
//! A spawned entity ages toward its lifetime, fades out over the tail of it,
//! and either gets collected (exactly once) or expires with no reward. The
//! wobble is purely cosmetic - renderers may use it, the sim never does.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::polar_to_cartesian;

use super::state::EntityKind;

/// What happened to an entity during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Still alive
    None,
    /// Lifetime ran out; remove with no reward
    Expired,
}

/// An entity living on the circular track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnedEntity {
    pub id: u32,
    pub kind: EntityKind,
    /// Position on the track (radians)
    pub angle: f32,
    /// Reward value (collectibles; 0 otherwise). The score multiplier is
    /// applied at collection time, not here.
    pub value: u32,
    /// Seconds since spawn
    pub age: f32,
    /// Seconds until expiry
    pub lifetime: f32,
    /// Opacity ramps from 1 to 0 over the last fade_window seconds
    pub fade_window: f32,
    /// Cosmetic scale/rotation oscillation phase
    pub wobble_phase: f32,
    /// Edge-trigger guard: set on first collection, checked before notifying
    collected: bool,
}

impl SpawnedEntity {
    pub fn new(id: u32, kind: EntityKind, angle: f32, value: u32, lifetime: f32, fade_window: f32) -> Self {
        Self {
            id,
            kind,
            angle,
            value,
            age: 0.0,
            lifetime,
            fade_window,
            wobble_phase: 0.0,
            collected: false,
        }
    }

    /// Derived cartesian position at the given track radius
    pub fn pos(&self, track_radius: f32) -> Vec2 {
        polar_to_cartesian(track_radius, self.angle)
    }

    /// Advance age and wobble. Returns Expired when the lifetime runs out.
    pub fn advance(&mut self, dt: f32) -> LifecycleEvent {
        self.age += dt;
        self.wobble_phase += dt * 4.0;
        if self.age >= self.lifetime {
            LifecycleEvent::Expired
        } else {
            LifecycleEvent::None
        }
    }

    /// Current opacity: 1 until the fade window opens, then linear to 0
    pub fn opacity(&self) -> f32 {
        let remaining = self.lifetime - self.age;
        if remaining >= self.fade_window {
            1.0
        } else if self.fade_window <= 0.0 {
            1.0
        } else {
            (remaining / self.fade_window).clamp(0.0, 1.0)
        }
    }

    /// Cosmetic scale pulse around 1.0
    pub fn wobble_scale(&self) -> f32 {
        1.0 + 0.08 * self.wobble_phase.sin()
    }

    /// First collection returns true; repeats (e.g. the collision check
    /// firing twice in one frame) return false and must not notify anyone.
    pub fn try_collect(&mut self) -> bool {
        if self.collected {
            false
        } else {
            self.collected = true;
            true
        }
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::CollectibleKind;

    fn entity(lifetime: f32, fade: f32) -> SpawnedEntity {
        SpawnedEntity::new(
            1,
            EntityKind::Collectible(CollectibleKind::Normal),
            0.0,
            2,
            lifetime,
            fade,
        )
    }

    #[test]
    fn test_fade_is_linear_over_window() {
        // lifetime 4.5, fade 1.5: full until 3.0, mid-fade at 3.5, gone at 4.5
        let mut e = entity(4.5, 1.5);
        e.advance(2.9);
        assert_eq!(e.opacity(), 1.0);
        e.advance(0.6); // age 3.5
        let o = e.opacity();
        assert!(o > 0.0 && o < 1.0, "opacity {o} should be mid-fade");
        assert!((o - (1.0 / 1.5)).abs() < 1e-4);
    }

    #[test]
    fn test_expires_at_lifetime() {
        let mut e = entity(4.5, 1.5);
        assert_eq!(e.advance(4.4), LifecycleEvent::None);
        assert_eq!(e.advance(0.2), LifecycleEvent::Expired);
        assert!(e.opacity() <= 1e-4);
    }

    #[test]
    fn test_collection_is_edge_triggered() {
        let mut e = entity(10.0, 1.0);
        assert!(e.try_collect());
        assert!(!e.try_collect(), "second collect in the same frame must not notify");
        assert!(e.is_collected());
    }

    #[test]
    fn test_wobble_has_no_gameplay_effect() {
        let mut a = entity(10.0, 1.0);
        let mut b = entity(10.0, 1.0);
        a.advance(1.0);
        // Same age stepped differently: wobble phases differ, expiry does not
        b.advance(0.5);
        b.advance(0.5);
        assert_eq!(a.age, b.age);
        assert_eq!(a.opacity(), b.opacity());
    }
}
