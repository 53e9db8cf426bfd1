//! Orbit Dash - circular track arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (spawning, lifecycle, effects)
//! - `platform`: Host collaborator interfaces (player, wallet, missions, HUD)
//! - `tuning`: Data-driven game balance
//! - `wallet`: Persistent currency store

pub mod platform;
pub mod sim;
pub mod tuning;
pub mod wallet;

pub use tuning::Tuning;
pub use wallet::Wallet;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Track geometry - player and entities all orbit at this radius
    pub const TRACK_RADIUS: f32 = 260.0;

    /// Backoff before retrying a missing player reference at session start
    pub const REF_RETRY_BACKOFF: f32 = 0.5;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed shortest-arc delta from `from` to `to`, in [-π, π)
#[inline]
pub fn arc_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Absolute shortest-arc distance between two angles, in [0, π]
#[inline]
pub fn arc_distance(a: f32, b: f32) -> f32 {
    arc_delta(a, b).abs()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: Vec2) -> (f32, f32) {
    (pos.length(), pos.y.atan2(pos.x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_arc_distance_wraparound() {
        // 10° and 350° are 20° apart, not 340°
        let a = 10.0_f32.to_radians();
        let b = 350.0_f32.to_radians();
        assert!((arc_distance(a, b) - 20.0_f32.to_radians()).abs() < 1e-5);
    }

    #[test]
    fn test_arc_delta_signed() {
        // Going from 170° to -170° is a +20° step across the seam
        let d = arc_delta(170.0_f32.to_radians(), -170.0_f32.to_radians());
        assert!((d - 20.0_f32.to_radians()).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_normalize_in_range(angle in -100.0f32..100.0) {
            let n = normalize_angle(angle);
            prop_assert!((-PI..PI).contains(&n));
        }

        #[test]
        fn prop_arc_distance_symmetric(a in -TAU..TAU, b in -TAU..TAU) {
            prop_assert!((arc_distance(a, b) - arc_distance(b, a)).abs() < 1e-4);
        }

        #[test]
        fn prop_arc_distance_bounded(a in -TAU..TAU, b in -TAU..TAU) {
            prop_assert!(arc_distance(a, b) <= PI + 1e-4);
        }
    }
}
