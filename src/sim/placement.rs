//! Angular placement on the circular track
//!
//! Rejection sampling: draw candidate angles, reject anything too close to
//! the player or to an existing entity of the same family. Power-ups carry a
//! fallback so they always land somewhere; collectibles and hazards may
//! legitimately skip a cycle under crowding.

use std::f32::consts::{FRAC_PI_6, PI, TAU};

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{arc_distance, normalize_angle};

/// Per-family placement rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRules {
    /// Candidate draws before giving up
    pub max_attempts: u32,
    /// Minimum shortest-arc distance to the player (radians)
    pub min_angle_from_player: f32,
    /// Minimum shortest-arc distance to same-family entities (radians)
    pub min_angle_between: f32,
    /// On exhaustion, land opposite the player instead of skipping
    pub opposite_fallback: bool,
}

/// Counters for placement outcomes, kept per session
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlacementStats {
    pub attempts: u64,
    pub rejected_draws: u64,
    pub skipped: u64,
    /// Fallback placements bypassed the safety checks - tracked separately
    /// so the asymmetry stays visible in telemetry
    pub fallbacks: u64,
}

/// Find a spawn angle satisfying the rules, or None when the track is too
/// crowded and the family has no fallback.
pub fn find_site(
    rng: &mut Pcg32,
    player_angle: f32,
    occupied: &[f32],
    rules: &PlacementRules,
    stats: &mut PlacementStats,
) -> Option<f32> {
    stats.attempts += 1;

    for _ in 0..rules.max_attempts {
        let candidate = normalize_angle(rng.random_range(0.0..TAU));

        if arc_distance(candidate, player_angle) < rules.min_angle_from_player {
            stats.rejected_draws += 1;
            continue;
        }
        if occupied
            .iter()
            .any(|&a| arc_distance(candidate, a) < rules.min_angle_between)
        {
            stats.rejected_draws += 1;
            continue;
        }
        return Some(candidate);
    }

    if rules.opposite_fallback {
        // Opposite the player with +/-30 degrees of jitter, no safety checks
        let angle = normalize_angle(player_angle + PI + rng.random_range(-FRAC_PI_6..=FRAC_PI_6));
        stats.fallbacks += 1;
        log::warn!(target: "placement", "solver exhausted, fallback spawn at {angle:.2} rad");
        Some(angle)
    } else {
        stats.skipped += 1;
        None
    }
}
