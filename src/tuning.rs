//! Data-driven game balance
//!
//! Every numeric knob the session uses lives here so balance passes never
//! touch sim code. Documents are plain JSON; missing fields fall back to the
//! shipped defaults.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::placement::PlacementRules;
use crate::sim::state::CollectibleKind;

/// Cadence, cap, and lifetime knobs for one spawner family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyTuning {
    pub min_interval: f32,
    pub max_interval: f32,
    pub initial_delay: f32,
    pub max_on_screen: usize,
    pub lifetime: f32,
    pub fade_window: f32,
    pub placement: PlacementRules,
}

/// One row of the rarity table
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RarityWeight {
    pub kind: CollectibleKind,
    pub weight: u32,
    pub value: u32,
}

/// Weighted rarity tiers for collectibles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RarityTable {
    pub entries: Vec<RarityWeight>,
}

impl RarityTable {
    /// Weighted draw. Zero-weight rows never win; a table with no usable
    /// rows yields None and the spawn cycle is skipped.
    pub fn draw(&self, rng: &mut Pcg32) -> Option<RarityWeight> {
        let total: u32 = self.entries.iter().map(|e| e.weight).sum();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for entry in &self.entries {
            if roll < entry.weight {
                return Some(*entry);
            }
            roll -= entry.weight;
        }
        self.entries.last().copied()
    }
}

/// Power-up effect durations (seconds)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectDurations {
    pub shield: f32,
    pub slowmo: f32,
    pub magnet: f32,
    pub double_points: f32,
}

/// Complete balance document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Radius of the circular track everything orbits on
    pub track_radius: f32,
    /// Half-arc within which the player collects an entity (radians)
    pub collect_arc: f32,
    /// Hazard orbit speed (radians/sec, before the Speed axis multiplier)
    pub hazard_speed: f32,
    /// Burst pool capacity
    pub burst_pool: usize,
    /// Burst record lifetime (seconds)
    pub burst_ttl: f32,
    pub collectibles: FamilyTuning,
    pub power_ups: FamilyTuning,
    pub hazards: FamilyTuning,
    pub rarity: RarityTable,
    pub effects: EffectDurations,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            track_radius: crate::consts::TRACK_RADIUS,
            collect_arc: 0.18,
            hazard_speed: 0.45,
            burst_pool: 32,
            burst_ttl: 0.8,
            collectibles: FamilyTuning {
                min_interval: 1.5,
                max_interval: 3.5,
                initial_delay: 1.0,
                max_on_screen: 6,
                lifetime: 9.0,
                fade_window: 2.0,
                placement: PlacementRules {
                    max_attempts: 10,
                    min_angle_from_player: 0.35,
                    min_angle_between: 0.30,
                    opposite_fallback: false,
                },
            },
            power_ups: FamilyTuning {
                min_interval: 8.0,
                max_interval: 14.0,
                initial_delay: 5.0,
                max_on_screen: 1,
                lifetime: 7.0,
                fade_window: 1.5,
                placement: PlacementRules {
                    max_attempts: 20,
                    min_angle_from_player: 0.6,
                    min_angle_between: 0.6,
                    opposite_fallback: true,
                },
            },
            hazards: FamilyTuning {
                min_interval: 6.0,
                max_interval: 10.0,
                initial_delay: 8.0,
                max_on_screen: 3,
                lifetime: 20.0,
                fade_window: 1.0,
                placement: PlacementRules {
                    max_attempts: 10,
                    min_angle_from_player: 1.0,
                    min_angle_between: 0.8,
                    opposite_fallback: false,
                },
            },
            rarity: RarityTable {
                entries: vec![
                    RarityWeight {
                        kind: CollectibleKind::Normal,
                        weight: 80,
                        value: 2,
                    },
                    RarityWeight {
                        kind: CollectibleKind::Rare,
                        weight: 17,
                        value: 10,
                    },
                    RarityWeight {
                        kind: CollectibleKind::UltraRare,
                        weight: 3,
                        value: 50,
                    },
                ],
            },
            effects: EffectDurations {
                shield: 8.0,
                slowmo: 5.0,
                magnet: 6.0,
                double_points: 6.0,
            },
        }
    }
}

impl Tuning {
    /// Parse a tuning document; missing fields take the shipped defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        if tuning.rarity.entries.is_empty() {
            log::warn!("tuning document has an empty rarity table, using defaults");
            tuning.rarity = Tuning::default().rarity;
        }
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
