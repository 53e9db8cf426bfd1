//! Session state and core simulation types
//!
//! Entity kind taxonomy, session phase, and the seeded RNG wrapper that keeps
//! every session replayable from its seed.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Collectible rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Normal,
    Rare,
    UltraRare,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    Slowmo,
    Magnet,
    DoublePoints,
}

impl PowerUpKind {
    /// All power-up kinds, in draw order
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::Shield,
        PowerUpKind::Slowmo,
        PowerUpKind::Magnet,
        PowerUpKind::DoublePoints,
    ];
}

/// What a spawned entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Collectible(CollectibleKind),
    PowerUp(PowerUpKind),
    /// An orbiting mine; touching it ends the run
    Hazard,
}

/// Spawner family an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Family {
    Collectible,
    PowerUp,
    Hazard,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Collectible, Family::PowerUp, Family::Hazard];
}

impl EntityKind {
    pub fn family(&self) -> Family {
        match self {
            EntityKind::Collectible(_) => Family::Collectible,
            EntityKind::PowerUp(_) => Family::PowerUp,
            EntityKind::Hazard => Family::Hazard,
        }
    }
}

/// Current phase of a play session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Constructed but not started; spawners inert
    Ready,
    /// Active gameplay
    Running,
    /// Run over (settled); spawners stopped
    Ended,
}

/// RNG state wrapper for replayability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed)
    }
}
