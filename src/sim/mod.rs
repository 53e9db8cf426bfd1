//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Externally-driven tick only, no internal clocks or threads
//! - Seeded RNG only
//! - No rendering; host collaborators enter only as trait objects

pub mod effects;
pub mod lifecycle;
pub mod placement;
pub mod pool;
pub mod scheduler;
pub mod state;
pub mod tally;
pub mod tick;

pub use effects::{ActiveEffect, EffectArbiter, EffectAxis};
pub use lifecycle::{LifecycleEvent, SpawnedEntity};
pub use placement::{PlacementRules, PlacementStats, find_site};
pub use pool::{Burst, BurstPool};
pub use scheduler::SpawnScheduler;
pub use state::{
    CollectibleKind, EntityKind, Family, PowerUpKind, RngState, SessionPhase,
};
pub use tally::SessionTally;
pub use tick::{Session, SessionSnapshot};
