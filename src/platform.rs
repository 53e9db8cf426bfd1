//! Host collaborator interfaces
//!
//! The session core consumes these but does not define their behavior: the
//! host supplies the player's track position and receives currency, mission
//! progress, haptic pulses, and HUD updates. All of it is in-process calls -
//! there is no wire protocol here.
//!
//! `NullHost` satisfies everything and ignores it; `RecordingHost` captures
//! calls for assertions. Both are used by the demo binary and the tests.

use crate::sim::state::EntityKind;
use crate::sim::tally::SessionTally;

/// Mission/quest objective channels the session reports progress on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    Collectibles,
    RareCollectibles,
    PowerUps,
}

/// Player position on the circular track
pub trait PlayerTrack {
    /// Current angle (radians)
    fn angle(&self) -> f32;
    /// Orbit radius; entities use the track radius from tuning, the player
    /// may sit slightly inside or outside it
    fn radius(&self) -> f32;
}

/// Persistent currency store; settlement target
pub trait CurrencyStore {
    fn add_currency(&mut self, amount: u64);
}

/// Mission/quest progress counter
pub trait ProgressSink {
    fn report_progress(&mut self, objective: ObjectiveKind, amount: u32);
}

/// Fire-and-forget haptic/audio feedback on collection events
pub trait FeedbackSink {
    fn collected(&mut self, kind: EntityKind);
}

/// Display-only tally sink; the core never reads back from it
pub trait HudSink {
    fn tally_changed(&mut self, tally: &SessionTally);
}

/// Collaborator bundle handed to the session each tick. The player reference
/// is optional on purpose: a missing player at start triggers the retry path
/// and leaves spawning inert, never a panic.
pub struct Host<'a> {
    pub player: Option<&'a dyn PlayerTrack>,
    pub wallet: &'a mut dyn CurrencyStore,
    pub missions: Option<&'a mut dyn ProgressSink>,
    pub feedback: Option<&'a mut dyn FeedbackSink>,
    pub hud: Option<&'a mut dyn HudSink>,
}

/// A player pinned at a fixed track position
#[derive(Debug, Clone, Copy)]
pub struct FixedPlayer {
    pub angle: f32,
    pub radius: f32,
}

impl PlayerTrack for FixedPlayer {
    fn angle(&self) -> f32 {
        self.angle
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Accepts everything, remembers nothing
#[derive(Debug, Default)]
pub struct NullHost;

impl CurrencyStore for NullHost {
    fn add_currency(&mut self, _amount: u64) {}
}

impl ProgressSink for NullHost {
    fn report_progress(&mut self, _objective: ObjectiveKind, _amount: u32) {}
}

impl FeedbackSink for NullHost {
    fn collected(&mut self, _kind: EntityKind) {}
}

impl HudSink for NullHost {
    fn tally_changed(&mut self, _tally: &SessionTally) {}
}

/// Captures every collaborator call for test assertions
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub balance: u64,
    pub deposits: Vec<u64>,
    pub progress: Vec<(ObjectiveKind, u32)>,
    pub feedback: Vec<EntityKind>,
    pub hud_updates: u32,
}

impl CurrencyStore for RecordingHost {
    fn add_currency(&mut self, amount: u64) {
        self.balance += amount;
        self.deposits.push(amount);
    }
}

impl ProgressSink for RecordingHost {
    fn report_progress(&mut self, objective: ObjectiveKind, amount: u32) {
        self.progress.push((objective, amount));
    }
}

impl FeedbackSink for RecordingHost {
    fn collected(&mut self, kind: EntityKind) {
        self.feedback.push(kind);
    }
}

impl HudSink for RecordingHost {
    fn tally_changed(&mut self, tally: &SessionTally) {
        let _ = tally;
        self.hud_updates += 1;
    }
}
