//! Session tally and settlement
//!
//! Accumulates collection counts and value during a run. Settlement moves the
//! accumulated value into the persistent wallet exactly once at session end;
//! an empty tally settles as a no-op.

use serde::{Deserialize, Serialize};

use crate::platform::CurrencyStore;

use super::state::{CollectibleKind, PowerUpKind};

/// Running totals for one play session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTally {
    pub total_count: u32,
    pub total_value: u64,
    pub normal: u32,
    pub rare: u32,
    pub ultra_rare: u32,
    pub power_ups: u32,
    /// Set by settle(); cleared only by reset()
    settled: bool,
}

impl SessionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one collectible pickup. `value` arrives with any score
    /// multiplier already applied - the tally does not know about effects.
    /// No deduplication happens here; the caller's edge-trigger guarantees
    /// one call per collection event.
    pub fn record_collectible(&mut self, kind: CollectibleKind, value: u64) {
        self.total_count += 1;
        self.total_value += value;
        match kind {
            CollectibleKind::Normal => self.normal += 1,
            CollectibleKind::Rare => self.rare += 1,
            CollectibleKind::UltraRare => self.ultra_rare += 1,
        }
    }

    /// Record one power-up pickup (no currency value).
    pub fn record_power_up(&mut self, _kind: PowerUpKind) {
        self.total_count += 1;
        self.power_ups += 1;
    }

    /// Zero everything for a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Transfer the accumulated value into the wallet. Runs at most once per
    /// session; an empty tally is a no-op rather than an error.
    pub fn settle(&mut self, wallet: &mut dyn CurrencyStore) {
        if self.settled {
            log::debug!("settle called twice, ignoring");
            return;
        }
        self.settled = true;
        if self.total_value == 0 {
            return;
        }
        log::info!("session settled: {} currency from {} pickups", self.total_value, self.total_count);
        wallet.add_currency(self.total_value);
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestWallet {
        balance: u64,
        deposits: u32,
    }

    impl CurrencyStore for TestWallet {
        fn add_currency(&mut self, amount: u64) {
            self.balance += amount;
            self.deposits += 1;
        }
    }

    #[test]
    fn test_total_is_sum_of_reports() {
        let mut tally = SessionTally::new();
        tally.record_collectible(CollectibleKind::Normal, 2);
        tally.record_collectible(CollectibleKind::Rare, 10);
        tally.record_collectible(CollectibleKind::Normal, 4);
        tally.record_power_up(PowerUpKind::Shield);

        assert_eq!(tally.total_value, 16);
        assert_eq!(tally.total_count, 4);
        assert_eq!(tally.normal, 2);
        assert_eq!(tally.rare, 1);
        assert_eq!(tally.power_ups, 1);

        tally.reset();
        assert_eq!(tally.total_value, 0);
        assert_eq!(tally.total_count, 0);
    }

    #[test]
    fn test_settle_runs_once() {
        let mut tally = SessionTally::new();
        tally.record_collectible(CollectibleKind::Normal, 5);

        let mut wallet = TestWallet::default();
        tally.settle(&mut wallet);
        tally.settle(&mut wallet);
        assert_eq!(wallet.balance, 5);
        assert_eq!(wallet.deposits, 1);
    }

    #[test]
    fn test_empty_settle_is_noop() {
        let mut tally = SessionTally::new();
        let mut wallet = TestWallet::default();
        tally.settle(&mut wallet);
        assert_eq!(wallet.deposits, 0);
        assert!(tally.is_settled());
    }
}
