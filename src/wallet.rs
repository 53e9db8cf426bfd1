//! Persistent currency wallet
//!
//! The settlement target for session tallies. The host owns actual storage;
//! this type only handles the balance arithmetic and the JSON envelope the
//! host reads and writes.

use serde::{Deserialize, Serialize};

use crate::platform::CurrencyStore;

/// Player's persistent currency balance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub balance: u64,
    /// Lifetime earnings, never decremented by spending
    pub earned_total: u64,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from the host's stored JSON envelope; a missing or corrupt
    /// document starts a fresh wallet rather than failing the session.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Wallet>(json) {
            Ok(wallet) => {
                log::info!("wallet loaded, balance {}", wallet.balance);
                wallet
            }
            Err(e) => {
                log::warn!("wallet document unreadable ({e}), starting fresh");
                Self::new()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Spend from the balance; returns false (and leaves the balance alone)
    /// when funds are short.
    pub fn try_spend(&mut self, amount: u64) -> bool {
        if amount > self.balance {
            return false;
        }
        self.balance -= amount;
        true
    }
}

impl CurrencyStore for Wallet {
    fn add_currency(&mut self, amount: u64) {
        self.balance += amount;
        self.earned_total += amount;
        log::debug!("wallet +{amount}, balance {}", self.balance);
    }
}
