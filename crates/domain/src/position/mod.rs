use serde::{Deserialize, Serialize};

/// Ledger of open positions.
pub mod ledger;

pub use ledger::{LedgerError, PositionLedger};

/// Concentrated liquidity held by the vault over one tick range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Inclusive lower tick.
    pub tick_lower: i32,
    /// Exclusive upper tick.
    pub tick_upper: i32,
    pub liquidity: u128,
}

impl Position {
    pub fn new(tick_lower: i32, tick_upper: i32, liquidity: u128) -> Self {
        Self {
            tick_lower,
            tick_upper,
            liquidity,
        }
    }

    /// Returns true when `(tick_lower, tick_upper)` is this position's range.
    pub fn has_range(&self, tick_lower: i32, tick_upper: i32) -> bool {
        self.tick_lower == tick_lower && self.tick_upper == tick_upper
    }

    /// Returns true when the pool's current tick earns fees for this range.
    pub fn is_in_range(&self, current_tick: i32) -> bool {
        current_tick >= self.tick_lower && current_tick < self.tick_upper
    }
}
