//! Set of open positions keyed by tick range.
//!
//! Entries keep their insertion order; closing a position preserves the
//! order of the others. There is never more than one entry per range and
//! never an entry with zero liquidity.

use super::Position;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected ledger mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid tick range [{lower}, {upper})")]
    InvalidRange { lower: i32, upper: i32 },
    #[error("position [{lower}, {upper}) not found")]
    NotFound { lower: i32, upper: i32 },
    #[error("insufficient liquidity: available {available}, requested {requested}")]
    InsufficientLiquidity { available: u128, requested: u128 },
    #[error("position limit of {max} reached")]
    CapacityExceeded { max: usize },
    #[error("liquidity overflow")]
    LiquidityOverflow,
    #[error("liquidity must be positive")]
    ZeroLiquidity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionLedger {
    positions: Vec<Position>,
    max_positions: usize,
}

impl PositionLedger {
    pub fn new(max_positions: usize) -> Self {
        Self {
            positions: Vec::with_capacity(max_positions),
            max_positions,
        }
    }

    pub fn max_positions(&self) -> usize {
        self.max_positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Position> {
        self.positions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    /// Snapshot of every open position.
    pub fn positions(&self) -> Vec<Position> {
        self.positions.clone()
    }

    /// Index of the entry for a range.
    pub fn find(&self, tick_lower: i32, tick_upper: i32) -> Option<usize> {
        self.positions
            .iter()
            .position(|p| p.has_range(tick_lower, tick_upper))
    }

    /// Returns true when a new entry for this range would exceed the cap.
    pub fn would_exceed_capacity(&self, tick_lower: i32, tick_upper: i32) -> bool {
        self.find(tick_lower, tick_upper).is_none() && self.positions.len() >= self.max_positions
    }

    /// Adds liquidity to a range, merging into an existing entry.
    ///
    /// Returns the updated position.
    pub fn add(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<Position, LedgerError> {
        if tick_lower >= tick_upper {
            return Err(LedgerError::InvalidRange {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        if liquidity == 0 {
            return Err(LedgerError::ZeroLiquidity);
        }

        if let Some(index) = self.find(tick_lower, tick_upper) {
            let entry = &mut self.positions[index];
            entry.liquidity = entry
                .liquidity
                .checked_add(liquidity)
                .ok_or(LedgerError::LiquidityOverflow)?;
            return Ok(*entry);
        }

        if self.positions.len() >= self.max_positions {
            return Err(LedgerError::CapacityExceeded {
                max: self.max_positions,
            });
        }
        let position = Position::new(tick_lower, tick_upper, liquidity);
        self.positions.push(position);
        Ok(position)
    }

    /// Removes liquidity from a range, deleting the entry when it reaches zero.
    ///
    /// Returns the liquidity left in the range.
    pub fn remove(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<u128, LedgerError> {
        let index = self
            .find(tick_lower, tick_upper)
            .ok_or(LedgerError::NotFound {
                lower: tick_lower,
                upper: tick_upper,
            })?;

        let entry = &mut self.positions[index];
        if liquidity > entry.liquidity {
            return Err(LedgerError::InsufficientLiquidity {
                available: entry.liquidity,
                requested: liquidity,
            });
        }
        entry.liquidity -= liquidity;
        let remaining = entry.liquidity;
        if remaining == 0 {
            self.positions.remove(index);
        }
        Ok(remaining)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }
}
