//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_domain::prelude::*;
//! ```

// Errors
pub use crate::error::MathError;

// Fees
pub use crate::fees::{
    FEE_MULTIPLIER, FeeConfig, FeeConfigError, FeeEngine, HighWaterMark, MAX_ENTRY_EXIT_FEE,
    PerformanceCharge, SECONDS_IN_A_YEAR, management_fee_accrued,
};

// Math
pub use crate::math::full_math::{mul_div, mul_div_rounding_up};
pub use crate::math::liquidity_amounts::{get_amounts_for_liquidity, get_liquidity_for_amounts};
pub use crate::math::tick_math::{
    MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_sqrt_ratio,
    min_sqrt_ratio,
};

// Positions
pub use crate::position::{LedgerError, Position, PositionLedger};

// Tokens
pub use crate::token::{Address, TokenAmounts, TokenPair};

pub use primitive_types::U256;
