//! Vault fees.
//!
//! Rates are expressed in parts per million of [`FEE_MULTIPLIER`].

/// Fee configuration and validation.
pub mod config;
/// Fee computation.
pub mod engine;
/// High-water mark for the performance fee.
pub mod performance;

pub use config::{FeeConfig, FeeConfigError};
pub use engine::{FeeEngine, management_fee_accrued};
pub use performance::{HighWaterMark, PerformanceCharge};

/// Denominator of every fee rate.
pub const FEE_MULTIPLIER: u32 = 1_000_000;
/// Maximum combined entry and exit fee (50%).
pub const MAX_ENTRY_EXIT_FEE: u32 = 500_000;
/// Seconds in the 365 day year used for management fee accrual.
pub const SECONDS_IN_A_YEAR: u64 = 31_536_000;
