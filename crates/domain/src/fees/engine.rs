use super::config::FeeConfig;
use super::{FEE_MULTIPLIER, SECONDS_IN_A_YEAR};
use crate::error::MathError;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use primitive_types::U256;

/// Shares owed to the fee recipient for `elapsed_seconds` of management.
///
/// The fee is minted as new shares so that the recipient ends up with
/// `rate * elapsed / (FEE_MULTIPLIER * year)` of the post-mint supply:
/// `ceil(total * r * t / (FEE_MULTIPLIER * year - r * t))`.
///
/// `r * t` is capped one below the denominator base, so the result stays
/// non-decreasing in `elapsed_seconds` even past a full year at 100%.
pub fn management_fee_accrued(
    total_shares: U256,
    rate_per_million: u32,
    elapsed_seconds: u64,
) -> Result<U256, MathError> {
    if total_shares.is_zero() || rate_per_million == 0 || elapsed_seconds == 0 {
        return Ok(U256::zero());
    }

    let base = U256::from(FEE_MULTIPLIER) * U256::from(SECONDS_IN_A_YEAR);
    let accrued = U256::from(rate_per_million) * U256::from(elapsed_seconds);
    let accrued = accrued.min(base - 1);

    mul_div_rounding_up(total_shares, accrued, base - accrued)
}

/// Fee computation for one fee configuration.
#[derive(Debug, Clone, Copy)]
pub struct FeeEngine {
    config: FeeConfig,
}

impl FeeEngine {
    pub fn new(config: FeeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeeConfig {
        &self.config
    }

    /// Entry fee added on top of a deposited amount, rounded down.
    pub fn entry_fee_on(&self, amount: U256) -> Result<U256, MathError> {
        mul_div(amount, U256::from(self.config.entry_fee), U256::from(FEE_MULTIPLIER))
    }

    /// Exit fee taken out of a withdrawn amount, rounded down.
    ///
    /// Applies equally to token amounts and to shares when the exit fee is
    /// settled in share form.
    pub fn exit_fee_on(&self, amount: U256) -> Result<U256, MathError> {
        mul_div(amount, U256::from(self.config.exit_fee), U256::from(FEE_MULTIPLIER))
    }

    /// Management fee shares accrued between `last_collect` and `now`.
    pub fn management_fee_accrued(
        &self,
        total_shares: U256,
        last_collect: u64,
        now: u64,
    ) -> Result<U256, MathError> {
        management_fee_accrued(
            total_shares,
            self.config.management_fee,
            now.saturating_sub(last_collect),
        )
    }
}
