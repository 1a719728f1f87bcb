use super::FEE_MULTIPLIER;
use crate::error::MathError;
use crate::math::full_math::mul_div;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Fixed-point scale of value per share (1e18).
pub fn value_per_share_scale() -> U256 {
    U256::exp10(18)
}

/// Result of one performance fee checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceCharge {
    /// Shares to mint to the fee recipient.
    pub fee_shares: U256,
    /// Profit charged, in value units.
    pub profit: U256,
}

/// Highest value per share on which a performance fee has been settled.
///
/// Value is measured in token0 units by the caller. A fee is only charged on
/// value per share above the mark, so losses are never charged and gains are
/// never charged twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighWaterMark {
    value_per_share: Option<U256>,
}

impl HighWaterMark {
    pub fn value_per_share(&self) -> Option<U256> {
        self.value_per_share
    }

    pub fn reset(&mut self) {
        self.value_per_share = None;
    }

    /// Settles the performance fee for the current vault value.
    ///
    /// An unset mark is initialized without charging. When value per share is
    /// above the mark, `rate` of the profit is minted as dilution,
    /// `floor(fee_value * total / (value - fee_value))` shares, and the mark
    /// moves to the post-mint value per share.
    pub fn checkpoint(
        &mut self,
        total_shares: U256,
        total_value: U256,
        rate_per_million: u32,
    ) -> Result<PerformanceCharge, MathError> {
        if total_shares.is_zero() {
            self.reset();
            return Ok(PerformanceCharge::default());
        }

        let scale = value_per_share_scale();
        let current = mul_div(total_value, scale, total_shares)?;

        let Some(mark) = self.value_per_share else {
            self.value_per_share = Some(current);
            return Ok(PerformanceCharge::default());
        };
        if current <= mark {
            return Ok(PerformanceCharge::default());
        }

        let profit = mul_div(current - mark, total_shares, scale)?;
        let fee_value = mul_div(profit, U256::from(rate_per_million), U256::from(FEE_MULTIPLIER))?;

        if fee_value.is_zero() || fee_value >= total_value {
            self.value_per_share = Some(current);
            return Ok(PerformanceCharge {
                fee_shares: U256::zero(),
                profit,
            });
        }

        let fee_shares = mul_div(fee_value, total_shares, total_value - fee_value)?;
        let new_total = total_shares
            .checked_add(fee_shares)
            .ok_or(MathError::Overflow)?;
        self.value_per_share = Some(mul_div(total_value, scale, new_total)?);

        Ok(PerformanceCharge { fee_shares, profit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE_10_PCT: u32 = 100_000;

    #[test]
    fn test_first_checkpoint_initializes() {
        let mut hwm = HighWaterMark::default();
        let charge = hwm
            .checkpoint(U256::from(1_000u64), U256::from(1_000u64), RATE_10_PCT)
            .unwrap();
        assert_eq!(charge, PerformanceCharge::default());
        assert_eq!(hwm.value_per_share(), Some(value_per_share_scale()));
    }

    #[test]
    fn test_fee_on_new_profit_only() {
        let mut hwm = HighWaterMark::default();
        let shares = U256::from(1_000_000u64);
        hwm.checkpoint(shares, U256::from(1_000_000u64), RATE_10_PCT)
            .unwrap();

        // Value doubles: profit 1_000_000, fee value 100_000
        let charge = hwm
            .checkpoint(shares, U256::from(2_000_000u64), RATE_10_PCT)
            .unwrap();
        assert_eq!(charge.profit, U256::from(1_000_000u64));
        // 100_000 * 1_000_000 / 1_900_000
        assert_eq!(charge.fee_shares, U256::from(52_631u64));

        // Same value again with the post-mint supply: nothing more to charge
        let supply = shares + charge.fee_shares;
        let again = hwm
            .checkpoint(supply, U256::from(2_000_000u64), RATE_10_PCT)
            .unwrap();
        assert!(again.fee_shares.is_zero());
    }

    #[test]
    fn test_no_fee_on_loss() {
        let mut hwm = HighWaterMark::default();
        let shares = U256::from(1_000u64);
        hwm.checkpoint(shares, U256::from(1_000u64), RATE_10_PCT)
            .unwrap();
        let mark = hwm.value_per_share();

        let charge = hwm
            .checkpoint(shares, U256::from(800u64), RATE_10_PCT)
            .unwrap();
        assert!(charge.fee_shares.is_zero());
        assert_eq!(hwm.value_per_share(), mark);

        // Recovering to the old mark is not profit
        let charge = hwm
            .checkpoint(shares, U256::from(1_000u64), RATE_10_PCT)
            .unwrap();
        assert!(charge.fee_shares.is_zero());
    }

    #[test]
    fn test_zero_rate_moves_mark() {
        let mut hwm = HighWaterMark::default();
        let shares = U256::from(1_000u64);
        hwm.checkpoint(shares, U256::from(1_000u64), 0).unwrap();
        hwm.checkpoint(shares, U256::from(1_500u64), 0).unwrap();
        assert_eq!(
            hwm.value_per_share(),
            Some(value_per_share_scale() * 3 / 2)
        );
    }

    #[test]
    fn test_empty_supply_resets() {
        let mut hwm = HighWaterMark::default();
        hwm.checkpoint(U256::one(), U256::one(), RATE_10_PCT).unwrap();
        hwm.checkpoint(U256::zero(), U256::zero(), RATE_10_PCT)
            .unwrap();
        assert_eq!(hwm.value_per_share(), None);
    }
}
