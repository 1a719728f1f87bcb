//! Single swap step within one initialized tick interval.

use clmm_vault_domain::error::MathError;
use clmm_vault_domain::fees::FEE_MULTIPLIER;
use clmm_vault_domain::math::full_math::{mul_div, mul_div_rounding_up};
use clmm_vault_domain::math::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use primitive_types::U256;

/// Outcome of one swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStep {
    /// Price after the step.
    pub sqrt_price_next_x96: U256,
    /// Input consumed, excluding fees.
    pub amount_in: U256,
    pub amount_out: U256,
    /// Fee charged on the input.
    pub fee_amount: U256,
}

/// Computes how far one step moves the price toward `sqrt_price_target_x96`.
///
/// `amount_remaining` is input left to sell when `exact_input`, otherwise
/// output left to buy. The direction follows from the target: a target
/// below the current price sells token0.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: U256,
    exact_input: bool,
    fee_pips: u32,
) -> Result<SwapStep, MathError> {
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let fee_complement = U256::from(FEE_MULTIPLIER - fee_pips);
    let multiplier = U256::from(FEE_MULTIPLIER);

    let mut amount_in = U256::zero();
    let mut amount_out = U256::zero();

    let sqrt_price_next_x96 = if exact_input {
        let remaining_less_fee = mul_div(amount_remaining, fee_complement, multiplier)?;
        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)?
        } else {
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)?
        };
        if remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                remaining_less_fee,
                zero_for_one,
            )?
        }
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)?
        } else {
            get_amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)?
        };
        if amount_remaining >= amount_out {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining,
                zero_for_one,
            )?
        }
    };

    let reached_target = sqrt_price_next_x96 == sqrt_price_target_x96;

    if zero_for_one {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount0_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount1_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false)?;
        }
    } else {
        if !(reached_target && exact_input) {
            amount_in =
                get_amount1_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, true)?;
        }
        if !(reached_target && !exact_input) {
            amount_out =
                get_amount0_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, false)?;
        }
    }

    // Output is capped at what was asked for
    if !exact_input && amount_out > amount_remaining {
        amount_out = amount_remaining;
    }

    let fee_amount = if exact_input && !reached_target {
        // The whole remainder is consumed; whatever is not input is fee
        amount_remaining - amount_in
    } else {
        mul_div_rounding_up(amount_in, U256::from(fee_pips), fee_complement)?
    };

    Ok(SwapStep {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q96() -> U256 {
        U256::one() << 96
    }

    #[test]
    fn test_exact_input_reaches_target() {
        // Plenty of input to reach the target at L = 1e18
        let current = q96();
        let target = q96() * 101 / 100;
        let liquidity = 10u128.pow(18);
        let step =
            compute_swap_step(current, target, liquidity, U256::exp10(18), true, 3_000).unwrap();

        assert_eq!(step.sqrt_price_next_x96, target);
        // 1e18 * 0.01 = 1e16 of token1 in
        assert_eq!(step.amount_in, U256::exp10(16));
        assert!(step.amount_out > U256::zero());
        assert!(step.fee_amount > U256::zero());
    }

    #[test]
    fn test_exact_input_stops_short() {
        let current = q96();
        let target = q96() * 2;
        let liquidity = 10u128.pow(18);
        let remaining = U256::exp10(15);
        let step = compute_swap_step(current, target, liquidity, remaining, true, 3_000).unwrap();

        assert!(step.sqrt_price_next_x96 < target);
        assert!(step.sqrt_price_next_x96 > current);
        assert_eq!(step.amount_in + step.fee_amount, remaining);
    }

    #[test]
    fn test_exact_output_capped() {
        let current = q96();
        let target = q96() / 2;
        let liquidity = 10u128.pow(18);
        let wanted = U256::exp10(15);
        let step = compute_swap_step(current, target, liquidity, wanted, false, 500).unwrap();

        assert_eq!(step.amount_out, wanted);
        assert!(step.sqrt_price_next_x96 < current);
        assert!(step.amount_in > wanted);
    }

    #[test]
    fn test_zero_liquidity_jumps_to_target() {
        let current = q96();
        let target = q96() * 2;
        let step = compute_swap_step(current, target, 0, U256::exp10(18), true, 3_000).unwrap();

        assert_eq!(step.sqrt_price_next_x96, target);
        assert_eq!(step.amount_in, U256::zero());
        assert_eq!(step.amount_out, U256::zero());
        assert_eq!(step.fee_amount, U256::zero());
    }
}
