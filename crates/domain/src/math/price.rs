use super::Q96_RESOLUTION;
use super::full_math::mul_div;
use crate::error::MathError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

fn q96() -> U256 {
    U256::one() << Q96_RESOLUTION
}

/// Values `amount1` in token0 at the given sqrt price, rounding down.
/// amount1 / P = amount1 * 2^192 / sqrt_price^2
pub fn token1_in_token0(amount1: U256, sqrt_price_x96: U256) -> Result<U256, MathError> {
    if sqrt_price_x96.is_zero() {
        return Err(MathError::ZeroSqrtPrice);
    }
    let partial = mul_div(amount1, q96(), sqrt_price_x96)?;
    mul_div(partial, q96(), sqrt_price_x96)
}

/// Values `amount0` in token1 at the given sqrt price, rounding down.
/// amount0 * P = amount0 * sqrt_price^2 / 2^192
pub fn token0_in_token1(amount0: U256, sqrt_price_x96: U256) -> Result<U256, MathError> {
    let partial = mul_div(amount0, sqrt_price_x96, q96())?;
    mul_div(partial, sqrt_price_x96, q96())
}

/// Human readable price of token0 in token1, adjusted for decimals.
///
/// Only for reporting: the value goes through `f64` and loses precision.
pub fn sqrt_price_to_decimal(
    sqrt_price_x96: U256,
    decimals0: u8,
    decimals1: u8,
) -> Result<Decimal, MathError> {
    // Keep 2^48 of fractional precision before dropping to f64.
    let scaled = sqrt_price_x96 >> 48;
    if scaled > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    let sqrt = scaled.as_u128() as f64 / 2f64.powi(48);
    let raw_price = sqrt * sqrt;
    let adjustment = 10f64.powi(i32::from(decimals0) - i32::from(decimals1));
    Decimal::from_f64(raw_price * adjustment).ok_or(MathError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_conversions_at_price_one() {
        let amount = U256::from(1_000_000u64);
        assert_eq!(token1_in_token0(amount, q96()).unwrap(), amount);
        assert_eq!(token0_in_token1(amount, q96()).unwrap(), amount);
    }

    #[test]
    fn test_conversions_at_price_four() {
        // sqrt price 2 -> price 4 token1 per token0
        let sqrt_price = q96() * 2;
        let amount = U256::from(1_000u64);
        assert_eq!(token0_in_token1(amount, sqrt_price).unwrap(), U256::from(4_000u64));
        assert_eq!(token1_in_token0(amount, sqrt_price).unwrap(), U256::from(250u64));
    }

    #[test]
    fn test_decimal_price() {
        let sqrt_price = q96() * 2;
        let price = sqrt_price_to_decimal(sqrt_price, 6, 6).unwrap();
        assert_eq!(price, dec!(4));

        // token0 with 8 decimals, token1 with 6: raw 4 -> 400 per whole token0
        let price = sqrt_price_to_decimal(sqrt_price, 8, 6).unwrap();
        assert_eq!(price.round_dp(6), dec!(400));
    }

    #[test]
    fn test_zero_price_rejected() {
        assert_eq!(
            token1_in_token0(U256::one(), U256::zero()),
            Err(MathError::ZeroSqrtPrice)
        );
    }
}
