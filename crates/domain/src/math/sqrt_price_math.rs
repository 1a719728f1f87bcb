//! Token deltas between two sqrt prices and next-price computation.
//!
//! All prices are Q64.96. Rounding direction is explicit on every function
//! so callers can always round against the party asking for tokens.

use super::Q96_RESOLUTION;
use super::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::error::MathError;
use primitive_types::{U256, U512};

fn q96() -> U256 {
    U256::one() << Q96_RESOLUTION
}

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

/// Amount of token0 between two prices for a given liquidity.
/// delta_x = L * (sqrt(P_b) - sqrt(P_a)) / (sqrt(P_a) * sqrt(P_b))
pub fn get_amount0_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);
    if lower.is_zero() {
        return Err(MathError::ZeroSqrtPrice);
    }

    let numerator1 = U256::from(liquidity) << Q96_RESOLUTION;
    let numerator2 = upper - lower;

    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, upper)?, lower)
    } else {
        Ok(mul_div(numerator1, numerator2, upper)? / lower)
    }
}

/// Amount of token1 between two prices for a given liquidity.
/// delta_y = L * (sqrt(P_b) - sqrt(P_a))
pub fn get_amount1_delta(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);
    let diff = upper - lower;

    if round_up {
        mul_div_rounding_up(U256::from(liquidity), diff, q96())
    } else {
        mul_div(U256::from(liquidity), diff, q96())
    }
}

/// Next sqrt price after adding or removing `amount` of token0, rounded up.
fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, MathError> {
    if amount.is_zero() {
        return Ok(sqrt_price);
    }
    let numerator1 = U512::from(U256::from(liquidity) << Q96_RESOLUTION);
    let product = amount.full_mul(sqrt_price);

    let denominator = if add {
        numerator1 + product
    } else {
        if numerator1 <= product {
            return Err(MathError::Underflow);
        }
        numerator1 - product
    };

    let full = numerator1 * U512::from(sqrt_price);
    let mut quotient = full / denominator;
    if !(full % denominator).is_zero() {
        quotient += U512::one();
    }
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// Next sqrt price after adding or removing `amount` of token1, rounded down.
fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, MathError> {
    let liquidity = U256::from(liquidity);
    if add {
        let quotient = mul_div(amount, q96(), liquidity)?;
        sqrt_price.checked_add(quotient).ok_or(MathError::Overflow)
    } else {
        let quotient = mul_div_rounding_up(amount, q96(), liquidity)?;
        if sqrt_price <= quotient {
            return Err(MathError::Underflow);
        }
        Ok(sqrt_price - quotient)
    }
}

/// Next sqrt price after `amount_in` enters the pool.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, MathError> {
    if sqrt_price.is_zero() {
        return Err(MathError::ZeroSqrtPrice);
    }
    if liquidity == 0 {
        return Err(MathError::ZeroLiquidity);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
    }
}

/// Next sqrt price after `amount_out` leaves the pool.
pub fn get_next_sqrt_price_from_output(
    sqrt_price: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256, MathError> {
    if sqrt_price.is_zero() {
        return Err(MathError::ZeroSqrtPrice);
    }
    if liquidity == 0 {
        return Err(MathError::ZeroLiquidity);
    }
    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_deltas() {
        // Liquidity 1000, sqrt price 1 -> 2:
        // delta_y = 1000 * (2 - 1) = 1000
        // delta_x = 1000 * (1/1 - 1/2) = 500
        let liquidity = 1000u128;
        let sqrt_a = q96();
        let sqrt_b = q96() * 2;

        let dy = get_amount1_delta(sqrt_a, sqrt_b, liquidity, false).unwrap();
        assert_eq!(dy, U256::from(1000u64));

        let dx = get_amount0_delta(sqrt_a, sqrt_b, liquidity, false).unwrap();
        assert_eq!(dx, U256::from(500u64));

        // Order of the bounds does not matter
        let dx_rev = get_amount0_delta(sqrt_b, sqrt_a, liquidity, false).unwrap();
        assert_eq!(dx, dx_rev);
    }

    #[test]
    fn test_rounding_direction() {
        // sqrt price 1 -> 1.5 with L = 1 gives fractional amounts
        let sqrt_a = q96();
        let sqrt_b = q96() * 3 / 2;
        let liquidity = 7u128;

        let down0 = get_amount0_delta(sqrt_a, sqrt_b, liquidity, false).unwrap();
        let up0 = get_amount0_delta(sqrt_a, sqrt_b, liquidity, true).unwrap();
        assert_eq!(up0, down0 + 1);

        let down1 = get_amount1_delta(sqrt_a, sqrt_b, liquidity, false).unwrap();
        let up1 = get_amount1_delta(sqrt_a, sqrt_b, liquidity, true).unwrap();
        assert_eq!(down1, U256::from(3u64));
        assert_eq!(up1, U256::from(4u64));
    }

    #[test]
    fn test_next_price_from_input() {
        let price = q96();
        let liquidity = 1_000_000u128;

        // token1 in pushes the price up by amount / L
        let next = get_next_sqrt_price_from_input(price, liquidity, U256::from(1_000u64), false)
            .unwrap();
        assert_eq!(next, price + price / 1000);

        // token0 in pushes the price down
        let next = get_next_sqrt_price_from_input(price, liquidity, U256::from(1_000u64), true)
            .unwrap();
        assert!(next < price);
    }

    #[test]
    fn test_next_price_from_output_cannot_drain() {
        let price = q96();
        let liquidity = 1_000u128;
        let result =
            get_next_sqrt_price_from_output(price, liquidity, U256::from(2_000u64), true);
        assert_eq!(result, Err(MathError::Underflow));
    }

    #[test]
    fn test_zero_liquidity_rejected() {
        assert_eq!(
            get_next_sqrt_price_from_input(q96(), 0, U256::one(), true),
            Err(MathError::ZeroLiquidity)
        );
    }
}
