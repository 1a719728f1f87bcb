//! Conversions between token amounts and liquidity at a given price.
//!
//! Liquidity for amounts always rounds down, so a caller can never size a
//! mint larger than the supplied tokens support. Amounts for liquidity also
//! round down; the pool rounds up on mint and down on burn on its own.

use super::Q96_RESOLUTION;
use super::full_math::mul_div;
use super::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use crate::error::MathError;
use primitive_types::U256;

fn q96() -> U256 {
    U256::one() << Q96_RESOLUTION
}

fn ordered(a: U256, b: U256) -> (U256, U256) {
    if a > b { (b, a) } else { (a, b) }
}

fn to_liquidity(value: U256) -> Result<u128, MathError> {
    if value > U256::from(u128::MAX) {
        return Err(MathError::Overflow);
    }
    Ok(value.as_u128())
}

/// Liquidity supported by `amount0` over `[sqrt_a, sqrt_b]`.
/// L = amount0 * (sqrt(P_a) * sqrt(P_b)) / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount0(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount0: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);
    if lower == upper {
        return Err(MathError::DivisionByZero);
    }
    let intermediate = mul_div(lower, upper, q96())?;
    to_liquidity(mul_div(amount0, intermediate, upper - lower)?)
}

/// Liquidity supported by `amount1` over `[sqrt_a, sqrt_b]`.
/// L = amount1 / (sqrt(P_b) - sqrt(P_a))
pub fn get_liquidity_for_amount1(
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);
    if lower == upper {
        return Err(MathError::DivisionByZero);
    }
    to_liquidity(mul_div(amount1, q96(), upper - lower)?)
}

/// Maximum liquidity that both amounts support at the current price.
pub fn get_liquidity_for_amounts(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    amount0: U256,
    amount1: U256,
) -> Result<u128, MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price <= lower {
        get_liquidity_for_amount0(lower, upper, amount0)
    } else if sqrt_price < upper {
        let liquidity0 = get_liquidity_for_amount0(sqrt_price, upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(lower, sqrt_price, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(lower, upper, amount1)
    }
}

/// Token amounts represented by `liquidity` at the current price, rounded down.
pub fn get_amounts_for_liquidity(
    sqrt_price: U256,
    sqrt_ratio_a: U256,
    sqrt_ratio_b: U256,
    liquidity: u128,
) -> Result<(U256, U256), MathError> {
    let (lower, upper) = ordered(sqrt_ratio_a, sqrt_ratio_b);

    if sqrt_price <= lower {
        Ok((get_amount0_delta(lower, upper, liquidity, false)?, U256::zero()))
    } else if sqrt_price < upper {
        Ok((
            get_amount0_delta(sqrt_price, upper, liquidity, false)?,
            get_amount1_delta(lower, sqrt_price, liquidity, false)?,
        ))
    } else {
        Ok((U256::zero(), get_amount1_delta(lower, upper, liquidity, false)?))
    }
}
