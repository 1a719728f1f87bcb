//! 512-bit intermediate multiplication and division.

use crate::error::MathError;
use primitive_types::{U256, U512};

/// Computes `floor(a * b / denominator)` without intermediate overflow.
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(denominator);
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// Computes `ceil(a * b / denominator)` without intermediate overflow.
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let product = a.full_mul(b);
    let denominator = U512::from(denominator);
    let mut quotient = product / denominator;
    if !(product % denominator).is_zero() {
        quotient += U512::one();
    }
    U256::try_from(quotient).map_err(|_| MathError::Overflow)
}

/// Computes `ceil(a / b)`.
pub fn div_rounding_up(a: U256, b: U256) -> Result<U256, MathError> {
    if b.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    let quotient = a / b;
    if (a % b).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Checked addition mapped into [`MathError`].
pub fn add(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_add(b).ok_or(MathError::Overflow)
}

/// Checked subtraction mapped into [`MathError`].
pub fn sub(a: U256, b: U256) -> Result<U256, MathError> {
    a.checked_sub(b).ok_or(MathError::Underflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_div_rounding() {
        let a = U256::from(10u64);
        let b = U256::from(10u64);
        let d = U256::from(3u64);

        assert_eq!(mul_div(a, b, d).unwrap(), U256::from(33u64));
        assert_eq!(mul_div_rounding_up(a, b, d).unwrap(), U256::from(34u64));

        // Exact division does not round up
        let d = U256::from(4u64);
        assert_eq!(mul_div_rounding_up(a, b, d).unwrap(), U256::from(25u64));
    }

    #[test]
    fn test_mul_div_wide_intermediate() {
        // MAX * MAX / MAX fits even though the product needs 512 bits
        let result = mul_div(U256::MAX, U256::MAX, U256::MAX).unwrap();
        assert_eq!(result, U256::MAX);
    }

    #[test]
    fn test_mul_div_errors() {
        assert_eq!(
            mul_div(U256::one(), U256::one(), U256::zero()),
            Err(MathError::DivisionByZero)
        );
        assert_eq!(
            mul_div(U256::MAX, U256::MAX, U256::one()),
            Err(MathError::Overflow)
        );
    }

    #[test]
    fn test_div_rounding_up() {
        assert_eq!(
            div_rounding_up(U256::from(7u64), U256::from(2u64)).unwrap(),
            U256::from(4u64)
        );
        assert_eq!(
            div_rounding_up(U256::from(8u64), U256::from(2u64)).unwrap(),
            U256::from(4u64)
        );
    }
}
