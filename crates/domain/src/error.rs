use thiserror::Error;

/// Errors raised by the integer math helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// Result does not fit in the target integer width.
    #[error("arithmetic overflow")]
    Overflow,
    /// A subtraction went below zero.
    #[error("arithmetic underflow")]
    Underflow,
    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Tick outside `[MIN_TICK, MAX_TICK]`.
    #[error("tick {0} out of bounds")]
    TickOutOfBounds(i32),
    /// Sqrt price outside `[MIN_SQRT_RATIO, MAX_SQRT_RATIO)`.
    #[error("sqrt price out of bounds")]
    SqrtPriceOutOfBounds,
    /// Sqrt price must be strictly positive.
    #[error("sqrt price must be positive")]
    ZeroSqrtPrice,
    /// Liquidity must be strictly positive.
    #[error("liquidity must be positive")]
    ZeroLiquidity,
}
