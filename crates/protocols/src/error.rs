use clmm_vault_domain::error::MathError;
use clmm_vault_domain::token::Address;
use primitive_types::U256;
use thiserror::Error;

/// Errors raised by a token ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("unknown token {0:?}")]
    UnknownToken(Address),
    #[error("insufficient balance of {token:?} for {owner:?}: available {available}, required {required}")]
    InsufficientBalance {
        token: Address,
        owner: Address,
        available: U256,
        required: U256,
    },
    #[error("insufficient allowance of {token:?} for {spender:?}: available {available}, required {required}")]
    InsufficientAllowance {
        token: Address,
        spender: Address,
        available: U256,
        required: U256,
    },
    #[error("balance overflow")]
    Overflow,
    #[error("{owner:?} only releases {token:?} through allowances")]
    Restricted { token: Address, owner: Address },
}

/// Errors raised by a concentrated liquidity pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("invalid tick range [{lower}, {upper})")]
    InvalidTickRange { lower: i32, upper: i32 },
    #[error("tick {tick} is not a multiple of spacing {spacing}")]
    TickNotOnSpacing { tick: i32, spacing: i32 },
    #[error("invalid sqrt price limit {0}")]
    InvalidPriceLimit(U256),
    #[error("position [{lower}, {upper}) not found")]
    PositionNotFound { lower: i32, upper: i32 },
    #[error("insufficient liquidity: available {available}, requested {requested}")]
    InsufficientLiquidity { available: u128, requested: u128 },
    #[error("amount must be positive")]
    ZeroAmount,
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Token(#[from] TokenError),
}

/// Errors raised by an aggregator router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("return amount {actual} below minimum {minimum}")]
    ReturnAmountTooLow { actual: U256, minimum: U256 },
    #[error("route rejected: {0}")]
    Rejected(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Math(#[from] MathError),
}
