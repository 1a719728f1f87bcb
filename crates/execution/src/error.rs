//! Vault errors.
//!
//! Every error aborts the whole call: the vault restores its state, the
//! pool and the token ledger to what they were before the call started.

use crate::config::ConfigError;
use clmm_vault_domain::error::MathError;
use clmm_vault_domain::fees::FeeConfigError;
use clmm_vault_domain::position::LedgerError;
use clmm_vault_domain::token::Address;
use clmm_vault_protocols::error::{PoolError, RouterError, TokenError};
use primitive_types::U256;
use std::fmt;
use thiserror::Error;

/// Role required by a gated call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Manager,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "owner"),
            Role::Manager => write!(f, "manager"),
        }
    }
}

/// Errors returned by vault calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("{caller:?} is not the {role}")]
    Unauthorized { caller: Address, role: Role },
    #[error("invalid fee config: {0}")]
    InvalidFeeConfig(#[from] FeeConfigError),
    #[error("slippage exceeded: amount {amount} violates bound {bound}")]
    SlippageExceeded { amount: U256, bound: U256 },
    #[error("deadline {deadline} expired at {now}")]
    DeadlineExpired { deadline: u64, now: u64 },
    #[error("insufficient shares: available {available}, requested {requested}")]
    InsufficientShares { available: U256, requested: U256 },
    #[error("insufficient liquidity: available {available}, requested {requested}")]
    InsufficientLiquidity { available: u128, requested: u128 },
    #[error("position [{tick_lower}, {tick_upper}) not found")]
    PositionNotFound { tick_lower: i32, tick_upper: i32 },
    #[error("router mismatch: expected {expected:?}, got {actual:?}")]
    RouterMismatch {
        expected: Option<Address>,
        actual: Address,
    },
    #[error("invalid tick range [{tick_lower}, {tick_upper})")]
    InvalidTickRange { tick_lower: i32, tick_upper: i32 },
    #[error("position limit of {max} reached")]
    PositionLimitExceeded { max: usize },
    #[error("amount must be positive")]
    ZeroAmount,
    #[error("swap tokens {src:?} -> {dst:?} are not the vault pair")]
    InvalidSwapTokens { src: Address, dst: Address },
    #[error("reentrant call")]
    ReentrantCall,
    #[error("no router deployed at {0:?}")]
    RouterUnavailable(Address),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Router(#[from] RouterError),
}

impl From<LedgerError> for VaultError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidRange { lower, upper } => VaultError::InvalidTickRange {
                tick_lower: lower,
                tick_upper: upper,
            },
            LedgerError::NotFound { lower, upper } => VaultError::PositionNotFound {
                tick_lower: lower,
                tick_upper: upper,
            },
            LedgerError::InsufficientLiquidity {
                available,
                requested,
            } => VaultError::InsufficientLiquidity {
                available,
                requested,
            },
            LedgerError::CapacityExceeded { max } => VaultError::PositionLimitExceeded { max },
            LedgerError::LiquidityOverflow => VaultError::Math(MathError::Overflow),
            LedgerError::ZeroLiquidity => VaultError::ZeroAmount,
        }
    }
}

/// Result type of vault calls.
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_map_to_vault_taxonomy() {
        assert_eq!(
            VaultError::from(LedgerError::NotFound {
                lower: -60,
                upper: 60
            }),
            VaultError::PositionNotFound {
                tick_lower: -60,
                tick_upper: 60
            }
        );
        assert_eq!(
            VaultError::from(LedgerError::CapacityExceeded { max: 5 }),
            VaultError::PositionLimitExceeded { max: 5 }
        );
        assert_eq!(
            VaultError::from(LedgerError::ZeroLiquidity),
            VaultError::ZeroAmount
        );
    }

    #[test]
    fn test_display() {
        let err = VaultError::Unauthorized {
            caller: Address::from_low_u64_be(1),
            role: Role::Manager,
        };
        assert!(err.to_string().ends_with("is not the manager"));
    }
}
