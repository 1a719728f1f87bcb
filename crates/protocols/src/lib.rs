//! Collaborator interfaces of the vault engine.
//!
//! The vault never talks to a concrete venue. It sees:
//! - [`TokenLedger`]: ERC20 balances and allowances for every token
//! - [`ConcentratedPool`]: the AMM pool holding the vault's positions
//! - [`AggregatorRouter`]: an allow-listed external swap router

/// Prelude module for convenient imports.
pub mod prelude;

/// Collaborator errors.
pub mod error;
/// Concentrated liquidity pool interface.
pub mod pool;
/// External aggregator router interface.
pub mod router;
/// Token ledger interface.
pub mod token;

pub use error::{PoolError, RouterError, TokenError};
pub use pool::{
    CollectParams, ConcentratedPool, MintParams, PoolPosition, Slot0, SwapAmount, SwapParams,
    SwapResult,
};
pub use router::{AggregatorRouter, SwapDescription, SwapReturn};
pub use token::{RestrictedLedger, TokenLedger};
