//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_protocols::prelude::*;
//! ```

pub use crate::error::{PoolError, RouterError, TokenError};
pub use crate::pool::{
    CollectParams, ConcentratedPool, MintParams, PoolPosition, Slot0, SwapAmount, SwapParams,
    SwapResult,
};
pub use crate::router::{AggregatorRouter, SwapDescription, SwapReturn};
pub use crate::token::{RestrictedLedger, TokenLedger};
