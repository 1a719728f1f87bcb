//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_simulation::prelude::*;
//! ```

// Market
pub use crate::market::{Market, MarketConfig, addresses};

// Order flow
pub use crate::order_flow::{OrderFlowError, RandomOrderFlow, Trade, execute_trade};

// Pool
pub use crate::pool::{PoolConfig, SimulatedPool};

// Routers
pub use crate::router::{FixedRateRouter, HostileBehavior, HostileRouter};

// Tokens
pub use crate::token_bank::TokenBank;
