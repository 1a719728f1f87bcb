//! In-memory market for driving the vault engine.
//!
//! Provides concrete collaborators behind the protocol traits:
//! - [`pool::SimulatedPool`]: a tick-crossing concentrated liquidity pool
//! - [`token_bank::TokenBank`]: ERC20 balances and allowances
//! - [`router`]: fixed-rate and hostile aggregator routers
//! - [`order_flow`]: seeded random trades to move the price

/// Prelude module for convenient imports.
pub mod prelude;

/// Two tokens and a pool with background liquidity.
pub mod market;
/// Seeded random trades.
pub mod order_flow;
/// Concentrated liquidity pool.
pub mod pool;
/// Aggregator routers.
pub mod router;
/// Single swap step math.
pub mod swap_math;
/// ERC20 ledger.
pub mod token_bank;
