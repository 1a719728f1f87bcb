//! Vault engine.
//!
//! This crate implements the share-based vault over a concentrated
//! liquidity pool:
//! - Share minting and redemption with proportional token amounts
//! - Manager-driven liquidity positions with slippage and deadline bounds
//! - Entry, exit, management and performance fees
//! - Bounded swaps through the pool or an allow-listed aggregator
//! - All-or-nothing calls with a reentrancy guard and an event log

/// Prelude module for convenient imports.
pub mod prelude;

/// Vault configuration.
pub mod config;
/// Call context.
pub mod context;
/// Vault errors.
pub mod error;
/// Event log.
pub mod events;
/// Management and performance fee settlement.
pub mod fee_settlement;
/// Reentrancy guard.
pub mod guard;
/// Liquidity management and position queries.
pub mod position_manager;
/// Deposits and withdrawals.
pub mod share_accounting;
/// Share token balances.
pub mod shares;
/// Persistent vault state.
pub mod state;
/// Pool and aggregator swaps.
pub mod swap_executor;
/// Read-only valuation.
pub mod valuation;
/// The vault aggregate.
pub mod vault;
