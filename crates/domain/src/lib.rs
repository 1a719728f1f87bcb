//! Domain model for the concentrated liquidity vault.
//!
//! This crate holds everything that is pure and deterministic:
//! - Full precision integer math for Q64.96 prices and liquidity
//! - Fee configuration and fee computation
//! - The ledger of concentrated liquidity positions
//! - Token and address primitives

/// Prelude module for convenient imports.
pub mod prelude;

/// Domain errors.
pub mod error;
/// Fee configuration and computation.
pub mod fees;
/// Integer math for ticks, prices and liquidity.
pub mod math;
/// Positions and the position ledger.
pub mod position;
/// Token primitives.
pub mod token;
