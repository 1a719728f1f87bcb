//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use clmm_vault_execution::prelude::*;
//! ```

// Configuration
pub use crate::config::{ConfigError, ExitFeeSettlement, VaultConfig};

// Calls
pub use crate::context::CallContext;
pub use crate::error::{Role, VaultError, VaultResult};

// Events
pub use crate::events::{EventLog, SwapVenue, VaultEvent, VaultEventKind};

// Fees
pub use crate::fee_settlement::FeeSettlement;

// Positions
pub use crate::position_manager::{AddLiquidityParams, RemoveLiquidityParams, RemovedLiquidity};
pub use crate::valuation::PositionValue;

// Swaps
pub use crate::swap_executor::{SwapInputParams, SwapOutcome, SwapOutputParams, SwapRoute};

// Vault
pub use crate::shares::ShareToken;
pub use crate::state::VaultState;
pub use crate::vault::Vault;
