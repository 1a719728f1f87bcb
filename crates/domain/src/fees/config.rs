use super::{FEE_MULTIPLIER, MAX_ENTRY_EXIT_FEE};
use crate::token::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected fee configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeeConfigError {
    #[error("entry fee {entry} + exit fee {exit} exceeds {max} ppm", max = MAX_ENTRY_EXIT_FEE)]
    EntryExitTooHigh { entry: u32, exit: u32 },
    #[error("performance fee {0} exceeds {max} ppm", max = FEE_MULTIPLIER)]
    PerformanceTooHigh(u32),
    #[error("management fee {0} exceeds {max} ppm", max = FEE_MULTIPLIER)]
    ManagementTooHigh(u32),
}

/// Fee rates of a vault, in parts per million.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeConfig {
    /// Receives every fee, in tokens or in shares.
    pub fee_recipient: Address,
    /// Charged on top of each deposited amount.
    pub entry_fee: u32,
    /// Charged on each withdrawal.
    pub exit_fee: u32,
    /// Charged on value per share gains above the high-water mark.
    pub performance_fee: u32,
    /// Annual rate, accrued linearly.
    pub management_fee: u32,
}

impl FeeConfig {
    pub fn new(fee_recipient: Address) -> Self {
        Self {
            fee_recipient,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_entry_fee(mut self, entry_fee: u32) -> Self {
        self.entry_fee = entry_fee;
        self
    }

    #[must_use]
    pub fn with_exit_fee(mut self, exit_fee: u32) -> Self {
        self.exit_fee = exit_fee;
        self
    }

    #[must_use]
    pub fn with_performance_fee(mut self, performance_fee: u32) -> Self {
        self.performance_fee = performance_fee;
        self
    }

    #[must_use]
    pub fn with_management_fee(mut self, management_fee: u32) -> Self {
        self.management_fee = management_fee;
        self
    }

    /// Checks the rate caps. Values are never clamped.
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        if u64::from(self.entry_fee) + u64::from(self.exit_fee) > u64::from(MAX_ENTRY_EXIT_FEE) {
            return Err(FeeConfigError::EntryExitTooHigh {
                entry: self.entry_fee,
                exit: self.exit_fee,
            });
        }
        if self.performance_fee > FEE_MULTIPLIER {
            return Err(FeeConfigError::PerformanceTooHigh(self.performance_fee));
        }
        if self.management_fee > FEE_MULTIPLIER {
            return Err(FeeConfigError::ManagementTooHigh(self.management_fee));
        }
        Ok(())
    }
}
