//! Vault configuration.

use clmm_vault_domain::fees::{FeeConfig, FeeConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest decimal offset between the share token and token0.
pub const MAX_DECIMAL_OFFSET: u8 = 18;

/// Default cap on open positions.
pub const DEFAULT_MAX_POSITIONS: usize = 5;

/// Rejected vault configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("decimal offset {0} exceeds {max}", max = MAX_DECIMAL_OFFSET)]
    DecimalOffsetTooLarge(u8),
    #[error("share decimals overflow: token0 has {token0_decimals}, offset {offset}")]
    DecimalsOverflow { token0_decimals: u8, offset: u8 },
    #[error("max positions must be positive")]
    ZeroMaxPositions,
    #[error("pool tokens must be distinct")]
    IdenticalTokens,
    #[error(transparent)]
    Fee(#[from] FeeConfigError),
}

/// How the exit fee is paid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitFeeSettlement {
    /// Part of the redeemed shares goes to the fee recipient unburned.
    #[default]
    Shares,
    /// Part of each withdrawn token goes to the fee recipient.
    Tokens,
}

/// Static configuration of a vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
    /// Share decimals are token0 decimals plus this offset.
    pub decimal_offset: u8,
    /// Maximum number of open positions.
    pub max_positions: usize,
    pub exit_fee_settlement: ExitFeeSettlement,
    /// Initial fees.
    pub fee_config: FeeConfig,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            name: "CLMM Vault Share".to_string(),
            symbol: "CVS".to_string(),
            decimal_offset: 0,
            max_positions: DEFAULT_MAX_POSITIONS,
            exit_fee_settlement: ExitFeeSettlement::Shares,
            fee_config: FeeConfig::default(),
        }
    }
}

impl VaultConfig {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_decimal_offset(mut self, decimal_offset: u8) -> Self {
        self.decimal_offset = decimal_offset;
        self
    }

    #[must_use]
    pub fn with_max_positions(mut self, max_positions: usize) -> Self {
        self.max_positions = max_positions;
        self
    }

    #[must_use]
    pub fn with_exit_fee_settlement(mut self, settlement: ExitFeeSettlement) -> Self {
        self.exit_fee_settlement = settlement;
        self
    }

    #[must_use]
    pub fn with_fee_config(mut self, fee_config: FeeConfig) -> Self {
        self.fee_config = fee_config;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decimal_offset > MAX_DECIMAL_OFFSET {
            return Err(ConfigError::DecimalOffsetTooLarge(self.decimal_offset));
        }
        if self.max_positions == 0 {
            return Err(ConfigError::ZeroMaxPositions);
        }
        self.fee_config.validate()?;
        Ok(())
    }

    /// Share decimals for a token0 with `token0_decimals`.
    pub fn share_decimals(&self, token0_decimals: u8) -> Result<u8, ConfigError> {
        token0_decimals
            .checked_add(self.decimal_offset)
            .ok_or(ConfigError::DecimalsOverflow {
                token0_decimals,
                offset: self.decimal_offset,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_vault_domain::token::Address;

    #[test]
    fn test_default_is_valid() {
        let config = VaultConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_positions, 5);
        assert_eq!(config.exit_fee_settlement, ExitFeeSettlement::Shares);
    }

    #[test]
    fn test_validation() {
        let config = VaultConfig::default().with_decimal_offset(19);
        assert_eq!(config.validate(), Err(ConfigError::DecimalOffsetTooLarge(19)));

        let config = VaultConfig::default().with_max_positions(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxPositions));

        let fees = FeeConfig::new(Address::zero()).with_management_fee(1_000_001);
        let config = VaultConfig::default().with_fee_config(fees);
        assert!(matches!(config.validate(), Err(ConfigError::Fee(_))));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::DecimalOffsetTooLarge(19).to_string(),
            "decimal offset 19 exceeds 18"
        );
        assert_eq!(
            ConfigError::from(FeeConfigError::PerformanceTooHigh(1_000_001)).to_string(),
            "performance fee 1000001 exceeds 1000000 ppm"
        );
    }

    #[test]
    fn test_share_decimals() {
        let config = VaultConfig::default().with_decimal_offset(6);
        assert_eq!(config.share_decimals(6), Ok(12));
        assert!(config.share_decimals(u8::MAX).is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{ "name": "Test", "symbol": "TV", "exit_fee_settlement": "tokens" }"#;
        let config: VaultConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.exit_fee_settlement, ExitFeeSettlement::Tokens);
        assert_eq!(config.max_positions, DEFAULT_MAX_POSITIONS);
    }
}
