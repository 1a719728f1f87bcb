//! Management and performance fee checkpoints.
//!
//! Fees are settled before every deposit, withdrawal and fee configuration
//! change, and on demand through [`Vault::collect_management_fee`]. Both
//! fees are paid by minting shares to the fee recipient.

use crate::context::CallContext;
use crate::error::VaultResult;
use crate::events::VaultEventKind;
use crate::vault::Vault;
use clmm_vault_domain::fees::{FeeConfig, FeeEngine};
use clmm_vault_protocols::pool::ConcentratedPool;
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use tracing::{debug, info};

/// Shares minted by one checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeSettlement {
    pub management_shares: U256,
    pub performance_shares: U256,
}

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Settles accrued management and performance fees. Anyone may call.
    pub fn collect_management_fee(&mut self, ctx: CallContext) -> VaultResult<FeeSettlement> {
        self.atomically("collect_management_fee", |vault| vault.settle_fees(&ctx))
    }

    /// Replaces the fee configuration after settling under the old one.
    pub fn set_fee_config(&mut self, ctx: CallContext, fee_config: FeeConfig) -> VaultResult<()> {
        self.atomically("set_fee_config", |vault| {
            vault.require_owner(&ctx)?;
            fee_config.validate()?;
            vault.settle_fees(&ctx)?;

            vault.state.fee_config = fee_config;
            info!(
                recipient = ?fee_config.fee_recipient,
                entry_fee = fee_config.entry_fee,
                exit_fee = fee_config.exit_fee,
                performance_fee = fee_config.performance_fee,
                management_fee = fee_config.management_fee,
                "Fee config updated"
            );
            vault.record(&ctx, VaultEventKind::FeeConfigUpdated(fee_config));
            Ok(())
        })
    }

    /// Fee checkpoint: management fee for the elapsed time, then the
    /// performance fee against the high-water mark.
    pub(crate) fn settle_fees(&mut self, ctx: &CallContext) -> VaultResult<FeeSettlement> {
        let now = ctx.timestamp.max(self.state.last_collect_management_fee);
        let config = self.state.fee_config;
        let recipient = config.fee_recipient;
        let total = self.state.shares.total_supply();

        if total.is_zero() {
            self.state.last_collect_management_fee = now;
            self.state.high_water_mark.reset();
            return Ok(FeeSettlement::default());
        }

        let management_shares = FeeEngine::new(config).management_fee_accrued(
            total,
            self.state.last_collect_management_fee,
            now,
        )?;
        self.state.last_collect_management_fee = now;
        if !management_shares.is_zero() {
            self.state.shares.mint(recipient, management_shares)?;
            debug!(shares = %management_shares, "Management fee minted");
            self.record(
                ctx,
                VaultEventKind::ManagementFeeCollected {
                    recipient,
                    shares: management_shares,
                },
            );
        }

        let value = self.estimated_value_in_token0()?;
        let total = self.state.shares.total_supply();
        let charge = self
            .state
            .high_water_mark
            .checkpoint(total, value, config.performance_fee)?;
        if !charge.fee_shares.is_zero() {
            self.state.shares.mint(recipient, charge.fee_shares)?;
            debug!(
                shares = %charge.fee_shares,
                profit = %charge.profit,
                "Performance fee minted"
            );
            self.record(
                ctx,
                VaultEventKind::PerformanceFeeCollected {
                    recipient,
                    shares: charge.fee_shares,
                    profit: charge.profit,
                },
            );
        }

        Ok(FeeSettlement {
            management_shares,
            performance_shares: charge.fee_shares,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use crate::error::VaultError;
    use clmm_vault_domain::fees::FeeConfigError;
    use clmm_vault_domain::token::Address;
    use clmm_vault_simulation::prelude::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn vault(fee_config: FeeConfig) -> Vault<SimulatedPool, TokenBank> {
        let market = Market::new(&MarketConfig::default()).unwrap();
        Vault::new(
            CallContext::new(addr(1), 1_000),
            addr(0x5000),
            market.pool,
            market.bank,
            VaultConfig::default().with_fee_config(fee_config),
        )
        .unwrap()
    }

    #[test]
    fn test_checkpoint_on_empty_vault() {
        let mut vault = vault(FeeConfig::new(addr(20)).with_management_fee(20_000));

        let settled = vault
            .collect_management_fee(CallContext::new(addr(42), 1_000 + 86_400))
            .unwrap();
        assert_eq!(settled, FeeSettlement::default());
        assert_eq!(vault.last_collect_management_fee(), 1_000 + 86_400);
        assert!(vault.events().is_empty());
    }

    #[test]
    fn test_clock_never_moves_back() {
        let mut vault = vault(FeeConfig::new(addr(20)));
        vault
            .collect_management_fee(CallContext::new(addr(42), 5_000))
            .unwrap();
        vault
            .collect_management_fee(CallContext::new(addr(42), 2_000))
            .unwrap();
        assert_eq!(vault.last_collect_management_fee(), 5_000);
    }

    #[test]
    fn test_rejected_fee_config_is_not_applied() {
        let initial = FeeConfig::new(addr(20)).with_exit_fee(1_000);
        let mut vault = vault(initial);

        let err = vault
            .set_fee_config(
                CallContext::new(addr(1), 1_000),
                FeeConfig::new(addr(20)).with_management_fee(1_000_001),
            )
            .unwrap_err();
        assert_eq!(
            err,
            VaultError::InvalidFeeConfig(FeeConfigError::ManagementTooHigh(1_000_001))
        );
        assert_eq!(*vault.fee_config(), initial);
    }
}
