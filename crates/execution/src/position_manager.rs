//! Manager-driven liquidity moves and position queries.
//!
//! The ledger is updated before the pool is called, and every pool call the
//! vault makes is against a range the ledger knows, so the two never drift
//! apart.

use crate::context::CallContext;
use crate::error::{VaultError, VaultResult};
use crate::events::VaultEventKind;
use crate::valuation::PositionValue;
use crate::vault::Vault;
use clmm_vault_domain::error::MathError;
use clmm_vault_domain::math::liquidity_amounts::{
    get_amounts_for_liquidity, get_liquidity_for_amounts,
};
use clmm_vault_domain::math::tick_math::{MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick};
use clmm_vault_domain::position::Position;
use clmm_vault_domain::token::TokenAmounts;
use clmm_vault_protocols::pool::{CollectParams, ConcentratedPool, MintParams};
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use tracing::{debug, info};

/// Parameters for adding liquidity.
#[derive(Debug, Clone, Copy)]
pub struct AddLiquidityParams {
    /// Lower tick bound.
    pub tick_lower: i32,
    /// Upper tick bound.
    pub tick_upper: i32,
    /// Liquidity amount to add.
    pub liquidity: u128,
    /// Minimum token0 amount used.
    pub amount0_min: U256,
    /// Minimum token1 amount used.
    pub amount1_min: U256,
    /// Latest timestamp the call may execute at.
    pub deadline: u64,
}

/// Parameters for removing liquidity.
#[derive(Debug, Clone, Copy)]
pub struct RemoveLiquidityParams {
    /// Lower tick bound.
    pub tick_lower: i32,
    /// Upper tick bound.
    pub tick_upper: i32,
    /// Liquidity amount to remove.
    pub liquidity: u128,
    /// Minimum token0 principal received.
    pub amount0_min: U256,
    /// Minimum token1 principal received.
    pub amount1_min: U256,
    /// Latest timestamp the call may execute at.
    pub deadline: u64,
}

/// Tokens returned to idle balances by a removal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedLiquidity {
    /// Principal token0.
    pub amount0: U256,
    /// Principal token1.
    pub amount1: U256,
    /// Trading fees collected in token0.
    pub fee0: U256,
    /// Trading fees collected in token1.
    pub fee1: U256,
}

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Deploys idle tokens into a range. Manager only.
    pub fn add_liquidity(
        &mut self,
        ctx: CallContext,
        params: AddLiquidityParams,
    ) -> VaultResult<TokenAmounts> {
        self.atomically("add_liquidity", |vault| {
            vault.require_manager(&ctx)?;
            Self::check_deadline(&ctx, params.deadline)?;
            if params.liquidity == 0 {
                return Err(VaultError::ZeroAmount);
            }
            vault.validate_range(params.tick_lower, params.tick_upper)?;

            let position =
                vault
                    .state
                    .ledger
                    .add(params.tick_lower, params.tick_upper, params.liquidity)?;

            let used = vault.pool.mint(
                &mut vault.tokens,
                MintParams {
                    owner: vault.address,
                    payer: vault.address,
                    tick_lower: params.tick_lower,
                    tick_upper: params.tick_upper,
                    liquidity: params.liquidity,
                },
            )?;
            check_minimum(used.amount0, params.amount0_min)?;
            check_minimum(used.amount1, params.amount1_min)?;

            info!(
                tick_lower = params.tick_lower,
                tick_upper = params.tick_upper,
                liquidity = params.liquidity,
                total_liquidity = position.liquidity,
                amount0 = %used.amount0,
                amount1 = %used.amount1,
                "Liquidity added"
            );
            vault.record(
                &ctx,
                VaultEventKind::LiquidityAdded {
                    tick_lower: params.tick_lower,
                    tick_upper: params.tick_upper,
                    liquidity: params.liquidity,
                    amount0: used.amount0,
                    amount1: used.amount1,
                },
            );
            Ok(used)
        })
    }

    /// Withdraws liquidity from a range into idle balances, collecting the
    /// range's trading fees along the way. Manager only.
    pub fn remove_liquidity(
        &mut self,
        ctx: CallContext,
        params: RemoveLiquidityParams,
    ) -> VaultResult<RemovedLiquidity> {
        self.atomically("remove_liquidity", |vault| {
            vault.require_manager(&ctx)?;
            Self::check_deadline(&ctx, params.deadline)?;
            if params.liquidity == 0 {
                return Err(VaultError::ZeroAmount);
            }

            vault
                .state
                .ledger
                .remove(params.tick_lower, params.tick_upper, params.liquidity)?;

            // Fees owed before the burn adds principal to the owed amounts
            vault
                .pool
                .burn(vault.address, params.tick_lower, params.tick_upper, 0)?;
            let owed = vault
                .pool
                .position(vault.address, params.tick_lower, params.tick_upper);

            let principal = vault.pool.burn(
                vault.address,
                params.tick_lower,
                params.tick_upper,
                params.liquidity,
            )?;
            check_minimum(principal.amount0, params.amount0_min)?;
            check_minimum(principal.amount1, params.amount1_min)?;

            vault.collect_owed(params.tick_lower, params.tick_upper, U256::MAX, U256::MAX)?;

            let removed = RemovedLiquidity {
                amount0: principal.amount0,
                amount1: principal.amount1,
                fee0: owed.tokens_owed0,
                fee1: owed.tokens_owed1,
            };
            info!(
                tick_lower = params.tick_lower,
                tick_upper = params.tick_upper,
                liquidity = params.liquidity,
                amount0 = %removed.amount0,
                amount1 = %removed.amount1,
                fee0 = %removed.fee0,
                fee1 = %removed.fee1,
                "Liquidity removed"
            );
            vault.record(
                &ctx,
                VaultEventKind::LiquidityRemoved {
                    tick_lower: params.tick_lower,
                    tick_upper: params.tick_upper,
                    liquidity: params.liquidity,
                    amount0: removed.amount0,
                    amount1: removed.amount1,
                    fee0: removed.fee0,
                    fee1: removed.fee1,
                },
            );
            Ok(removed)
        })
    }

    /// Sweeps the trading fees of every position into idle balances.
    pub fn collect_all_position_fees(&mut self, ctx: CallContext) -> VaultResult<TokenAmounts> {
        self.atomically("collect_all_position_fees", |vault| {
            vault.collect_all_fees(&ctx)
        })
    }

    /// Sweeps the trading fees of one position into idle balances.
    pub fn collect_position_fees(
        &mut self,
        ctx: CallContext,
        tick_lower: i32,
        tick_upper: i32,
    ) -> VaultResult<TokenAmounts> {
        self.atomically("collect_position_fees", |vault| {
            if vault.state.ledger.find(tick_lower, tick_upper).is_none() {
                return Err(VaultError::PositionNotFound {
                    tick_lower,
                    tick_upper,
                });
            }
            vault.collect_fees(&ctx, tick_lower, tick_upper)
        })
    }

    /// Largest liquidity both amounts support over the range at the current
    /// price, rounded down.
    pub fn get_liquidity_for_amounts(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        amount0: U256,
        amount1: U256,
    ) -> VaultResult<u128> {
        self.validate_range(tick_lower, tick_upper)?;
        Ok(get_liquidity_for_amounts(
            self.pool.slot0().sqrt_price_x96,
            get_sqrt_ratio_at_tick(tick_lower)?,
            get_sqrt_ratio_at_tick(tick_upper)?,
            amount0,
            amount1,
        )?)
    }

    /// Tokens `liquidity` represents over the range at the current price,
    /// rounded down.
    pub fn get_amounts_for_liquidity(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> VaultResult<TokenAmounts> {
        self.validate_range(tick_lower, tick_upper)?;
        let (amount0, amount1) = get_amounts_for_liquidity(
            self.pool.slot0().sqrt_price_x96,
            get_sqrt_ratio_at_tick(tick_lower)?,
            get_sqrt_ratio_at_tick(tick_upper)?,
            liquidity,
        )?;
        Ok(TokenAmounts::new(amount0, amount1))
    }

    /// Snapshot of the open positions, in opening order.
    pub fn get_all_positions(&self) -> Vec<Position> {
        self.state.ledger.positions()
    }

    pub fn position(&self, index: usize) -> Option<Position> {
        self.state.ledger.get(index).copied()
    }

    pub fn position_count(&self) -> usize {
        self.state.ledger.len()
    }

    /// Principal and uncollected fees of the position at `index`.
    pub fn position_info(&self, index: usize) -> VaultResult<Option<PositionValue>> {
        if index >= self.state.ledger.len() {
            return Ok(None);
        }
        Ok(self.position_values()?.into_iter().nth(index))
    }

    pub(crate) fn validate_range(&self, tick_lower: i32, tick_upper: i32) -> VaultResult<()> {
        let spacing = self.pool.tick_spacing();
        let valid = tick_lower < tick_upper
            && tick_lower >= MIN_TICK
            && tick_upper <= MAX_TICK
            && tick_lower % spacing == 0
            && tick_upper % spacing == 0;
        if !valid {
            return Err(VaultError::InvalidTickRange {
                tick_lower,
                tick_upper,
            });
        }
        Ok(())
    }

    pub(crate) fn collect_all_fees(&mut self, ctx: &CallContext) -> VaultResult<TokenAmounts> {
        let ranges: Vec<(i32, i32)> = self
            .state
            .ledger
            .iter()
            .map(|p| (p.tick_lower, p.tick_upper))
            .collect();

        let mut total = TokenAmounts::zero();
        for (tick_lower, tick_upper) in ranges {
            let collected = self.collect_fees(ctx, tick_lower, tick_upper)?;
            total = total
                .checked_add(collected)
                .ok_or(MathError::Overflow)?;
        }
        Ok(total)
    }

    fn collect_fees(
        &mut self,
        ctx: &CallContext,
        tick_lower: i32,
        tick_upper: i32,
    ) -> VaultResult<TokenAmounts> {
        self.pool.burn(self.address, tick_lower, tick_upper, 0)?;
        let collected = self.collect_owed(tick_lower, tick_upper, U256::MAX, U256::MAX)?;
        if !collected.is_zero() {
            debug!(
                tick_lower,
                tick_upper,
                amount0 = %collected.amount0,
                amount1 = %collected.amount1,
                "Position fees collected"
            );
            self.record(
                ctx,
                VaultEventKind::PositionFeesCollected {
                    tick_lower,
                    tick_upper,
                    amount0: collected.amount0,
                    amount1: collected.amount1,
                },
            );
        }
        Ok(collected)
    }

    /// Removes liquidity from a known range and brings exactly the burned
    /// principal back to idle balances.
    pub(crate) fn decrease_position(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> VaultResult<TokenAmounts> {
        self.state.ledger.remove(tick_lower, tick_upper, liquidity)?;
        let principal = self
            .pool
            .burn(self.address, tick_lower, tick_upper, liquidity)?;
        self.collect_owed(tick_lower, tick_upper, principal.amount0, principal.amount1)
    }

    fn collect_owed(
        &mut self,
        tick_lower: i32,
        tick_upper: i32,
        amount0_requested: U256,
        amount1_requested: U256,
    ) -> VaultResult<TokenAmounts> {
        Ok(self.pool.collect(
            &mut self.tokens,
            CollectParams {
                owner: self.address,
                recipient: self.address,
                tick_lower,
                tick_upper,
                amount0_requested,
                amount1_requested,
            },
        )?)
    }
}

pub(crate) fn check_minimum(amount: U256, minimum: U256) -> VaultResult<()> {
    if amount < minimum {
        return Err(VaultError::SlippageExceeded {
            amount,
            bound: minimum,
        });
    }
    Ok(())
}

pub(crate) fn check_maximum(amount: U256, maximum: U256) -> VaultResult<()> {
    if amount > maximum {
        return Err(VaultError::SlippageExceeded {
            amount,
            bound: maximum,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VaultConfig;
    use clmm_vault_domain::token::Address;
    use clmm_vault_simulation::prelude::*;

    #[test]
    fn test_slippage_bounds_are_inclusive() {
        let ten = U256::from(10u8);
        assert!(check_minimum(ten, ten).is_ok());
        assert!(check_maximum(ten, ten).is_ok());
        assert_eq!(
            check_minimum(ten, U256::from(11u8)),
            Err(VaultError::SlippageExceeded {
                amount: ten,
                bound: U256::from(11u8),
            })
        );
        assert!(check_maximum(ten, U256::from(9u8)).is_err());
    }

    #[test]
    fn test_validate_range() {
        let market = Market::new(&MarketConfig::default()).unwrap();
        let owner = Address::from_low_u64_be(1);
        let vault = Vault::new(
            CallContext::new(owner, 0),
            Address::from_low_u64_be(0x5000),
            market.pool,
            market.bank,
            VaultConfig::default(),
        )
        .unwrap();

        assert!(vault.validate_range(-600, 600).is_ok());
        assert!(vault.validate_range(-887_220, 887_220).is_ok());
        for (lower, upper) in [(600, -600), (60, 60), (-601, 600), (-887_280, 0), (0, 887_280)] {
            assert_eq!(
                vault.validate_range(lower, upper),
                Err(VaultError::InvalidTickRange {
                    tick_lower: lower,
                    tick_upper: upper,
                }),
                "[{lower}, {upper})"
            );
        }
    }
}
