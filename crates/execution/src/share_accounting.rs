//! Deposits and withdrawals.
//!
//! Deposits round the tokens required up and withdrawals round the tokens
//! returned down, so the dust of every call stays with the remaining holders.

use crate::config::ExitFeeSettlement;
use crate::context::CallContext;
use crate::error::{VaultError, VaultResult};
use crate::events::VaultEventKind;
use crate::position_manager::{check_maximum, check_minimum};
use crate::vault::Vault;
use clmm_vault_domain::fees::FeeEngine;
use clmm_vault_domain::math::full_math::{add, div_rounding_up, mul_div, mul_div_rounding_up, sub};
use clmm_vault_domain::token::TokenAmounts;
use clmm_vault_protocols::pool::ConcentratedPool;
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use tracing::{debug, info};

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Mints `shares` to the caller against a proportional slice of the
    /// vault's assets. The entry fee is charged on top of the proportional
    /// amounts; the maximums bound the total pulled from the caller.
    ///
    /// Returns the total pulled per token, fees included.
    pub fn deposit(
        &mut self,
        ctx: CallContext,
        shares: U256,
        amount0_max: U256,
        amount1_max: U256,
    ) -> VaultResult<TokenAmounts> {
        self.atomically("deposit", |vault| {
            if shares.is_zero() {
                return Err(VaultError::ZeroAmount);
            }
            vault.settle_fees(&ctx)?;

            let total = vault.state.shares.total_supply();
            let bootstrap = total.is_zero();
            let amounts = if bootstrap {
                let unit = U256::exp10(vault.state.decimal_offset as usize);
                TokenAmounts::new(div_rounding_up(shares, unit)?, U256::zero())
            } else {
                let underlying = vault.vault_underlying_assets()?;
                TokenAmounts::new(
                    mul_div_rounding_up(shares, underlying.amount0, total)?,
                    mul_div_rounding_up(shares, underlying.amount1, total)?,
                )
            };
            if amounts.is_zero() {
                return Err(VaultError::ZeroAmount);
            }

            let engine = FeeEngine::new(vault.state.fee_config);
            let fees = TokenAmounts::new(
                engine.entry_fee_on(amounts.amount0)?,
                engine.entry_fee_on(amounts.amount1)?,
            );
            let paid = TokenAmounts::new(
                add(amounts.amount0, fees.amount0)?,
                add(amounts.amount1, fees.amount1)?,
            );
            check_maximum(paid.amount0, amount0_max)?;
            check_maximum(paid.amount1, amount1_max)?;
            debug!(
                shares = %shares,
                total_supply = %total,
                amount0 = %amounts.amount0,
                amount1 = %amounts.amount1,
                "Deposit amounts computed"
            );

            vault.state.shares.mint(ctx.caller, shares)?;

            let pair = vault.token_pair();
            let recipient = vault.state.fee_config.fee_recipient;
            let this = vault.address;
            for (token, amount, fee) in [
                (pair.token0, amounts.amount0, fees.amount0),
                (pair.token1, amounts.amount1, fees.amount1),
            ] {
                if !amount.is_zero() {
                    vault
                        .tokens
                        .transfer_from(token, this, ctx.caller, this, amount)?;
                }
                if !fee.is_zero() {
                    vault
                        .tokens
                        .transfer_from(token, this, ctx.caller, recipient, fee)?;
                }
            }

            if bootstrap {
                let value = vault.estimated_value_in_token0()?;
                let supply = vault.state.shares.total_supply();
                let performance_fee = vault.state.fee_config.performance_fee;
                vault
                    .state
                    .high_water_mark
                    .checkpoint(supply, value, performance_fee)?;
            }

            info!(
                account = ?ctx.caller,
                shares = %shares,
                amount0 = %paid.amount0,
                amount1 = %paid.amount1,
                "Deposit"
            );
            vault.record(
                &ctx,
                VaultEventKind::Deposit {
                    account: ctx.caller,
                    shares,
                    amount0: amounts.amount0,
                    amount1: amounts.amount1,
                    fee0: fees.amount0,
                    fee1: fees.amount1,
                },
            );
            Ok(paid)
        })
    }

    /// Redeems `shares` of the caller for a proportional slice of idle
    /// balances and of every position, after sweeping position fees into
    /// idle balances. The minimums bound what the caller receives.
    pub fn withdraw(
        &mut self,
        ctx: CallContext,
        shares: U256,
        amount0_min: U256,
        amount1_min: U256,
    ) -> VaultResult<TokenAmounts> {
        self.atomically("withdraw", |vault| {
            if shares.is_zero() {
                return Err(VaultError::ZeroAmount);
            }
            vault.settle_fees(&ctx)?;

            let available = vault.state.shares.balance_of(ctx.caller);
            if available < shares {
                return Err(VaultError::InsufficientShares {
                    available,
                    requested: shares,
                });
            }

            let engine = FeeEngine::new(vault.state.fee_config);
            let recipient = vault.state.fee_config.fee_recipient;
            // The fee recipient exits without paying itself
            let charged = ctx.caller != recipient;
            let settlement = vault.state.exit_fee_settlement;
            let exit_fee_shares = match settlement {
                ExitFeeSettlement::Shares if !charged => U256::zero(),
                ExitFeeSettlement::Shares => {
                    let fee = engine.exit_fee_on(shares)?;
                    if !fee.is_zero() {
                        vault.state.shares.transfer(ctx.caller, recipient, fee)?;
                    }
                    fee
                }
                ExitFeeSettlement::Tokens => U256::zero(),
            };
            let burned = sub(shares, exit_fee_shares)?;

            vault.collect_all_fees(&ctx)?;

            let total = vault.state.shares.total_supply();
            let idle = vault.idle_balances()?;
            let mut out = TokenAmounts::new(
                mul_div(idle.amount0, burned, total)?,
                mul_div(idle.amount1, burned, total)?,
            );
            debug!(
                burned = %burned,
                total_supply = %total,
                idle0 = %out.amount0,
                idle1 = %out.amount1,
                "Idle share computed"
            );

            for position in vault.state.ledger.positions() {
                let liquidity = mul_div(U256::from(position.liquidity), burned, total)?;
                if liquidity.is_zero() {
                    continue;
                }
                // Bounded by the position's own liquidity since burned <= total
                let liquidity = liquidity.low_u128();
                let removed =
                    vault.decrease_position(position.tick_lower, position.tick_upper, liquidity)?;
                out.amount0 = add(out.amount0, removed.amount0)?;
                out.amount1 = add(out.amount1, removed.amount1)?;
            }

            let fees = match settlement {
                ExitFeeSettlement::Tokens if charged => {
                    TokenAmounts::new(engine.exit_fee_on(out.amount0)?, engine.exit_fee_on(out.amount1)?)
                }
                _ => TokenAmounts::zero(),
            };
            out.amount0 = sub(out.amount0, fees.amount0)?;
            out.amount1 = sub(out.amount1, fees.amount1)?;
            check_minimum(out.amount0, amount0_min)?;
            check_minimum(out.amount1, amount1_min)?;

            vault.state.shares.burn(ctx.caller, burned)?;

            let pair = vault.token_pair();
            let this = vault.address;
            for (token, amount, fee) in [
                (pair.token0, out.amount0, fees.amount0),
                (pair.token1, out.amount1, fees.amount1),
            ] {
                if !amount.is_zero() {
                    vault.tokens.transfer(token, this, ctx.caller, amount)?;
                }
                if !fee.is_zero() {
                    vault.tokens.transfer(token, this, recipient, fee)?;
                }
            }

            if vault.state.shares.total_supply().is_zero() {
                vault.state.high_water_mark.reset();
                vault.state.ledger.clear();
            }

            info!(
                account = ?ctx.caller,
                shares = %shares,
                burned = %burned,
                amount0 = %out.amount0,
                amount1 = %out.amount1,
                "Withdraw"
            );
            vault.record(
                &ctx,
                VaultEventKind::Withdraw {
                    account: ctx.caller,
                    shares,
                    amount0: out.amount0,
                    amount1: out.amount1,
                    exit_fee_shares,
                    fee0: fees.amount0,
                    fee1: fees.amount1,
                },
            );
            Ok(out)
        })
    }
}
