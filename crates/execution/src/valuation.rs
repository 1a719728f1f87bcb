//! Read-only valuation of the vault.
//!
//! Positions are valued at the pool's current price. Uncollected trading
//! fees are included: they are brought up to date on a scratch copy of the
//! pool, so valuation never mutates the vault.

use crate::error::VaultResult;
use crate::vault::Vault;
use clmm_vault_domain::error::MathError;
use clmm_vault_domain::math::full_math::add;
use clmm_vault_domain::math::liquidity_amounts::get_amounts_for_liquidity;
use clmm_vault_domain::math::price::{sqrt_price_to_decimal, token0_in_token1, token1_in_token0};
use clmm_vault_domain::math::tick_math::get_sqrt_ratio_at_tick;
use clmm_vault_domain::position::Position;
use clmm_vault_domain::token::TokenAmounts;
use clmm_vault_protocols::pool::{ConcentratedPool, PoolPosition};
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use rust_decimal::Decimal;

/// A position valued at the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionValue {
    pub position: Position,
    /// Principal if fully withdrawn now.
    pub principal: TokenAmounts,
    /// Trading fees not yet collected.
    pub fees: TokenAmounts,
}

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Token balances held by the vault outside of positions.
    pub fn idle_balances(&self) -> VaultResult<TokenAmounts> {
        let pair = self.token_pair();
        Ok(TokenAmounts::new(
            self.tokens.balance_of(pair.token0, self.address)?,
            self.tokens.balance_of(pair.token1, self.address)?,
        ))
    }

    /// Every open position with its principal and uncollected fees.
    pub fn position_values(&self) -> VaultResult<Vec<PositionValue>> {
        let sqrt_price = self.pool.slot0().sqrt_price_x96;
        let mut scratch = self.pool.clone();

        self.state
            .ledger
            .iter()
            .map(|position| -> VaultResult<PositionValue> {
                // Zero burn brings fee accounting up to date
                scratch.burn(self.address, position.tick_lower, position.tick_upper, 0)?;
                let owed: PoolPosition =
                    scratch.position(self.address, position.tick_lower, position.tick_upper);

                let (amount0, amount1) = get_amounts_for_liquidity(
                    sqrt_price,
                    get_sqrt_ratio_at_tick(position.tick_lower)?,
                    get_sqrt_ratio_at_tick(position.tick_upper)?,
                    position.liquidity,
                )?;
                Ok(PositionValue {
                    position: *position,
                    principal: TokenAmounts::new(amount0, amount1),
                    fees: TokenAmounts::new(owed.tokens_owed0, owed.tokens_owed1),
                })
            })
            .collect()
    }

    /// Idle balances plus every position's principal and uncollected fees.
    pub fn vault_underlying_assets(&self) -> VaultResult<TokenAmounts> {
        let mut total = self.idle_balances()?;
        for value in self.position_values()? {
            total.amount0 = total
                .amount0
                .checked_add(value.principal.amount0)
                .and_then(|v| v.checked_add(value.fees.amount0))
                .ok_or(MathError::Overflow)?;
            total.amount1 = total
                .amount1
                .checked_add(value.principal.amount1)
                .and_then(|v| v.checked_add(value.fees.amount1))
                .ok_or(MathError::Overflow)?;
        }
        Ok(total)
    }

    /// Vault assets expressed in token0 at the spot price, rounded down.
    pub fn estimated_value_in_token0(&self) -> VaultResult<U256> {
        let assets = self.vault_underlying_assets()?;
        let sqrt_price = self.pool.slot0().sqrt_price_x96;
        let converted = token1_in_token0(assets.amount1, sqrt_price)?;
        Ok(add(assets.amount0, converted)?)
    }

    /// Vault assets expressed in token1 at the spot price, rounded down.
    pub fn estimated_value_in_token1(&self) -> VaultResult<U256> {
        let assets = self.vault_underlying_assets()?;
        let sqrt_price = self.pool.slot0().sqrt_price_x96;
        let converted = token0_in_token1(assets.amount0, sqrt_price)?;
        Ok(add(assets.amount1, converted)?)
    }

    /// Token1 per whole token0 at the pool price. Reporting only.
    pub fn spot_price(&self) -> VaultResult<Decimal> {
        let pair = self.token_pair();
        let decimals0 = self.tokens.decimals(pair.token0)?;
        let decimals1 = self.tokens.decimals(pair.token1)?;
        Ok(sqrt_price_to_decimal(
            self.pool.slot0().sqrt_price_x96,
            decimals0,
            decimals1,
        )?)
    }
}
