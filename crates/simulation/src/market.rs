//! A ready-made market: two tokens, one pool and background liquidity.

use crate::pool::{PoolConfig, SimulatedPool};
use crate::token_bank::TokenBank;
use clmm_vault_domain::math::tick_math::get_sqrt_ratio_at_tick;
use clmm_vault_domain::token::{Address, TokenAmounts};
use clmm_vault_protocols::error::PoolError;
use clmm_vault_protocols::pool::{ConcentratedPool, MintParams};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Well-known addresses of the simulated market.
pub mod addresses {
    use clmm_vault_domain::token::Address;

    pub fn token0() -> Address {
        Address::from_low_u64_be(0x1000)
    }

    pub fn token1() -> Address {
        Address::from_low_u64_be(0x1001)
    }

    pub fn pool() -> Address {
        Address::from_low_u64_be(0x2000)
    }

    /// Provider of the liquidity the vault does not own.
    pub fn background_lp() -> Address {
        Address::from_low_u64_be(0x3000)
    }
}

/// Market description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    pub token0_symbol: String,
    pub token0_decimals: u8,
    pub token1_symbol: String,
    pub token1_decimals: u8,
    /// Swap fee in hundredths of a basis point.
    pub fee: u32,
    pub tick_spacing: i32,
    /// Tick the pool starts at.
    pub initial_tick: i32,
    /// Liquidity provided by the background LP over `[lower, upper)`.
    pub background_liquidity: u128,
    pub background_tick_lower: i32,
    pub background_tick_upper: i32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            token0_symbol: "TKA".to_string(),
            token0_decimals: 18,
            token1_symbol: "TKB".to_string(),
            token1_decimals: 18,
            fee: 3_000,
            tick_spacing: 60,
            initial_tick: 0,
            background_liquidity: 10u128.pow(24),
            background_tick_lower: -887_220,
            background_tick_upper: 887_220,
        }
    }
}

/// Token bank and pool sharing the same balances.
#[derive(Debug, Clone)]
pub struct Market {
    pub bank: TokenBank,
    pub pool: SimulatedPool,
}

impl Market {
    pub fn new(config: &MarketConfig) -> Result<Self, PoolError> {
        let mut bank = TokenBank::new();
        bank.register(
            addresses::token0(),
            config.token0_symbol.clone(),
            config.token0_decimals,
        );
        bank.register(
            addresses::token1(),
            config.token1_symbol.clone(),
            config.token1_decimals,
        );

        let pool = SimulatedPool::new(PoolConfig {
            address: addresses::pool(),
            token0: addresses::token0(),
            token1: addresses::token1(),
            fee: config.fee,
            tick_spacing: config.tick_spacing,
            sqrt_price_x96: get_sqrt_ratio_at_tick(config.initial_tick)?,
        })?;

        let mut market = Self { bank, pool };
        if config.background_liquidity > 0 {
            market.provide_liquidity(
                addresses::background_lp(),
                config.background_tick_lower,
                config.background_tick_upper,
                config.background_liquidity,
            )?;
        }
        Ok(market)
    }

    pub fn token0(&self) -> Address {
        addresses::token0()
    }

    pub fn token1(&self) -> Address {
        addresses::token1()
    }

    /// Mints both tokens to `account`.
    pub fn fund(&mut self, account: Address, amount0: U256, amount1: U256) -> Result<(), PoolError> {
        self.bank.mint(addresses::token0(), account, amount0)?;
        self.bank.mint(addresses::token1(), account, amount1)?;
        Ok(())
    }

    /// Funds `provider` with exactly what the mint needs and mints.
    pub fn provide_liquidity(
        &mut self,
        provider: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<TokenAmounts, PoolError> {
        // Quote on a copy so the provider is funded with the exact amounts
        let mut quote_pool = self.pool.clone();
        let mut quote_bank = self.bank.clone();
        quote_bank.mint(addresses::token0(), provider, U256::MAX >> 1)?;
        quote_bank.mint(addresses::token1(), provider, U256::MAX >> 1)?;
        let needed = quote_pool.mint(
            &mut quote_bank,
            MintParams {
                owner: provider,
                payer: provider,
                tick_lower,
                tick_upper,
                liquidity,
            },
        )?;

        self.fund(provider, needed.amount0, needed.amount1)?;
        self.pool.mint(
            &mut self.bank,
            MintParams {
                owner: provider,
                payer: provider,
                tick_lower,
                tick_upper,
                liquidity,
            },
        )
    }
}
