//! Concentrated liquidity pool interface.
//!
//! Mirrors the primitives of a Uniswap V3 style pool. Operations that move
//! tokens receive the token ledger and settle against it directly, which
//! stands in for the pool's payment callback.

use crate::error::PoolError;
use crate::token::TokenLedger;
use clmm_vault_domain::token::{Address, TokenAmounts};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Current price state of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot0 {
    /// Q64.96 sqrt price.
    pub sqrt_price_x96: U256,
    /// Tick of the current price.
    pub tick: i32,
}

/// Liquidity and owed tokens of one owner over one range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolPosition {
    pub liquidity: u128,
    /// Uncollected token0, burned principal plus trading fees.
    pub tokens_owed0: U256,
    /// Uncollected token1, burned principal plus trading fees.
    pub tokens_owed1: U256,
}

/// Parameters for minting liquidity.
#[derive(Debug, Clone, Copy)]
pub struct MintParams {
    /// Owner of the resulting position.
    pub owner: Address,
    /// Account paying the token amounts.
    pub payer: Address,
    /// Lower tick bound.
    pub tick_lower: i32,
    /// Upper tick bound.
    pub tick_upper: i32,
    /// Liquidity amount to add.
    pub liquidity: u128,
}

/// Parameters for collecting owed tokens.
#[derive(Debug, Clone, Copy)]
pub struct CollectParams {
    /// Owner of the position.
    pub owner: Address,
    /// Account receiving the tokens.
    pub recipient: Address,
    /// Lower tick bound.
    pub tick_lower: i32,
    /// Upper tick bound.
    pub tick_upper: i32,
    /// Maximum token0 to collect.
    pub amount0_requested: U256,
    /// Maximum token1 to collect.
    pub amount1_requested: U256,
}

/// Exact side of a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapAmount {
    ExactInput(U256),
    ExactOutput(U256),
}

/// Parameters for a single pool swap.
#[derive(Debug, Clone, Copy)]
pub struct SwapParams {
    /// Account paying the input token.
    pub payer: Address,
    /// Account receiving the output token.
    pub recipient: Address,
    /// True to sell token0 for token1.
    pub zero_for_one: bool,
    pub amount: SwapAmount,
    /// Price the swap may not cross.
    pub sqrt_price_limit_x96: U256,
}

/// Outcome of a pool swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    pub amount_in: U256,
    pub amount_out: U256,
    pub sqrt_price_x96: U256,
    pub tick: i32,
}

/// A concentrated liquidity pool.
pub trait ConcentratedPool {
    fn address(&self) -> Address;

    fn token0(&self) -> Address;

    fn token1(&self) -> Address;

    /// Swap fee in hundredths of a basis point.
    fn fee(&self) -> u32;

    fn tick_spacing(&self) -> i32;

    fn slot0(&self) -> Slot0;

    /// Position of `owner` over a range; all zero when none exists.
    fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> PoolPosition;

    /// Adds liquidity, pulling the owed amounts (rounded up) from the payer.
    fn mint(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: MintParams,
    ) -> Result<TokenAmounts, PoolError>;

    /// Removes liquidity and credits the principal (rounded down) to the
    /// position's owed tokens. Burning zero liquidity only updates fees.
    fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<TokenAmounts, PoolError>;

    /// Transfers up to the requested owed tokens to the recipient.
    fn collect(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: CollectParams,
    ) -> Result<TokenAmounts, PoolError>;

    /// Swaps against pool liquidity until the amount is filled or the limit
    /// price is reached.
    fn swap(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: SwapParams,
    ) -> Result<SwapResult, PoolError>;
}
