//! In-memory concentrated liquidity pool.
//!
//! Implements the Uniswap V3 state machine on integer math: initialized
//! ticks with `liquidity_net`, per-tick fee growth outside, per-position fee
//! growth inside snapshots, and a swap loop that crosses ticks. The pool
//! keeps its reserves in the shared [`TokenLedger`] under its own address.

use crate::swap_math::compute_swap_step;
use clmm_vault_domain::error::MathError;
use clmm_vault_domain::math::full_math::mul_div;
use clmm_vault_domain::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use clmm_vault_domain::math::tick_math::{
    MAX_TICK, MIN_TICK, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, max_sqrt_ratio,
    min_sqrt_ratio,
};
use clmm_vault_domain::token::{Address, TokenAmounts};
use clmm_vault_protocols::error::PoolError;
use clmm_vault_protocols::pool::{
    CollectParams, ConcentratedPool, MintParams, PoolPosition, Slot0, SwapAmount, SwapParams,
    SwapResult,
};
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use std::collections::{BTreeMap, HashMap};

fn q128() -> U256 {
    U256::one() << 128
}

fn wrapping_sub(a: U256, b: U256) -> U256 {
    a.overflowing_sub(b).0
}

fn wrapping_add(a: U256, b: U256) -> U256 {
    a.overflowing_add(b).0
}

/// Static parameters of a simulated pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    /// Swap fee in hundredths of a basis point.
    pub fee: u32,
    pub tick_spacing: i32,
    /// Initial Q64.96 sqrt price.
    pub sqrt_price_x96: U256,
}

#[derive(Debug, Clone, Default)]
struct TickInfo {
    liquidity_gross: u128,
    liquidity_net: i128,
    fee_growth_outside0_x128: U256,
    fee_growth_outside1_x128: U256,
}

#[derive(Debug, Clone, Default)]
struct PositionInfo {
    liquidity: u128,
    fee_growth_inside0_last_x128: U256,
    fee_growth_inside1_last_x128: U256,
    tokens_owed0: U256,
    tokens_owed1: U256,
}

/// A Uniswap V3 style pool held entirely in memory.
#[derive(Debug, Clone)]
pub struct SimulatedPool {
    config: PoolConfig,
    sqrt_price_x96: U256,
    tick: i32,
    liquidity: u128,
    fee_growth_global0_x128: U256,
    fee_growth_global1_x128: U256,
    ticks: BTreeMap<i32, TickInfo>,
    positions: HashMap<(Address, i32, i32), PositionInfo>,
}

impl SimulatedPool {
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let tick = get_tick_at_sqrt_ratio(config.sqrt_price_x96)?;
        Ok(Self {
            config,
            sqrt_price_x96: config.sqrt_price_x96,
            tick,
            liquidity: 0,
            fee_growth_global0_x128: U256::zero(),
            fee_growth_global1_x128: U256::zero(),
            ticks: BTreeMap::new(),
            positions: HashMap::new(),
        })
    }

    /// Liquidity active at the current price.
    pub fn active_liquidity(&self) -> u128 {
        self.liquidity
    }

    /// Number of initialized ticks.
    pub fn initialized_ticks(&self) -> usize {
        self.ticks.len()
    }

    fn check_ticks(&self, tick_lower: i32, tick_upper: i32) -> Result<(), PoolError> {
        if tick_lower >= tick_upper || tick_lower < MIN_TICK || tick_upper > MAX_TICK {
            return Err(PoolError::InvalidTickRange {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        let spacing = self.config.tick_spacing;
        for tick in [tick_lower, tick_upper] {
            if tick % spacing != 0 {
                return Err(PoolError::TickNotOnSpacing { tick, spacing });
            }
        }
        Ok(())
    }

    fn fee_growth_inside(&self, tick_lower: i32, tick_upper: i32) -> (U256, U256) {
        let lower = self.ticks.get(&tick_lower).cloned().unwrap_or_default();
        let upper = self.ticks.get(&tick_upper).cloned().unwrap_or_default();

        let (below0, below1) = if self.tick >= tick_lower {
            (lower.fee_growth_outside0_x128, lower.fee_growth_outside1_x128)
        } else {
            (
                wrapping_sub(self.fee_growth_global0_x128, lower.fee_growth_outside0_x128),
                wrapping_sub(self.fee_growth_global1_x128, lower.fee_growth_outside1_x128),
            )
        };
        let (above0, above1) = if self.tick < tick_upper {
            (upper.fee_growth_outside0_x128, upper.fee_growth_outside1_x128)
        } else {
            (
                wrapping_sub(self.fee_growth_global0_x128, upper.fee_growth_outside0_x128),
                wrapping_sub(self.fee_growth_global1_x128, upper.fee_growth_outside1_x128),
            )
        };

        (
            wrapping_sub(wrapping_sub(self.fee_growth_global0_x128, below0), above0),
            wrapping_sub(wrapping_sub(self.fee_growth_global1_x128, below1), above1),
        )
    }

    fn update_tick(&mut self, tick: i32, liquidity_delta: i128, upper: bool) -> Result<(), PoolError> {
        let current_tick = self.tick;
        let global0 = self.fee_growth_global0_x128;
        let global1 = self.fee_growth_global1_x128;
        let info = self.ticks.entry(tick).or_default();

        if info.liquidity_gross == 0 && tick <= current_tick {
            // Growth below a fresh tick is attributed to the outside
            info.fee_growth_outside0_x128 = global0;
            info.fee_growth_outside1_x128 = global1;
        }
        info.liquidity_gross = apply_delta(info.liquidity_gross, liquidity_delta)?;
        info.liquidity_net = if upper {
            info.liquidity_net.checked_sub(liquidity_delta)
        } else {
            info.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(MathError::Overflow)?;
        Ok(())
    }

    fn clear_tick_if_unused(&mut self, tick: i32) {
        if self
            .ticks
            .get(&tick)
            .is_some_and(|info| info.liquidity_gross == 0)
        {
            self.ticks.remove(&tick);
        }
    }

    /// Applies a liquidity change to a position and returns the token
    /// amounts it represents, rounded up when adding.
    fn modify_position(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity_delta: i128,
    ) -> Result<TokenAmounts, PoolError> {
        self.check_ticks(tick_lower, tick_upper)?;

        if liquidity_delta != 0 {
            self.update_tick(tick_lower, liquidity_delta, false)?;
            self.update_tick(tick_upper, liquidity_delta, true)?;
        }

        let (inside0, inside1) = self.fee_growth_inside(tick_lower, tick_upper);
        let position = self
            .positions
            .entry((owner, tick_lower, tick_upper))
            .or_default();
        if liquidity_delta == 0 && position.liquidity == 0 {
            return Err(PoolError::PositionNotFound {
                lower: tick_lower,
                upper: tick_upper,
            });
        }

        let liquidity = U256::from(position.liquidity);
        let owed0 = mul_div(
            wrapping_sub(inside0, position.fee_growth_inside0_last_x128),
            liquidity,
            q128(),
        )?;
        let owed1 = mul_div(
            wrapping_sub(inside1, position.fee_growth_inside1_last_x128),
            liquidity,
            q128(),
        )?;
        position.tokens_owed0 = position.tokens_owed0.saturating_add(owed0);
        position.tokens_owed1 = position.tokens_owed1.saturating_add(owed1);
        position.fee_growth_inside0_last_x128 = inside0;
        position.fee_growth_inside1_last_x128 = inside1;
        position.liquidity = apply_delta(position.liquidity, liquidity_delta)?;

        if liquidity_delta < 0 {
            self.clear_tick_if_unused(tick_lower);
            self.clear_tick_if_unused(tick_upper);
        }
        if liquidity_delta == 0 {
            return Ok(TokenAmounts::zero());
        }

        let round_up = liquidity_delta > 0;
        let magnitude = liquidity_delta.unsigned_abs();
        let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;

        let amounts = if self.tick < tick_lower {
            TokenAmounts::new(
                get_amount0_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
                U256::zero(),
            )
        } else if self.tick < tick_upper {
            self.liquidity = apply_delta(self.liquidity, liquidity_delta)?;
            TokenAmounts::new(
                get_amount0_delta(self.sqrt_price_x96, sqrt_upper, magnitude, round_up)?,
                get_amount1_delta(sqrt_lower, self.sqrt_price_x96, magnitude, round_up)?,
            )
        } else {
            TokenAmounts::new(
                U256::zero(),
                get_amount1_delta(sqrt_lower, sqrt_upper, magnitude, round_up)?,
            )
        };
        Ok(amounts)
    }

    fn next_initialized_tick(&self, zero_for_one: bool) -> (i32, bool) {
        if zero_for_one {
            match self.ticks.range(..=self.tick).next_back() {
                Some((tick, _)) => (*tick, true),
                None => (MIN_TICK, false),
            }
        } else {
            match self.ticks.range(self.tick + 1..).next() {
                Some((tick, _)) => (*tick, true),
                None => (MAX_TICK, false),
            }
        }
    }

    fn cross_tick(&mut self, tick: i32, zero_for_one: bool) -> Result<(), PoolError> {
        let global0 = self.fee_growth_global0_x128;
        let global1 = self.fee_growth_global1_x128;
        let Some(info) = self.ticks.get_mut(&tick) else {
            return Ok(());
        };
        info.fee_growth_outside0_x128 = wrapping_sub(global0, info.fee_growth_outside0_x128);
        info.fee_growth_outside1_x128 = wrapping_sub(global1, info.fee_growth_outside1_x128);

        let net = if zero_for_one {
            -info.liquidity_net
        } else {
            info.liquidity_net
        };
        self.liquidity = apply_delta(self.liquidity, net)?;
        Ok(())
    }

    /// Runs the swap loop on this state and returns `(amount_in, amount_out)`
    /// including fees on the input side.
    fn execute_swap(
        &mut self,
        zero_for_one: bool,
        amount: SwapAmount,
        sqrt_price_limit_x96: U256,
    ) -> Result<(U256, U256), PoolError> {
        let (exact_input, mut remaining) = match amount {
            SwapAmount::ExactInput(value) => (true, value),
            SwapAmount::ExactOutput(value) => (false, value),
        };
        if remaining.is_zero() {
            return Err(PoolError::ZeroAmount);
        }

        let limit_ok = if zero_for_one {
            sqrt_price_limit_x96 < self.sqrt_price_x96 && sqrt_price_limit_x96 > min_sqrt_ratio()
        } else {
            sqrt_price_limit_x96 > self.sqrt_price_x96 && sqrt_price_limit_x96 < max_sqrt_ratio()
        };
        if !limit_ok {
            return Err(PoolError::InvalidPriceLimit(sqrt_price_limit_x96));
        }

        let mut total_in = U256::zero();
        let mut total_out = U256::zero();

        while !remaining.is_zero() && self.sqrt_price_x96 != sqrt_price_limit_x96 {
            let step_start = self.sqrt_price_x96;
            let (tick_next, initialized) = self.next_initialized_tick(zero_for_one);
            let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
            let sqrt_price_next = get_sqrt_ratio_at_tick(tick_next)?;

            let target = if zero_for_one {
                sqrt_price_next.max(sqrt_price_limit_x96)
            } else {
                sqrt_price_next.min(sqrt_price_limit_x96)
            };

            let step = compute_swap_step(
                self.sqrt_price_x96,
                target,
                self.liquidity,
                remaining,
                exact_input,
                self.config.fee,
            )?;
            self.sqrt_price_x96 = step.sqrt_price_next_x96;

            let gross_in = step.amount_in + step.fee_amount;
            if exact_input {
                remaining = remaining.saturating_sub(gross_in);
            } else {
                remaining = remaining.saturating_sub(step.amount_out);
            }
            total_in += gross_in;
            total_out += step.amount_out;

            if self.liquidity > 0 && !step.fee_amount.is_zero() {
                let growth = mul_div(step.fee_amount, q128(), U256::from(self.liquidity))?;
                if zero_for_one {
                    self.fee_growth_global0_x128 = wrapping_add(self.fee_growth_global0_x128, growth);
                } else {
                    self.fee_growth_global1_x128 = wrapping_add(self.fee_growth_global1_x128, growth);
                }
            }

            if self.sqrt_price_x96 == sqrt_price_next {
                if initialized {
                    self.cross_tick(tick_next, zero_for_one)?;
                }
                self.tick = if zero_for_one { tick_next - 1 } else { tick_next };
            } else if self.sqrt_price_x96 != step_start {
                self.tick = get_tick_at_sqrt_ratio(self.sqrt_price_x96)?;
            }
        }

        Ok((total_in, total_out))
    }
}

fn apply_delta(value: u128, delta: i128) -> Result<u128, MathError> {
    if delta >= 0 {
        value
            .checked_add(delta.unsigned_abs())
            .ok_or(MathError::Overflow)
    } else {
        value
            .checked_sub(delta.unsigned_abs())
            .ok_or(MathError::Underflow)
    }
}

impl ConcentratedPool for SimulatedPool {
    fn address(&self) -> Address {
        self.config.address
    }

    fn token0(&self) -> Address {
        self.config.token0
    }

    fn token1(&self) -> Address {
        self.config.token1
    }

    fn fee(&self) -> u32 {
        self.config.fee
    }

    fn tick_spacing(&self) -> i32 {
        self.config.tick_spacing
    }

    fn slot0(&self) -> Slot0 {
        Slot0 {
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
        }
    }

    fn position(&self, owner: Address, tick_lower: i32, tick_upper: i32) -> PoolPosition {
        self.positions
            .get(&(owner, tick_lower, tick_upper))
            .map(|p| PoolPosition {
                liquidity: p.liquidity,
                tokens_owed0: p.tokens_owed0,
                tokens_owed1: p.tokens_owed1,
            })
            .unwrap_or_default()
    }

    fn mint(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: MintParams,
    ) -> Result<TokenAmounts, PoolError> {
        if params.liquidity == 0 {
            return Err(PoolError::ZeroAmount);
        }
        let delta = i128::try_from(params.liquidity).map_err(|_| MathError::Overflow)?;

        let mut next = self.clone();
        let amounts = next.modify_position(params.owner, params.tick_lower, params.tick_upper, delta)?;

        let pool = self.config.address;
        if !amounts.amount0.is_zero() {
            tokens.transfer(self.config.token0, params.payer, pool, amounts.amount0)?;
        }
        if !amounts.amount1.is_zero() {
            tokens.transfer(self.config.token1, params.payer, pool, amounts.amount1)?;
        }

        *self = next;
        Ok(amounts)
    }

    fn burn(
        &mut self,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<TokenAmounts, PoolError> {
        let available = self
            .positions
            .get(&(owner, tick_lower, tick_upper))
            .map_or(0, |p| p.liquidity);
        if available == 0 {
            return Err(PoolError::PositionNotFound {
                lower: tick_lower,
                upper: tick_upper,
            });
        }
        if liquidity > available {
            return Err(PoolError::InsufficientLiquidity {
                available,
                requested: liquidity,
            });
        }
        let delta = i128::try_from(liquidity).map_err(|_| MathError::Overflow)?;

        let mut next = self.clone();
        let amounts = next.modify_position(owner, tick_lower, tick_upper, -delta)?;
        if let Some(position) = next.positions.get_mut(&(owner, tick_lower, tick_upper)) {
            position.tokens_owed0 = position.tokens_owed0.saturating_add(amounts.amount0);
            position.tokens_owed1 = position.tokens_owed1.saturating_add(amounts.amount1);
        }

        *self = next;
        Ok(amounts)
    }

    fn collect(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: CollectParams,
    ) -> Result<TokenAmounts, PoolError> {
        let key = (params.owner, params.tick_lower, params.tick_upper);
        let Some(position) = self.positions.get(&key) else {
            return Ok(TokenAmounts::zero());
        };
        let amount0 = params.amount0_requested.min(position.tokens_owed0);
        let amount1 = params.amount1_requested.min(position.tokens_owed1);

        let pool = self.config.address;
        if !amount0.is_zero() {
            tokens.transfer(self.config.token0, pool, params.recipient, amount0)?;
        }
        if !amount1.is_zero() {
            tokens.transfer(self.config.token1, pool, params.recipient, amount1)?;
        }

        if let Some(position) = self.positions.get_mut(&key) {
            position.tokens_owed0 -= amount0;
            position.tokens_owed1 -= amount1;
            if position.liquidity == 0
                && position.tokens_owed0.is_zero()
                && position.tokens_owed1.is_zero()
            {
                self.positions.remove(&key);
            }
        }
        Ok(TokenAmounts::new(amount0, amount1))
    }

    fn swap(
        &mut self,
        tokens: &mut dyn TokenLedger,
        params: SwapParams,
    ) -> Result<SwapResult, PoolError> {
        let mut next = self.clone();
        let (amount_in, amount_out) =
            next.execute_swap(params.zero_for_one, params.amount, params.sqrt_price_limit_x96)?;

        let (token_in, token_out) = if params.zero_for_one {
            (self.config.token0, self.config.token1)
        } else {
            (self.config.token1, self.config.token0)
        };
        let pool = self.config.address;
        if !amount_in.is_zero() {
            tokens.transfer(token_in, params.payer, pool, amount_in)?;
        }
        if !amount_out.is_zero() {
            tokens.transfer(token_out, pool, params.recipient, amount_out)?;
        }

        *self = next;
        Ok(SwapResult {
            amount_in,
            amount_out,
            sqrt_price_x96: self.sqrt_price_x96,
            tick: self.tick,
        })
    }
}
