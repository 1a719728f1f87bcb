#![allow(dead_code)]

use clmm_vault_domain::fees::FeeConfig;
use clmm_vault_domain::token::{Address, TokenAmounts};
use clmm_vault_execution::prelude::*;
use clmm_vault_protocols::token::TokenLedger;
use clmm_vault_simulation::prelude::*;
use primitive_types::U256;

pub type TestVault = Vault<SimulatedPool, TokenBank>;

pub const START: u64 = 1_700_000_000;
pub const FAR_DEADLINE: u64 = u64::MAX;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64_be(n)
}

pub fn owner() -> Address {
    addr(1)
}

pub fn manager() -> Address {
    addr(2)
}

pub fn alice() -> Address {
    addr(10)
}

pub fn bob() -> Address {
    addr(11)
}

pub fn carol() -> Address {
    addr(12)
}

pub fn fee_recipient() -> Address {
    addr(20)
}

pub fn trader() -> Address {
    addr(30)
}

pub fn vault_address() -> Address {
    addr(0x5000)
}

/// `n` whole units of an 18 decimals token.
pub fn units(n: u64) -> U256 {
    U256::from(n) * U256::exp10(18)
}

/// `n` tenths of a unit of an 18 decimals token.
pub fn tenths(n: u64) -> U256 {
    U256::from(n) * U256::exp10(17)
}

pub fn ctx(caller: Address) -> CallContext {
    CallContext::new(caller, START)
}

pub fn fees() -> FeeConfig {
    FeeConfig::new(fee_recipient())
}

/// Vault over the default market with a manager assigned.
pub fn setup(config: VaultConfig) -> TestVault {
    let market = Market::new(&MarketConfig::default()).unwrap();
    let mut vault = Vault::new(
        ctx(owner()),
        vault_address(),
        market.pool,
        market.bank,
        config,
    )
    .unwrap();
    vault.assign_manager(ctx(owner()), Some(manager())).unwrap();
    vault
}

pub fn default_vault() -> TestVault {
    setup(VaultConfig::default().with_fee_config(fees()))
}

/// Mints both tokens to `account` and approves the vault for all of it.
pub fn fund(vault: &mut TestVault, account: Address, amount0: U256, amount1: U256) {
    let spender = vault.address();
    let (_, bank) = vault.market_mut();
    for (token, amount) in [
        (addresses::token0(), amount0),
        (addresses::token1(), amount1),
    ] {
        bank.mint(token, account, amount).unwrap();
        bank.approve(token, account, spender, U256::MAX).unwrap();
    }
}

pub fn balance(vault: &TestVault, token: Address, account: Address) -> U256 {
    vault.tokens().balance_of(token, account).unwrap()
}

pub fn sum_of_share_balances(vault: &TestVault) -> U256 {
    vault
        .state()
        .shares
        .holders()
        .fold(U256::zero(), |acc, (_, amount)| acc + *amount)
}

/// Deposits `shares` for `account`, funding it first.
pub fn deposit(vault: &mut TestVault, account: Address, shares: U256) -> TokenAmounts {
    fund(vault, account, units(1_000_000), units(1_000_000));
    vault
        .deposit(ctx(account), shares, U256::MAX, U256::MAX)
        .unwrap()
}

/// Sells half of the idle token0 for token1 through the pool.
pub fn rebalance_idle(vault: &mut TestVault) {
    let idle = vault.idle_balances().unwrap();
    vault
        .swap_input_single(
            ctx(manager()),
            SwapInputParams {
                zero_for_one: true,
                amount_in: idle.amount0 / U256::from(2u8),
                amount_out_min: U256::zero(),
                sqrt_price_limit_x96: U256::zero(),
                deadline: FAR_DEADLINE,
            },
        )
        .unwrap();
}

/// Opens `[lower, upper)` with half of what the idle balances support.
pub fn open_position(vault: &mut TestVault, tick_lower: i32, tick_upper: i32) -> u128 {
    let idle = vault.idle_balances().unwrap();
    let liquidity = vault
        .get_liquidity_for_amounts(tick_lower, tick_upper, idle.amount0, idle.amount1)
        .unwrap()
        / 2;
    vault
        .add_liquidity(
            ctx(manager()),
            AddLiquidityParams {
                tick_lower,
                tick_upper,
                liquidity,
                amount0_min: U256::zero(),
                amount1_min: U256::zero(),
                deadline: FAR_DEADLINE,
            },
        )
        .unwrap();
    liquidity
}

/// Background trading that accrues fees to in-range positions.
pub fn trade_back_and_forth(vault: &mut TestVault, amount: U256, rounds: usize) {
    let (pool, bank) = vault.market_mut();
    bank.mint(addresses::token0(), trader(), amount * U256::from(rounds)).unwrap();
    bank.mint(addresses::token1(), trader(), amount * U256::from(rounds * 2)).unwrap();
    for round in 0..rounds {
        execute_trade(
            &mut *pool,
            &mut *bank,
            trader(),
            Trade {
                zero_for_one: round % 2 == 0,
                amount_in: amount,
            },
        )
        .unwrap();
    }
}
