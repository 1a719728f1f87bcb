mod common;

use clmm_vault_domain::token::Address;
use clmm_vault_execution::prelude::*;
use clmm_vault_protocols::pool::ConcentratedPool;
use clmm_vault_simulation::prelude::*;
use common::*;
use primitive_types::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_shares(rng: &mut StdRng, max_units: u64) -> U256 {
    // Between a thousandth of a unit and `max_units` units
    U256::from(rng.random_range(1_000..=max_units * 1_000_000)) * U256::exp10(12)
}

fn random_fraction(rng: &mut StdRng, balance: U256) -> U256 {
    let numerator = rng.random_range(1..=100u64);
    let shares = balance * U256::from(numerator) / U256::from(100u8);
    shares.max(U256::one())
}

#[test]
fn test_share_conservation_under_random_flow() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut vault = setup(
        VaultConfig::default().with_fee_config(
            fees()
                .with_entry_fee(3_000)
                .with_exit_fee(5_000)
                .with_management_fee(20_000)
                .with_performance_fee(100_000),
        ),
    );
    let accounts: [Address; 3] = [alice(), bob(), carol()];
    for account in accounts {
        fund(&mut vault, account, units(10_000_000), units(10_000_000));
    }

    vault
        .deposit(ctx(alice()), units(1_000), U256::MAX, U256::MAX)
        .unwrap();
    rebalance_idle(&mut vault);
    open_position(&mut vault, -600, 600);
    open_position(&mut vault, -3_000, 1_200);

    let mut flow = RandomOrderFlow::new(7, 50e18, 0.8).unwrap();
    let mut now = START;
    for step in 0..60 {
        now += rng.random_range(60..3_600);
        let account = accounts[rng.random_range(0..accounts.len())];
        let call = CallContext::new(account, now);

        if rng.random_bool(0.5) {
            let shares = random_shares(&mut rng, 200);
            vault
                .deposit(call, shares, U256::MAX, U256::MAX)
                .unwrap();
        } else {
            let balance = vault.balance_of(account);
            if !balance.is_zero() {
                let shares = random_fraction(&mut rng, balance);
                vault
                    .withdraw(call, shares, U256::zero(), U256::zero())
                    .unwrap();
            }
        }

        if step % 5 == 0 {
            let trade = flow.next_trade();
            let (pool, bank) = vault.market_mut();
            bank.mint(addresses::token0(), trader(), trade.amount_in)
                .unwrap();
            bank.mint(addresses::token1(), trader(), trade.amount_in)
                .unwrap();
            execute_trade(pool, bank, trader(), trade).unwrap();
        }

        assert_eq!(vault.total_supply(), sum_of_share_balances(&vault));
        let ledger_liquidity: Vec<u128> = vault
            .get_all_positions()
            .iter()
            .map(|p| p.liquidity)
            .collect();
        assert!(ledger_liquidity.iter().all(|l| *l > 0));
    }
}

#[test]
fn test_round_trip_never_returns_more_than_paid() {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..10 {
        let mut vault = default_vault();
        deposit(&mut vault, alice(), units(1_000));
        rebalance_idle(&mut vault);
        open_position(&mut vault, -600, 600);
        open_position(&mut vault, 60, 1_200);

        let shares = random_shares(&mut rng, 500);
        let paid = deposit(&mut vault, bob(), shares);
        let returned = vault
            .withdraw(ctx(bob()), shares, U256::zero(), U256::zero())
            .unwrap();

        assert!(returned.amount0 <= paid.amount0);
        assert!(returned.amount1 <= paid.amount1);
        assert!(vault.balance_of(bob()).is_zero());
        assert_eq!(vault.total_supply(), units(1_000));
    }
}

#[test]
fn test_ledger_matches_pool_after_activity() {
    let mut vault = default_vault();
    deposit(&mut vault, alice(), units(1_000));
    deposit(&mut vault, bob(), units(500));
    rebalance_idle(&mut vault);
    open_position(&mut vault, -600, 600);
    open_position(&mut vault, -1_200, -60);
    trade_back_and_forth(&mut vault, units(50), 6);

    vault
        .withdraw(ctx(bob()), units(250), U256::zero(), U256::zero())
        .unwrap();
    vault
        .withdraw(ctx(alice()), units(999), U256::zero(), U256::zero())
        .unwrap();

    for position in vault.get_all_positions() {
        let on_pool =
            vault
                .pool()
                .position(vault.address(), position.tick_lower, position.tick_upper);
        assert_eq!(on_pool.liquidity, position.liquidity);
    }

    // Full exit empties the ledger
    let rest = vault.balance_of(alice());
    vault
        .withdraw(ctx(alice()), rest, U256::zero(), U256::zero())
        .unwrap();
    let rest = vault.balance_of(bob());
    vault
        .withdraw(ctx(bob()), rest, U256::zero(), U256::zero())
        .unwrap();
    assert!(vault.total_supply().is_zero());
    assert_eq!(vault.position_count(), 0);
}
