mod common;

use clmm_vault_domain::fees::{FeeConfigError, SECONDS_IN_A_YEAR};
use clmm_vault_domain::token::Address;
use clmm_vault_execution::prelude::*;
use clmm_vault_simulation::prelude::*;
use common::*;
use primitive_types::U256;

fn at(caller: Address, elapsed: u64) -> CallContext {
    CallContext::new(caller, START + elapsed)
}

fn management_vault(rate: u32) -> TestVault {
    let mut vault = setup(VaultConfig::default().with_fee_config(fees().with_management_fee(rate)));
    deposit(&mut vault, alice(), units(100));
    vault
}

#[test]
fn test_fee_config_bounds() {
    let mut vault = default_vault();

    let err = vault
        .set_fee_config(ctx(owner()), fees().with_entry_fee(500_001))
        .unwrap_err();
    assert!(matches!(
        err,
        VaultError::InvalidFeeConfig(FeeConfigError::EntryExitTooHigh { .. })
    ));

    let err = vault
        .set_fee_config(ctx(owner()), fees().with_entry_fee(300_000).with_exit_fee(200_001))
        .unwrap_err();
    assert!(matches!(err, VaultError::InvalidFeeConfig(_)));

    let config = fees().with_entry_fee(1_000).with_exit_fee(2_000);
    vault.set_fee_config(ctx(owner()), config).unwrap();
    assert_eq!(vault.fee_config().entry_fee, 1_000);
    assert_eq!(vault.fee_config().exit_fee, 2_000);
    assert_eq!(
        vault.events().last().unwrap().kind,
        VaultEventKind::FeeConfigUpdated(config)
    );
}

#[test]
fn test_fee_config_is_owner_only() {
    let mut vault = default_vault();
    assert_eq!(
        vault.set_fee_config(ctx(manager()), fees().with_entry_fee(1)),
        Err(VaultError::Unauthorized {
            caller: manager(),
            role: Role::Owner,
        })
    );
    assert_eq!(vault.fee_config().entry_fee, 0);
}

#[test]
fn test_management_fee_over_one_year() {
    let mut vault = management_vault(20_000);

    let settlement = vault
        .collect_management_fee(at(bob(), SECONDS_IN_A_YEAR))
        .unwrap();

    // ceil(100 * 0.02 / 0.98) units, so the recipient ends up with 2%
    let expected = (units(100) + U256::from(48u8)) / U256::from(49u8);
    assert_eq!(settlement.management_shares, expected);
    assert!(settlement.performance_shares.is_zero());
    assert_eq!(vault.balance_of(fee_recipient()), expected);
    assert_eq!(vault.total_supply(), units(100) + expected);
    assert_eq!(vault.last_collect_management_fee(), START + SECONDS_IN_A_YEAR);
}

#[test]
fn test_management_fee_is_monotonic_in_time() {
    let mut short = management_vault(20_000);
    let mut long = management_vault(20_000);

    let day = 86_400;
    let short_fee = short
        .collect_management_fee(at(bob(), day))
        .unwrap()
        .management_shares;
    let long_fee = long
        .collect_management_fee(at(bob(), 2 * day))
        .unwrap()
        .management_shares;
    assert!(!short_fee.is_zero());
    assert!(long_fee > short_fee);

    // Nothing accrues twice for the same window, or for a stale timestamp
    let again = short.collect_management_fee(at(bob(), day)).unwrap();
    assert!(again.management_shares.is_zero());
    let stale = short.collect_management_fee(at(bob(), 10)).unwrap();
    assert!(stale.management_shares.is_zero());
    assert_eq!(short.last_collect_management_fee(), START + day);
}

#[test]
fn test_deposit_settles_management_fee_first() {
    let mut vault = management_vault(20_000);
    fund(&mut vault, bob(), units(1_000), units(1_000));

    vault
        .deposit(at(bob(), SECONDS_IN_A_YEAR), units(50), U256::MAX, U256::MAX)
        .unwrap();

    let expected = (units(100) + U256::from(48u8)) / U256::from(49u8);
    assert_eq!(vault.balance_of(fee_recipient()), expected);
    assert_eq!(vault.last_collect_management_fee(), START + SECONDS_IN_A_YEAR);
    assert_eq!(vault.total_supply(), sum_of_share_balances(&vault));
}

#[test]
fn test_fee_change_settles_under_old_rate() {
    let mut vault = management_vault(20_000);

    vault
        .set_fee_config(at(owner(), SECONDS_IN_A_YEAR), fees())
        .unwrap();
    let expected = (units(100) + U256::from(48u8)) / U256::from(49u8);
    assert_eq!(vault.balance_of(fee_recipient()), expected);

    let later = vault
        .collect_management_fee(at(bob(), 2 * SECONDS_IN_A_YEAR))
        .unwrap();
    assert!(later.management_shares.is_zero());
}

#[test]
fn test_empty_vault_accrues_nothing() {
    let mut vault = setup(VaultConfig::default().with_fee_config(fees().with_management_fee(20_000)));
    let settlement = vault
        .collect_management_fee(at(bob(), SECONDS_IN_A_YEAR))
        .unwrap();
    assert_eq!(settlement, FeeSettlement::default());
    assert_eq!(vault.last_collect_management_fee(), START + SECONDS_IN_A_YEAR);

    // The first depositor does not pay for the idle year
    deposit(&mut vault, alice(), units(100));
    let settlement = vault
        .collect_management_fee(at(bob(), SECONDS_IN_A_YEAR))
        .unwrap();
    assert!(settlement.management_shares.is_zero());
}

#[test]
fn test_performance_fee_on_new_profit_only() {
    let mut vault = setup(VaultConfig::default().with_fee_config(fees().with_performance_fee(100_000)));
    deposit(&mut vault, alice(), units(100));
    assert_eq!(
        vault.state().high_water_mark.value_per_share(),
        Some(U256::exp10(18))
    );

    // 10 units of profit land in the vault
    let this = vault.address();
    vault
        .market_mut()
        .1
        .mint(addresses::token0(), this, units(10))
        .unwrap();

    let settlement = vault.collect_management_fee(at(bob(), 60)).unwrap();
    // 10% of 10 units, minted as floor(1 * 100 / (110 - 1)) units of shares
    let expected = units(100) / U256::from(109u8);
    assert_eq!(settlement.performance_shares, expected);
    assert_eq!(vault.balance_of(fee_recipient()), expected);
    assert!(
        vault
            .events()
            .iter()
            .any(|e| matches!(e.kind, VaultEventKind::PerformanceFeeCollected { .. }))
    );

    // Already charged profit is not charged again
    let settlement = vault.collect_management_fee(at(bob(), 120)).unwrap();
    assert!(settlement.performance_shares.is_zero());
}

#[test]
fn test_no_performance_fee_below_mark() {
    let mut vault = setup(VaultConfig::default().with_fee_config(fees().with_performance_fee(100_000)));
    deposit(&mut vault, alice(), units(100));
    let mark = vault.state().high_water_mark.value_per_share();

    // Swap fees and price impact cost the vault some value
    rebalance_idle(&mut vault);
    let settlement = vault.collect_management_fee(at(bob(), 60)).unwrap();
    assert!(settlement.performance_shares.is_zero());
    assert_eq!(vault.state().high_water_mark.value_per_share(), mark);
}

#[test]
fn test_high_water_mark_resets_on_full_exit() {
    let mut vault = setup(VaultConfig::default().with_fee_config(fees().with_performance_fee(100_000)));
    deposit(&mut vault, alice(), units(100));
    vault
        .withdraw(ctx(alice()), units(100), U256::zero(), U256::zero())
        .unwrap();

    assert!(vault.total_supply().is_zero());
    assert_eq!(vault.state().high_water_mark.value_per_share(), None);
}
