//! Console report of a vault.

use crate::scenario::Runner;
use anyhow::Result;
use clmm_vault_protocols::pool::ConcentratedPool;
use clmm_vault_simulation::prelude::addresses;
use primitive_types::U256;

/// Formats base units as whole units with at most six decimals.
pub fn format_units(value: U256, decimals: u8) -> String {
    let scale = U256::exp10(decimals as usize);
    let whole = value / scale;
    let fraction = value % scale;
    if fraction.is_zero() {
        return whole.to_string();
    }
    let digits = format!("{:0>width$}", fraction.to_string(), width = decimals as usize);
    let shown = digits[..digits.len().min(6)].trim_end_matches('0');
    if shown.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{shown}")
    }
}

pub fn print_report(runner: &Runner) -> Result<()> {
    let vault = &runner.vault;
    let (decimals0, decimals1) = runner.decimals();
    let share_decimals = vault.decimals();
    let slot0 = vault.pool().slot0();

    println!("\n📊 {} ({}) at t={}", vault.name(), vault.symbol(), runner.now);
    println!("════════════════════════════════════════════════════");
    println!("Spot price:      {:.6}", vault.spot_price()?);
    println!("Pool tick:       {}", slot0.tick);
    println!(
        "Total supply:    {}",
        format_units(vault.total_supply(), share_decimals)
    );

    let idle = vault.idle_balances()?;
    let assets = vault.vault_underlying_assets()?;
    println!(
        "Idle:            {} / {}",
        format_units(idle.amount0, decimals0),
        format_units(idle.amount1, decimals1)
    );
    println!(
        "Underlying:      {} / {}",
        format_units(assets.amount0, decimals0),
        format_units(assets.amount1, decimals1)
    );
    println!(
        "Value in token0: {}",
        format_units(vault.estimated_value_in_token0()?, decimals0)
    );

    let positions = vault.position_values()?;
    if !positions.is_empty() {
        println!("\n{:<18} | {:>24} | {:>22} | {:>22}", "Range", "Liquidity", "Principal", "Fees");
        println!("{}", "-".repeat(96));
        for value in positions {
            println!(
                "{:<18} | {:>24} | {:>22} | {:>22}",
                format!("[{}, {})", value.position.tick_lower, value.position.tick_upper),
                value.position.liquidity,
                format!(
                    "{} / {}",
                    format_units(value.principal.amount0, decimals0),
                    format_units(value.principal.amount1, decimals1)
                ),
                format!(
                    "{} / {}",
                    format_units(value.fees.amount0, decimals0),
                    format_units(value.fees.amount1, decimals1)
                ),
            );
        }
    }

    println!("\n{:<16} | {:>20} | {:>20} | {:>20}", "Account", "Shares", "Token0", "Token1");
    println!("{}", "-".repeat(84));
    for (name, account) in runner.accounts() {
        let shares = vault.balance_of(*account);
        let balance0 = runner.balance(addresses::token0(), *account)?;
        let balance1 = runner.balance(addresses::token1(), *account)?;
        if shares.is_zero() && balance0.is_zero() && balance1.is_zero() {
            continue;
        }
        println!(
            "{:<16} | {:>20} | {:>20} | {:>20}",
            name,
            format_units(shares, share_decimals),
            format_units(balance0, decimals0),
            format_units(balance1, decimals1)
        );
    }

    println!("\nEvents recorded: {}", vault.events().len());
    println!("════════════════════════════════════════════════════");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_units(U256::from(2_000_000u64), 6), "2");
        assert_eq!(format_units(U256::from(1u64), 18), "0");
        assert_eq!(
            format_units(U256::from(1_001u64) * U256::exp10(17), 18),
            "100.1"
        );
    }
}
