//! Scenario files and their replay against a simulated market.

use anyhow::{Context, Result, anyhow, bail};
use clmm_vault_domain::fees::FeeConfig;
use clmm_vault_domain::token::Address;
use clmm_vault_execution::prelude::*;
use clmm_vault_protocols::token::TokenLedger;
use clmm_vault_simulation::prelude::*;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Vault used by the runner.
pub type SimulatedVault = Vault<SimulatedPool, TokenBank>;

/// A market, a vault and the calls to replay against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default = "default_start")]
    pub start_timestamp: u64,
    pub steps: Vec<Step>,
}

fn default_start() -> u64 {
    1_700_000_000
}

/// One call in a scenario. Token and share amounts are in whole units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Moves the clock forward.
    Advance { seconds: u64 },
    /// Mints tokens to an account and approves the vault.
    Fund {
        account: String,
        amount0: Decimal,
        amount1: Decimal,
    },
    Deposit {
        account: String,
        shares: Decimal,
        #[serde(default)]
        amount0_max: Option<Decimal>,
        #[serde(default)]
        amount1_max: Option<Decimal>,
    },
    /// Redeems `shares`, or the whole balance when absent.
    Withdraw {
        account: String,
        #[serde(default)]
        shares: Option<Decimal>,
        #[serde(default)]
        amount0_min: Option<Decimal>,
        #[serde(default)]
        amount1_min: Option<Decimal>,
    },
    /// Deploys `fraction` of the liquidity idle balances support.
    AddLiquidity {
        tick_lower: i32,
        tick_upper: i32,
        fraction: Decimal,
    },
    /// Withdraws `fraction` of a position's liquidity.
    RemoveLiquidity {
        tick_lower: i32,
        tick_upper: i32,
        fraction: Decimal,
    },
    /// Manager swap through the pool.
    Swap {
        zero_for_one: bool,
        amount_in: Decimal,
        #[serde(default)]
        amount_out_min: Option<Decimal>,
    },
    /// Outside trader swap.
    Trade { zero_for_one: bool, amount_in: Decimal },
    /// Random outside order flow.
    RandomTrades {
        seed: u64,
        count: usize,
        median_size: Decimal,
        dispersion: f64,
    },
    CollectFees,
    CollectManagementFee,
    SetFeeConfig { fee_config: FeeConfig },
    Report,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// A small scenario exercising every kind of call.
    pub fn template() -> Self {
        let units = |n: u64| Decimal::from(n);
        Self {
            market: MarketConfig::default(),
            vault: VaultConfig::new("Demo Vault Share", "DVS").with_fee_config(
                FeeConfig::new(Address::from_low_u64_be(0xfee))
                    .with_entry_fee(1_000)
                    .with_exit_fee(1_000)
                    .with_management_fee(20_000)
                    .with_performance_fee(100_000),
            ),
            start_timestamp: default_start(),
            steps: vec![
                Step::Fund {
                    account: "alice".to_string(),
                    amount0: units(1_000),
                    amount1: units(1_000),
                },
                Step::Deposit {
                    account: "alice".to_string(),
                    shares: units(100),
                    amount0_max: None,
                    amount1_max: None,
                },
                Step::Swap {
                    zero_for_one: true,
                    amount_in: units(50),
                    amount_out_min: None,
                },
                Step::AddLiquidity {
                    tick_lower: -600,
                    tick_upper: 600,
                    fraction: Decimal::new(8, 1),
                },
                Step::RandomTrades {
                    seed: 7,
                    count: 50,
                    median_size: units(20),
                    dispersion: 0.8,
                },
                Step::Advance { seconds: 86_400 },
                Step::CollectFees,
                Step::Report,
                Step::Withdraw {
                    account: "alice".to_string(),
                    shares: None,
                    amount0_min: None,
                    amount1_min: None,
                },
                Step::Report,
            ],
        }
    }
}

/// Replays scenario steps, naming accounts as they first appear.
pub struct Runner {
    pub vault: SimulatedVault,
    pub now: u64,
    accounts: BTreeMap<String, Address>,
    decimals0: u8,
    decimals1: u8,
}

impl Runner {
    pub fn new(scenario: &Scenario) -> Result<Self> {
        let market = Market::new(&scenario.market).context("building market")?;
        let mut accounts = BTreeMap::new();
        accounts.insert("owner".to_string(), Address::from_low_u64_be(0x1));
        accounts.insert("manager".to_string(), Address::from_low_u64_be(0x2));
        accounts.insert("trader".to_string(), Address::from_low_u64_be(0x3));
        accounts.insert(
            "fee_recipient".to_string(),
            scenario.vault.fee_config.fee_recipient,
        );

        let now = scenario.start_timestamp;
        let owner = accounts["owner"];
        let manager = accounts["manager"];
        let mut vault = Vault::new(
            CallContext::new(owner, now),
            Address::from_low_u64_be(0x5000),
            market.pool,
            market.bank,
            scenario.vault.clone(),
        )
        .context("creating vault")?;
        vault.assign_manager(CallContext::new(owner, now), Some(manager))?;

        Ok(Self {
            vault,
            now,
            accounts,
            decimals0: scenario.market.token0_decimals,
            decimals1: scenario.market.token1_decimals,
        })
    }

    pub fn accounts(&self) -> &BTreeMap<String, Address> {
        &self.accounts
    }

    pub fn decimals(&self) -> (u8, u8) {
        (self.decimals0, self.decimals1)
    }

    fn account(&mut self, name: &str) -> Address {
        let next = 0x100 + self.accounts.len() as u64;
        *self
            .accounts
            .entry(name.to_string())
            .or_insert_with(|| Address::from_low_u64_be(next))
    }

    fn ctx(&self, caller: Address) -> CallContext {
        CallContext::new(caller, self.now)
    }

    fn manager(&self) -> CallContext {
        self.ctx(self.accounts["manager"])
    }

    /// Runs one step. Returns `true` when a report was requested.
    pub fn apply(&mut self, step: &Step) -> Result<bool> {
        match step {
            Step::Advance { seconds } => {
                self.now += seconds;
            }
            Step::Fund {
                account,
                amount0,
                amount1,
            } => {
                let account = self.account(account);
                let amount0 = to_base_units(*amount0, self.decimals0)?;
                let amount1 = to_base_units(*amount1, self.decimals1)?;
                let spender = self.vault.address();
                let (_, bank) = self.vault.market_mut();
                for (token, amount) in [
                    (addresses::token0(), amount0),
                    (addresses::token1(), amount1),
                ] {
                    bank.mint(token, account, amount)?;
                    bank.approve(token, account, spender, U256::MAX)?;
                }
            }
            Step::Deposit {
                account,
                shares,
                amount0_max,
                amount1_max,
            } => {
                let caller = self.account(account);
                let shares = to_base_units(*shares, self.vault.decimals())?;
                let max0 = bound_or(*amount0_max, self.decimals0, U256::MAX)?;
                let max1 = bound_or(*amount1_max, self.decimals1, U256::MAX)?;
                let ctx = self.ctx(caller);
                let paid = self.vault.deposit(ctx, shares, max0, max1)?;
                info!(account = %account, amount0 = %paid.amount0, amount1 = %paid.amount1, "Deposited");
            }
            Step::Withdraw {
                account,
                shares,
                amount0_min,
                amount1_min,
            } => {
                let caller = self.account(account);
                let shares = match shares {
                    Some(shares) => to_base_units(*shares, self.vault.decimals())?,
                    None => self.vault.balance_of(caller),
                };
                let min0 = bound_or(*amount0_min, self.decimals0, U256::zero())?;
                let min1 = bound_or(*amount1_min, self.decimals1, U256::zero())?;
                let ctx = self.ctx(caller);
                let out = self.vault.withdraw(ctx, shares, min0, min1)?;
                info!(account = %account, amount0 = %out.amount0, amount1 = %out.amount1, "Withdrew");
            }
            Step::AddLiquidity {
                tick_lower,
                tick_upper,
                fraction,
            } => {
                let idle = self.vault.idle_balances()?;
                let supported = self.vault.get_liquidity_for_amounts(
                    *tick_lower,
                    *tick_upper,
                    idle.amount0,
                    idle.amount1,
                )?;
                let liquidity = scale_liquidity(supported, *fraction)?;
                let ctx = self.manager();
                self.vault.add_liquidity(
                    ctx,
                    AddLiquidityParams {
                        tick_lower: *tick_lower,
                        tick_upper: *tick_upper,
                        liquidity,
                        amount0_min: U256::zero(),
                        amount1_min: U256::zero(),
                        deadline: self.now,
                    },
                )?;
            }
            Step::RemoveLiquidity {
                tick_lower,
                tick_upper,
                fraction,
            } => {
                let position = self
                    .vault
                    .get_all_positions()
                    .into_iter()
                    .find(|p| p.tick_lower == *tick_lower && p.tick_upper == *tick_upper)
                    .ok_or_else(|| anyhow!("no position [{tick_lower}, {tick_upper})"))?;
                let liquidity = scale_liquidity(position.liquidity, *fraction)?;
                let ctx = self.manager();
                self.vault.remove_liquidity(
                    ctx,
                    RemoveLiquidityParams {
                        tick_lower: *tick_lower,
                        tick_upper: *tick_upper,
                        liquidity,
                        amount0_min: U256::zero(),
                        amount1_min: U256::zero(),
                        deadline: self.now,
                    },
                )?;
            }
            Step::Swap {
                zero_for_one,
                amount_in,
                amount_out_min,
            } => {
                let in_decimals = if *zero_for_one { self.decimals0 } else { self.decimals1 };
                let out_decimals = if *zero_for_one { self.decimals1 } else { self.decimals0 };
                let ctx = self.manager();
                self.vault.swap_input_single(
                    ctx,
                    SwapInputParams {
                        zero_for_one: *zero_for_one,
                        amount_in: to_base_units(*amount_in, in_decimals)?,
                        amount_out_min: bound_or(*amount_out_min, out_decimals, U256::zero())?,
                        sqrt_price_limit_x96: U256::zero(),
                        deadline: self.now,
                    },
                )?;
            }
            Step::Trade {
                zero_for_one,
                amount_in,
            } => {
                let decimals = if *zero_for_one { self.decimals0 } else { self.decimals1 };
                let trade = Trade {
                    zero_for_one: *zero_for_one,
                    amount_in: to_base_units(*amount_in, decimals)?,
                };
                self.outside_trade(trade)?;
            }
            Step::RandomTrades {
                seed,
                count,
                median_size,
                dispersion,
            } => {
                let median = median_size
                    .to_f64()
                    .ok_or_else(|| anyhow!("median size {median_size} out of range"))?
                    * 10f64.powi(i32::from(self.decimals0));
                let mut flow = RandomOrderFlow::new(*seed, median, *dispersion)
                    .map_err(|e| anyhow!("invalid order flow: {e}"))?;
                for trade in flow.generate(*count) {
                    self.outside_trade(trade)?;
                }
            }
            Step::CollectFees => {
                let ctx = self.ctx(self.accounts["owner"]);
                self.vault.collect_all_position_fees(ctx)?;
            }
            Step::CollectManagementFee => {
                let ctx = self.ctx(self.accounts["owner"]);
                self.vault.collect_management_fee(ctx)?;
            }
            Step::SetFeeConfig { fee_config } => {
                let ctx = self.ctx(self.accounts["owner"]);
                self.vault.set_fee_config(ctx, *fee_config)?;
            }
            Step::Report => return Ok(true),
        }
        Ok(false)
    }

    fn outside_trade(&mut self, trade: Trade) -> Result<()> {
        let trader = self.accounts["trader"];
        let token = if trade.zero_for_one {
            addresses::token0()
        } else {
            addresses::token1()
        };
        let (pool, bank) = self.vault.market_mut();
        bank.mint(token, trader, trade.amount_in)?;
        execute_trade(pool, bank, trader, trade)?;
        Ok(())
    }

    pub fn balance(&self, token: Address, account: Address) -> Result<U256> {
        Ok(self.vault.tokens().balance_of(token, account)?)
    }
}

/// Converts whole units into base units, truncating below one base unit.
pub fn to_base_units(value: Decimal, decimals: u8) -> Result<U256> {
    if value.is_sign_negative() {
        bail!("negative amount {value}");
    }
    let whole = value.trunc();
    let fraction = value - whole;
    let whole = whole
        .to_u128()
        .ok_or_else(|| anyhow!("amount {value} out of range"))?;
    let scale = U256::exp10(decimals as usize);

    // The fractional part carries at most 28 digits
    let digits = fraction.scale().min(decimals as u32);
    let fraction = (fraction * Decimal::from_i128_with_scale(10i128.pow(digits), 0))
        .trunc()
        .to_u128()
        .ok_or_else(|| anyhow!("amount {value} out of range"))?;
    let fraction = U256::from(fraction) * U256::exp10((decimals as u32 - digits) as usize);

    Ok(U256::from(whole) * scale + fraction)
}

fn bound_or(value: Option<Decimal>, decimals: u8, default: U256) -> Result<U256> {
    value.map_or(Ok(default), |v| to_base_units(v, decimals))
}

fn scale_liquidity(liquidity: u128, fraction: Decimal) -> Result<u128> {
    if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
        bail!("fraction {fraction} must be in (0, 1]");
    }
    let scaled = Decimal::from_u128(liquidity)
        .and_then(|l| l.checked_mul(fraction))
        .ok_or_else(|| anyhow!("liquidity {liquidity} too large to scale"))?;
    scaled
        .trunc()
        .to_u128()
        .ok_or_else(|| anyhow!("liquidity {liquidity} too large to scale"))
}
