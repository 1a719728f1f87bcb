//! Manager swaps between the vault's two tokens.
//!
//! Swaps run either directly against the pool or through the allow-listed
//! aggregator router. [`SwapRoute`] is the closed set of venues the vault
//! trusts.

use crate::context::CallContext;
use crate::error::{VaultError, VaultResult};
use crate::events::{SwapVenue, VaultEventKind};
use crate::position_manager::{check_maximum, check_minimum};
use crate::vault::Vault;
use clmm_vault_domain::math::full_math::sub;
use clmm_vault_domain::math::tick_math::{max_sqrt_ratio, min_sqrt_ratio};
use clmm_vault_domain::token::Address;
use clmm_vault_protocols::pool::{ConcentratedPool, SwapAmount, SwapParams, SwapResult};
use clmm_vault_protocols::router::SwapDescription;
use clmm_vault_protocols::token::{RestrictedLedger, TokenLedger};
use primitive_types::U256;
use tracing::{debug, info};

/// Exact-input swap against the pool.
#[derive(Debug, Clone, Copy)]
pub struct SwapInputParams {
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out_min: U256,
    /// Zero means no limit.
    pub sqrt_price_limit_x96: U256,
    pub deadline: u64,
}

/// Exact-output swap against the pool.
#[derive(Debug, Clone, Copy)]
pub struct SwapOutputParams {
    pub zero_for_one: bool,
    pub amount_out: U256,
    pub amount_in_max: U256,
    /// Zero means no limit.
    pub sqrt_price_limit_x96: U256,
    pub deadline: u64,
}

/// A swap venue the vault is willing to use.
#[derive(Debug, Clone)]
pub enum SwapRoute {
    /// Single hop through the vault's pool.
    Pool {
        zero_for_one: bool,
        amount: SwapAmount,
        /// Minimum output for exact input, maximum input for exact output.
        bound: U256,
        sqrt_price_limit_x96: U256,
        deadline: u64,
    },
    /// The allow-listed aggregator.
    Aggregator {
        router: Address,
        executor: Address,
        desc: SwapDescription,
        permit: Vec<u8>,
        data: Vec<u8>,
    },
}

/// Result of a swap as observed by the vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
}

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Sells exactly `amount_in`. Returns the amount received. Manager only.
    pub fn swap_input_single(
        &mut self,
        ctx: CallContext,
        params: SwapInputParams,
    ) -> VaultResult<U256> {
        self.atomically("swap_input_single", |vault| {
            vault.require_manager(&ctx)?;
            Self::check_deadline(&ctx, params.deadline)?;
            if params.amount_in.is_zero() {
                return Err(VaultError::ZeroAmount);
            }
            let result = vault.swap_on_pool(
                &ctx,
                params.zero_for_one,
                SwapAmount::ExactInput(params.amount_in),
                params.sqrt_price_limit_x96,
            )?;
            check_minimum(result.amount_out, params.amount_out_min)?;
            Ok(result.amount_out)
        })
    }

    /// Buys exactly `amount_out`. Returns the amount paid. Manager only.
    pub fn swap_output_single(
        &mut self,
        ctx: CallContext,
        params: SwapOutputParams,
    ) -> VaultResult<U256> {
        self.atomically("swap_output_single", |vault| {
            vault.require_manager(&ctx)?;
            Self::check_deadline(&ctx, params.deadline)?;
            if params.amount_out.is_zero() {
                return Err(VaultError::ZeroAmount);
            }
            let result = vault.swap_on_pool(
                &ctx,
                params.zero_for_one,
                SwapAmount::ExactOutput(params.amount_out),
                params.sqrt_price_limit_x96,
            )?;
            // The price limit can stop the swap short of the requested output
            if result.amount_out < params.amount_out {
                return Err(VaultError::SlippageExceeded {
                    amount: result.amount_out,
                    bound: params.amount_out,
                });
            }
            check_maximum(result.amount_in, params.amount_in_max)?;
            Ok(result.amount_in)
        })
    }

    /// Swaps through the allow-listed aggregator router. The router may only
    /// pull `desc.amount` of the source token and must deliver to the vault,
    /// whatever `desc.dst_receiver` says. Returns the amount received as
    /// measured on the vault's balance. Manager only.
    pub fn swap(
        &mut self,
        ctx: CallContext,
        router: Address,
        executor: Address,
        desc: SwapDescription,
        permit: &[u8],
        data: &[u8],
    ) -> VaultResult<U256> {
        self.atomically("swap", |vault| {
            vault.require_manager(&ctx)?;
            if vault.state.router != Some(router) {
                return Err(VaultError::RouterMismatch {
                    expected: vault.state.router,
                    actual: router,
                });
            }
            let pair = vault.token_pair();
            if desc.src_token == desc.dst_token
                || !pair.contains(desc.src_token)
                || !pair.contains(desc.dst_token)
            {
                return Err(VaultError::InvalidSwapTokens {
                    src: desc.src_token,
                    dst: desc.dst_token,
                });
            }
            if desc.amount.is_zero() {
                return Err(VaultError::ZeroAmount);
            }
            let aggregator = vault
                .routers
                .get(&router)
                .cloned()
                .ok_or(VaultError::RouterUnavailable(router))?;

            let this = vault.address;
            let mut desc = desc;
            desc.dst_receiver = this;

            let src_before = vault.tokens.balance_of(desc.src_token, this)?;
            let dst_before = vault.tokens.balance_of(desc.dst_token, this)?;
            vault
                .tokens
                .approve(desc.src_token, this, router, desc.amount)?;

            let reported = {
                let mut restricted = RestrictedLedger::new(&mut vault.tokens, this);
                aggregator.swap(&mut restricted, this, executor, &desc, permit, data)?
            };

            let src_after = vault.tokens.balance_of(desc.src_token, this)?;
            let dst_after = vault.tokens.balance_of(desc.dst_token, this)?;
            if dst_after < dst_before {
                return Err(VaultError::SlippageExceeded {
                    amount: U256::zero(),
                    bound: U256::one(),
                });
            }
            let amount_out = dst_after - dst_before;
            let amount_in = sub(src_before, src_after)?;
            debug!(
                reported_return = %reported.return_amount,
                reported_spent = %reported.spent_amount,
                amount_in = %amount_in,
                amount_out = %amount_out,
                "Aggregator swap settled"
            );
            check_maximum(amount_in, desc.amount)?;
            check_minimum(amount_out, desc.min_return_amount.max(U256::one()))?;

            vault.tokens.approve(desc.src_token, this, router, U256::zero())?;

            info!(
                router = ?router,
                token_in = ?desc.src_token,
                token_out = ?desc.dst_token,
                amount_in = %amount_in,
                amount_out = %amount_out,
                "Aggregator swap"
            );
            vault.record(
                &ctx,
                VaultEventKind::Swapped {
                    venue: SwapVenue::Aggregator(router),
                    token_in: desc.src_token,
                    token_out: desc.dst_token,
                    amount_in,
                    amount_out,
                },
            );
            Ok(amount_out)
        })
    }

    /// Runs a swap through one of the trusted venues.
    pub fn execute_route(&mut self, ctx: CallContext, route: SwapRoute) -> VaultResult<SwapOutcome> {
        match route {
            SwapRoute::Pool {
                zero_for_one,
                amount,
                bound,
                sqrt_price_limit_x96,
                deadline,
            } => {
                let pair = self.token_pair();
                let (token_in, token_out) = if zero_for_one {
                    (pair.token0, pair.token1)
                } else {
                    (pair.token1, pair.token0)
                };
                let (amount_in, amount_out) = match amount {
                    SwapAmount::ExactInput(amount_in) => {
                        let amount_out = self.swap_input_single(
                            ctx,
                            SwapInputParams {
                                zero_for_one,
                                amount_in,
                                amount_out_min: bound,
                                sqrt_price_limit_x96,
                                deadline,
                            },
                        )?;
                        (amount_in, amount_out)
                    }
                    SwapAmount::ExactOutput(amount_out) => {
                        let amount_in = self.swap_output_single(
                            ctx,
                            SwapOutputParams {
                                zero_for_one,
                                amount_out,
                                amount_in_max: bound,
                                sqrt_price_limit_x96,
                                deadline,
                            },
                        )?;
                        (amount_in, amount_out)
                    }
                };
                Ok(SwapOutcome {
                    token_in,
                    token_out,
                    amount_in,
                    amount_out,
                })
            }
            SwapRoute::Aggregator {
                router,
                executor,
                desc,
                permit,
                data,
            } => {
                let token_in = desc.src_token;
                let token_out = desc.dst_token;
                let amount_in = desc.amount;
                let amount_out = self.swap(ctx, router, executor, desc, &permit, &data)?;
                Ok(SwapOutcome {
                    token_in,
                    token_out,
                    amount_in,
                    amount_out,
                })
            }
        }
    }

    fn swap_on_pool(
        &mut self,
        ctx: &CallContext,
        zero_for_one: bool,
        amount: SwapAmount,
        sqrt_price_limit_x96: U256,
    ) -> VaultResult<SwapResult> {
        let limit = if !sqrt_price_limit_x96.is_zero() {
            sqrt_price_limit_x96
        } else if zero_for_one {
            min_sqrt_ratio() + U256::one()
        } else {
            max_sqrt_ratio() - U256::one()
        };

        let this = self.address;
        let result = self.pool.swap(
            &mut self.tokens,
            SwapParams {
                payer: this,
                recipient: this,
                zero_for_one,
                amount,
                sqrt_price_limit_x96: limit,
            },
        )?;

        let pair = self.token_pair();
        let (token_in, token_out) = if zero_for_one {
            (pair.token0, pair.token1)
        } else {
            (pair.token1, pair.token0)
        };
        info!(
            zero_for_one,
            amount_in = %result.amount_in,
            amount_out = %result.amount_out,
            tick = result.tick,
            "Pool swap"
        );
        self.record(
            ctx,
            VaultEventKind::Swapped {
                venue: SwapVenue::Pool,
                token_in,
                token_out,
                amount_in: result.amount_in,
                amount_out: result.amount_out,
            },
        );
        Ok(result)
    }
}
