//! Aggregator routers for tests and scenarios.

use clmm_vault_domain::math::full_math::mul_div;
use clmm_vault_domain::token::Address;
use clmm_vault_protocols::error::RouterError;
use clmm_vault_protocols::router::{AggregatorRouter, SwapDescription, SwapReturn};
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use std::collections::HashMap;

/// Router filling every route at a fixed rate from its own treasury.
#[derive(Debug, Clone)]
pub struct FixedRateRouter {
    address: Address,
    treasury: Address,
    /// `(src, dst) -> (numerator, denominator)` of dst paid per src sold.
    rates: HashMap<(Address, Address), (U256, U256)>,
}

impl FixedRateRouter {
    pub fn new(address: Address, treasury: Address) -> Self {
        Self {
            address,
            treasury,
            rates: HashMap::new(),
        }
    }

    /// Quotes `numerator / denominator` of `dst` for each unit of `src`.
    #[must_use]
    pub fn with_rate(
        mut self,
        src: Address,
        dst: Address,
        numerator: U256,
        denominator: U256,
    ) -> Self {
        self.rates.insert((src, dst), (numerator, denominator));
        self
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }

    pub fn quote(&self, src: Address, dst: Address, amount: U256) -> Result<U256, RouterError> {
        let (numerator, denominator) = self
            .rates
            .get(&(src, dst))
            .ok_or_else(|| RouterError::Rejected(format!("no rate for {src:?} -> {dst:?}")))?;
        Ok(mul_div(amount, *numerator, *denominator)?)
    }
}

impl AggregatorRouter for FixedRateRouter {
    fn address(&self) -> Address {
        self.address
    }

    fn swap(
        &self,
        tokens: &mut dyn TokenLedger,
        caller: Address,
        _executor: Address,
        desc: &SwapDescription,
        _permit: &[u8],
        _data: &[u8],
    ) -> Result<SwapReturn, RouterError> {
        let return_amount = self.quote(desc.src_token, desc.dst_token, desc.amount)?;
        if return_amount < desc.min_return_amount {
            return Err(RouterError::ReturnAmountTooLow {
                actual: return_amount,
                minimum: desc.min_return_amount,
            });
        }

        tokens.transfer_from(desc.src_token, self.address, caller, self.treasury, desc.amount)?;
        tokens.transfer(desc.dst_token, self.treasury, desc.dst_receiver, return_amount)?;

        Ok(SwapReturn {
            return_amount,
            spent_amount: desc.amount,
        })
    }
}

/// Misbehaviour of a [`HostileRouter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostileBehavior {
    /// Delivers the output to the given account instead of `dst_receiver`.
    Redirect(Address),
    /// Pulls twice the described amount from the caller.
    Overdraw,
    /// Reports a return amount it never delivers.
    MisreportReturn,
    /// Moves three times the described amount straight out of the caller to
    /// the given account and pays one base unit back.
    Drain(Address),
    /// Raises its own allowance over the caller before pulling everything.
    SelfApprove,
}

/// Router that tries to take more than the vault intends to give.
#[derive(Debug, Clone)]
pub struct HostileRouter {
    inner: FixedRateRouter,
    behavior: HostileBehavior,
}

impl HostileRouter {
    pub fn new(inner: FixedRateRouter, behavior: HostileBehavior) -> Self {
        Self { inner, behavior }
    }
}

impl AggregatorRouter for HostileRouter {
    fn address(&self) -> Address {
        self.inner.address
    }

    fn swap(
        &self,
        tokens: &mut dyn TokenLedger,
        caller: Address,
        _executor: Address,
        desc: &SwapDescription,
        _permit: &[u8],
        _data: &[u8],
    ) -> Result<SwapReturn, RouterError> {
        let return_amount = self
            .inner
            .quote(desc.src_token, desc.dst_token, desc.amount)?;
        let treasury = self.inner.treasury;
        let router = self.inner.address;

        match self.behavior {
            HostileBehavior::Redirect(thief) => {
                tokens.transfer_from(desc.src_token, router, caller, treasury, desc.amount)?;
                tokens.transfer(desc.dst_token, treasury, thief, return_amount)?;
            }
            HostileBehavior::Overdraw => {
                let doubled = desc.amount.saturating_mul(U256::from(2u8));
                tokens.transfer_from(desc.src_token, router, caller, treasury, doubled)?;
                tokens.transfer(desc.dst_token, treasury, desc.dst_receiver, return_amount)?;
            }
            HostileBehavior::MisreportReturn => {
                tokens.transfer_from(desc.src_token, router, caller, treasury, desc.amount)?;
            }
            HostileBehavior::Drain(thief) => {
                let tripled = desc.amount.saturating_mul(U256::from(3u8));
                tokens.transfer(desc.src_token, caller, thief, tripled)?;
                tokens.transfer(desc.dst_token, treasury, desc.dst_receiver, U256::one())?;
            }
            HostileBehavior::SelfApprove => {
                let balance = tokens.balance_of(desc.src_token, caller)?;
                tokens.approve(desc.src_token, caller, router, U256::MAX)?;
                tokens.transfer_from(desc.src_token, router, caller, treasury, balance)?;
                tokens.transfer(desc.dst_token, treasury, desc.dst_receiver, return_amount)?;
            }
        }

        Ok(SwapReturn {
            return_amount,
            spent_amount: desc.amount,
        })
    }
}
