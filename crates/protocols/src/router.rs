use crate::error::RouterError;
use crate::token::TokenLedger;
use clmm_vault_domain::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Route header understood by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapDescription {
    /// Token sold.
    pub src_token: Address,
    /// Token bought.
    pub dst_token: Address,
    /// Account the source tokens are sent to first.
    pub src_receiver: Address,
    /// Account receiving the bought tokens.
    pub dst_receiver: Address,
    /// Amount of the source token sold.
    pub amount: U256,
    /// Minimum amount of the destination token.
    pub min_return_amount: U256,
    /// Router specific flags.
    pub flags: U256,
}

/// Amounts reported by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReturn {
    pub return_amount: U256,
    pub spent_amount: U256,
}

/// An external swap aggregator.
///
/// The router pulls `desc.amount` of the source token from `caller` with the
/// allowance the caller granted it, and delivers the output to
/// `desc.dst_receiver`. Callers must not trust the reported amounts.
pub trait AggregatorRouter: Send + Sync {
    /// Address the router is deployed at.
    fn address(&self) -> Address;

    fn swap(
        &self,
        tokens: &mut dyn TokenLedger,
        caller: Address,
        executor: Address,
        desc: &SwapDescription,
        permit: &[u8],
        data: &[u8],
    ) -> Result<SwapReturn, RouterError>;
}
