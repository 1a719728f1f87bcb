use crate::config::ExitFeeSettlement;
use crate::shares::ShareToken;
use clmm_vault_domain::fees::{FeeConfig, HighWaterMark};
use clmm_vault_domain::position::PositionLedger;
use clmm_vault_domain::token::Address;
use serde::{Deserialize, Serialize};

/// Everything the vault owns besides token balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    /// Share token name.
    pub name: String,
    /// Share token symbol.
    pub symbol: String,
    /// Share decimals, token0 decimals plus `decimal_offset`.
    pub decimals: u8,
    pub decimal_offset: u8,
    pub owner: Address,
    /// Only account allowed to move liquidity and swap.
    pub manager: Option<Address>,
    /// Allow-listed aggregator router.
    pub router: Option<Address>,
    pub fee_config: FeeConfig,
    pub exit_fee_settlement: ExitFeeSettlement,
    /// Timestamp up to which the management fee has been charged.
    pub last_collect_management_fee: u64,
    pub high_water_mark: HighWaterMark,
    pub shares: ShareToken,
    pub ledger: PositionLedger,
}
