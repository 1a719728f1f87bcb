//! Vault event log.
//!
//! Events are appended as calls commit. A reverted call truncates the log
//! back to where it started, so the log only ever holds committed changes.

use clmm_vault_domain::fees::FeeConfig;
use clmm_vault_domain::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a swap was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapVenue {
    Pool,
    Aggregator(Address),
}

/// Event-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEventKind {
    /// Shares minted against deposited tokens.
    Deposit {
        account: Address,
        shares: U256,
        amount0: U256,
        amount1: U256,
        fee0: U256,
        fee1: U256,
    },
    /// Shares redeemed for tokens.
    Withdraw {
        account: Address,
        shares: U256,
        amount0: U256,
        amount1: U256,
        exit_fee_shares: U256,
        fee0: U256,
        fee1: U256,
    },
    ManagementFeeCollected {
        recipient: Address,
        shares: U256,
    },
    PerformanceFeeCollected {
        recipient: Address,
        shares: U256,
        profit: U256,
    },
    LiquidityAdded {
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        amount0: U256,
        amount1: U256,
    },
    LiquidityRemoved {
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
        amount0: U256,
        amount1: U256,
        fee0: U256,
        fee1: U256,
    },
    PositionFeesCollected {
        tick_lower: i32,
        tick_upper: i32,
        amount0: U256,
        amount1: U256,
    },
    Swapped {
        venue: SwapVenue,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        amount_out: U256,
    },
    SharesTransferred {
        from: Address,
        to: Address,
        amount: U256,
    },
    FeeConfigUpdated(FeeConfig),
    ManagerAssigned(Option<Address>),
    RouterUpdated(Option<Address>),
    OwnershipTransferred {
        previous: Address,
        owner: Address,
    },
}

/// A committed vault event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Event ID.
    pub id: Uuid,
    /// Call timestamp.
    pub timestamp: u64,
    pub kind: VaultEventKind,
}

impl VaultEvent {
    pub fn new(timestamp: u64, kind: VaultEventKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            kind,
        }
    }
}

/// Append-only list of events with rollback to a mark.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    pub fn record(&mut self, timestamp: u64, kind: VaultEventKind) {
        self.events.push(VaultEvent::new(timestamp, kind));
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Removes and returns every event.
    pub fn take(&mut self) -> Vec<VaultEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn mark(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn rollback(&mut self, mark: usize) {
        self.events.truncate(mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_drops_later_events() {
        let mut log = EventLog::default();
        log.record(1, VaultEventKind::ManagerAssigned(None));
        let mark = log.mark();
        log.record(2, VaultEventKind::RouterUpdated(None));

        log.rollback(mark);
        assert_eq!(log.events().len(), 1);
        assert_eq!(log.events()[0].timestamp, 1);
    }

    #[test]
    fn test_take_empties_log() {
        let mut log = EventLog::default();
        log.record(1, VaultEventKind::ManagerAssigned(None));
        assert_eq!(log.take().len(), 1);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_event_serializes() {
        let event = VaultEvent::new(
            7,
            VaultEventKind::SharesTransferred {
                from: Address::from_low_u64_be(1),
                to: Address::from_low_u64_be(2),
                amount: U256::from(5u64),
            },
        );
        let json = serde_json::to_string(&event).unwrap();
        let back: VaultEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
