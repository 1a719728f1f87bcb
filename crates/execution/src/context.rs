use clmm_vault_domain::token::Address;
use serde::{Deserialize, Serialize};

/// Who is calling and when.
///
/// Every vault entry point takes the context explicitly; roles are checked
/// against `caller` and deadlines and fee accrual against `timestamp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    pub caller: Address,
    /// Unix seconds.
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }

    /// Same caller, later time.
    #[must_use]
    pub fn at(self, timestamp: u64) -> Self {
        Self { timestamp, ..self }
    }
}
