//! The vault aggregate.
//!
//! [`Vault`] owns its state, the pool it deploys into and the token ledger
//! holding every balance. Behaviour is split by concern across
//! `position_manager`, `valuation`, `share_accounting`, `fee_settlement` and
//! `swap_executor`; this module holds construction, access control, the
//! owner surface and the all-or-nothing call wrapper.

use crate::config::{ConfigError, VaultConfig};
use crate::context::CallContext;
use crate::error::{Role, VaultError, VaultResult};
use crate::events::{EventLog, VaultEvent, VaultEventKind};
use crate::guard::ReentrancyGuard;
use crate::state::VaultState;
use clmm_vault_domain::fees::{FeeConfig, HighWaterMark};
use clmm_vault_domain::position::PositionLedger;
use clmm_vault_domain::token::{Address, TokenPair};
use clmm_vault_protocols::pool::ConcentratedPool;
use clmm_vault_protocols::router::AggregatorRouter;
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Share-based vault over one concentrated liquidity pool.
pub struct Vault<P, T> {
    pub(crate) address: Address,
    pub(crate) pool: P,
    pub(crate) tokens: T,
    pub(crate) state: VaultState,
    /// Deployed routers by address; only the allow-listed one is ever called.
    pub(crate) routers: HashMap<Address, Arc<dyn AggregatorRouter>>,
    pub(crate) events: EventLog,
    guard: ReentrancyGuard,
}

struct Snapshot<P, T> {
    state: VaultState,
    pool: P,
    tokens: T,
    events: usize,
}

impl<P, T> Vault<P, T>
where
    P: ConcentratedPool + Clone,
    T: TokenLedger + Clone,
{
    /// Creates a vault at `address`, owned by `ctx.caller`.
    pub fn new(
        ctx: CallContext,
        address: Address,
        pool: P,
        tokens: T,
        config: VaultConfig,
    ) -> VaultResult<Self> {
        config.validate()?;
        if pool.token0() == pool.token1() {
            return Err(ConfigError::IdenticalTokens.into());
        }
        let decimals = config.share_decimals(tokens.decimals(pool.token0())?)?;

        info!(
            vault = ?address,
            pool = ?pool.address(),
            owner = ?ctx.caller,
            name = %config.name,
            "Creating vault"
        );

        let state = VaultState {
            name: config.name,
            symbol: config.symbol,
            decimals,
            decimal_offset: config.decimal_offset,
            owner: ctx.caller,
            manager: None,
            router: None,
            fee_config: config.fee_config,
            exit_fee_settlement: config.exit_fee_settlement,
            last_collect_management_fee: ctx.timestamp,
            high_water_mark: HighWaterMark::default(),
            shares: Default::default(),
            ledger: PositionLedger::new(config.max_positions),
        };

        Ok(Self {
            address,
            pool,
            tokens,
            state,
            routers: HashMap::new(),
            events: EventLog::default(),
            guard: ReentrancyGuard::default(),
        })
    }

    /// Makes a deployed router reachable. Calls still require the router to
    /// be allow-listed with [`Vault::set_router`].
    pub fn register_aggregator(&mut self, router: Arc<dyn AggregatorRouter>) {
        self.routers.insert(router.address(), router);
    }

    /// Runs `f` as one all-or-nothing call under the reentrancy guard.
    pub(crate) fn atomically<R>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut Self) -> VaultResult<R>,
    ) -> VaultResult<R> {
        self.guard.enter()?;
        let snapshot = Snapshot {
            state: self.state.clone(),
            pool: self.pool.clone(),
            tokens: self.tokens.clone(),
            events: self.events.mark(),
        };

        let result = f(self);
        if let Err(err) = &result {
            warn!(operation, error = %err, "Call reverted");
            self.state = snapshot.state;
            self.pool = snapshot.pool;
            self.tokens = snapshot.tokens;
            self.events.rollback(snapshot.events);
        }

        self.guard.exit();
        result
    }

    pub(crate) fn record(&mut self, ctx: &CallContext, kind: VaultEventKind) {
        self.events.record(ctx.timestamp, kind);
    }

    pub(crate) fn require_owner(&self, ctx: &CallContext) -> VaultResult<()> {
        if ctx.caller != self.state.owner {
            return Err(VaultError::Unauthorized {
                caller: ctx.caller,
                role: Role::Owner,
            });
        }
        Ok(())
    }

    pub(crate) fn require_manager(&self, ctx: &CallContext) -> VaultResult<()> {
        if self.state.manager != Some(ctx.caller) {
            return Err(VaultError::Unauthorized {
                caller: ctx.caller,
                role: Role::Manager,
            });
        }
        Ok(())
    }

    pub(crate) fn check_deadline(ctx: &CallContext, deadline: u64) -> VaultResult<()> {
        if ctx.timestamp > deadline {
            return Err(VaultError::DeadlineExpired {
                deadline,
                now: ctx.timestamp,
            });
        }
        Ok(())
    }

    // Share token surface

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn symbol(&self) -> &str {
        &self.state.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.state.decimals
    }

    pub fn total_supply(&self) -> U256 {
        self.state.shares.total_supply()
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.state.shares.balance_of(account)
    }

    /// Moves shares between holders.
    pub fn transfer_shares(
        &mut self,
        ctx: CallContext,
        to: Address,
        amount: U256,
    ) -> VaultResult<()> {
        self.atomically("transfer_shares", |vault| {
            vault.state.shares.transfer(ctx.caller, to, amount)?;
            vault.record(
                &ctx,
                VaultEventKind::SharesTransferred {
                    from: ctx.caller,
                    to,
                    amount,
                },
            );
            Ok(())
        })
    }

    // Owner surface

    pub fn owner(&self) -> Address {
        self.state.owner
    }

    pub fn manager(&self) -> Option<Address> {
        self.state.manager
    }

    pub fn router(&self) -> Option<Address> {
        self.state.router
    }

    pub fn fee_config(&self) -> &FeeConfig {
        &self.state.fee_config
    }

    pub fn last_collect_management_fee(&self) -> u64 {
        self.state.last_collect_management_fee
    }

    pub fn transfer_ownership(&mut self, ctx: CallContext, owner: Address) -> VaultResult<()> {
        self.atomically("transfer_ownership", |vault| {
            vault.require_owner(&ctx)?;
            let previous = vault.state.owner;
            vault.state.owner = owner;
            info!(previous = ?previous, owner = ?owner, "Ownership transferred");
            vault.record(&ctx, VaultEventKind::OwnershipTransferred { previous, owner });
            Ok(())
        })
    }

    /// Sets or clears the manager.
    pub fn assign_manager(&mut self, ctx: CallContext, manager: Option<Address>) -> VaultResult<()> {
        self.atomically("assign_manager", |vault| {
            vault.require_owner(&ctx)?;
            vault.state.manager = manager;
            info!(manager = ?manager, "Manager assigned");
            vault.record(&ctx, VaultEventKind::ManagerAssigned(manager));
            Ok(())
        })
    }

    /// Sets or clears the allow-listed aggregator router.
    pub fn set_router(&mut self, ctx: CallContext, router: Option<Address>) -> VaultResult<()> {
        self.atomically("set_router", |vault| {
            vault.require_owner(&ctx)?;
            vault.state.router = router;
            info!(router = ?router, "Router updated");
            vault.record(&ctx, VaultEventKind::RouterUpdated(router));
            Ok(())
        })
    }

    // Collaborators

    pub fn pool(&self) -> &P {
        &self.pool
    }

    pub fn tokens(&self) -> &T {
        &self.tokens
    }

    /// The pair held by the vault, as ordered in the pool.
    pub fn token_pair(&self) -> TokenPair {
        TokenPair::new(self.pool.token0(), self.pool.token1())
    }

    /// Mutable access to the outside world: traders, other LPs and token
    /// issuers act on the pool and the ledger through this.
    pub fn market_mut(&mut self) -> (&mut P, &mut T) {
        (&mut self.pool, &mut self.tokens)
    }

    // Events

    pub fn events(&self) -> &[VaultEvent] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<VaultEvent> {
        self.events.take()
    }

    pub fn state(&self) -> &VaultState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clmm_vault_simulation::prelude::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn vault() -> Vault<SimulatedPool, TokenBank> {
        let market = Market::new(&MarketConfig::default()).unwrap();
        Vault::new(
            CallContext::new(addr(1), 100),
            addr(0x5000),
            market.pool,
            market.bank,
            VaultConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_owner_surface() {
        let mut vault = vault();
        assert_eq!(vault.owner(), addr(1));
        assert_eq!(vault.manager(), None);
        assert_eq!(vault.decimals(), 18);

        vault
            .assign_manager(CallContext::new(addr(1), 100), Some(addr(2)))
            .unwrap();
        vault
            .set_router(CallContext::new(addr(1), 100), Some(addr(3)))
            .unwrap();
        assert_eq!(vault.manager(), Some(addr(2)));
        assert_eq!(vault.router(), Some(addr(3)));

        vault
            .transfer_ownership(CallContext::new(addr(1), 100), addr(9))
            .unwrap();
        assert_eq!(
            vault.assign_manager(CallContext::new(addr(1), 100), None),
            Err(VaultError::Unauthorized {
                caller: addr(1),
                role: Role::Owner,
            })
        );
        assert_eq!(vault.manager(), Some(addr(2)));
        assert_eq!(vault.events().len(), 3);
    }

    #[test]
    fn test_failed_call_leaves_no_trace() {
        let mut vault = vault();
        let events = vault.events().len();

        let result: VaultResult<()> = vault.atomically("test", |vault| {
            vault.state.manager = Some(addr(7));
            vault.record(
                &CallContext::new(addr(1), 100),
                VaultEventKind::ManagerAssigned(Some(addr(7))),
            );
            Err(VaultError::ZeroAmount)
        });

        assert_eq!(result, Err(VaultError::ZeroAmount));
        assert_eq!(vault.manager(), None);
        assert_eq!(vault.events().len(), events);
        assert!(!vault.guard.is_entered());
    }

    #[test]
    fn test_nested_call_is_rejected() {
        let mut vault = vault();
        let result = vault.atomically("outer", |vault| {
            vault.set_router(CallContext::new(addr(1), 100), Some(addr(3)))
        });
        assert_eq!(result, Err(VaultError::ReentrantCall));
        assert_eq!(vault.router(), None);
    }
}
