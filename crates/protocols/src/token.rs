use crate::error::TokenError;
use clmm_vault_domain::token::Address;
use primitive_types::U256;

/// ERC20 balances and allowances for a set of tokens.
///
/// Tokens are assumed plain: no transfer fees, no rebasing and no callbacks
/// into the caller.
pub trait TokenLedger {
    /// Decimals of `token`.
    fn decimals(&self, token: Address) -> Result<u8, TokenError>;

    /// Balance of `owner` in `token`.
    fn balance_of(&self, token: Address, owner: Address) -> Result<U256, TokenError>;

    /// Amount `spender` may still pull from `owner`.
    fn allowance(&self, token: Address, owner: Address, spender: Address)
    -> Result<U256, TokenError>;

    /// Sets the allowance of `spender` over `owner`'s tokens.
    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Moves tokens on behalf of `from`.
    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;

    /// Moves tokens from `from` using the allowance granted to `spender`.
    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError>;
}

/// View of a ledger handed to an untrusted party.
///
/// Tokens of `protected` move only through `transfer_from`, so the allowances
/// `protected` granted beforehand cap what leaves it. Approvals on behalf of
/// `protected` are refused.
pub struct RestrictedLedger<'a> {
    inner: &'a mut dyn TokenLedger,
    protected: Address,
}

impl<'a> RestrictedLedger<'a> {
    pub fn new(inner: &'a mut dyn TokenLedger, protected: Address) -> Self {
        Self { inner, protected }
    }

    fn ensure_unprotected(&self, token: Address, owner: Address) -> Result<(), TokenError> {
        if owner == self.protected {
            return Err(TokenError::Restricted { token, owner });
        }
        Ok(())
    }
}

impl TokenLedger for RestrictedLedger<'_> {
    fn decimals(&self, token: Address) -> Result<u8, TokenError> {
        self.inner.decimals(token)
    }

    fn balance_of(&self, token: Address, owner: Address) -> Result<U256, TokenError> {
        self.inner.balance_of(token, owner)
    }

    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, TokenError> {
        self.inner.allowance(token, owner, spender)
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.ensure_unprotected(token, owner)?;
        self.inner.approve(token, owner, spender, amount)
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.ensure_unprotected(token, from)?;
        self.inner.transfer(token, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        self.inner.transfer_from(token, spender, from, to, amount)
    }
}
