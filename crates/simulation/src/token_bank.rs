//! In-memory ERC20 ledger for any number of tokens.

use clmm_vault_domain::token::Address;
use clmm_vault_protocols::error::TokenError;
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
struct TokenBook {
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl TokenBook {
    fn balance(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }
}

/// Balances and allowances of registered tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    tokens: HashMap<Address, TokenBook>,
}

impl TokenBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a token. Registering twice keeps the existing balances.
    pub fn register(&mut self, token: Address, symbol: impl Into<String>, decimals: u8) {
        self.tokens.entry(token).or_insert_with(|| TokenBook {
            symbol: symbol.into(),
            decimals,
            ..TokenBook::default()
        });
    }

    pub fn symbol(&self, token: Address) -> Result<&str, TokenError> {
        Ok(self.book(token)?.symbol.as_str())
    }

    pub fn total_supply(&self, token: Address) -> Result<U256, TokenError> {
        Ok(self.book(token)?.total_supply)
    }

    /// Creates new tokens for `to`.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), TokenError> {
        let book = self.book_mut(token)?;
        book.total_supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let balance = book.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    fn book(&self, token: Address) -> Result<&TokenBook, TokenError> {
        self.tokens.get(&token).ok_or(TokenError::UnknownToken(token))
    }

    fn book_mut(&mut self, token: Address) -> Result<&mut TokenBook, TokenError> {
        self.tokens
            .get_mut(&token)
            .ok_or(TokenError::UnknownToken(token))
    }
}

impl TokenLedger for TokenBank {
    fn decimals(&self, token: Address) -> Result<u8, TokenError> {
        Ok(self.book(token)?.decimals)
    }

    fn balance_of(&self, token: Address, owner: Address) -> Result<U256, TokenError> {
        Ok(self.book(token)?.balance(owner))
    }

    fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, TokenError> {
        Ok(self
            .book(token)?
            .allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default())
    }

    fn approve(
        &mut self,
        token: Address,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let book = self.book_mut(token)?;
        if amount.is_zero() {
            book.allowances.remove(&(owner, spender));
        } else {
            book.allowances.insert((owner, spender), amount);
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let book = self.book_mut(token)?;
        let available = book.balance(from);
        if available < amount {
            return Err(TokenError::InsufficientBalance {
                token,
                owner: from,
                available,
                required: amount,
            });
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }
        book.balances.insert(from, available - amount);
        let balance = book.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(TokenError::Overflow)?;
        Ok(())
    }

    fn transfer_from(
        &mut self,
        token: Address,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TokenError> {
        let allowance = self.allowance(token, from, spender)?;
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance {
                token,
                spender,
                available: allowance,
                required: amount,
            });
        }
        self.transfer(token, from, to, amount)?;
        if allowance != U256::MAX {
            self.approve(token, from, spender, allowance - amount)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn bank() -> TokenBank {
        let mut bank = TokenBank::new();
        bank.register(addr(100), "USDC", 6);
        bank.mint(addr(100), addr(1), U256::from(1_000u64)).unwrap();
        bank
    }

    #[test]
    fn test_transfer() {
        let mut bank = bank();
        bank.transfer(addr(100), addr(1), addr(2), U256::from(400u64))
            .unwrap();

        assert_eq!(bank.balance_of(addr(100), addr(1)).unwrap(), U256::from(600u64));
        assert_eq!(bank.balance_of(addr(100), addr(2)).unwrap(), U256::from(400u64));
        assert_eq!(bank.total_supply(addr(100)).unwrap(), U256::from(1_000u64));

        let err = bank
            .transfer(addr(100), addr(2), addr(1), U256::from(401u64))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientBalance { .. }));
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut bank = bank();
        bank.approve(addr(100), addr(1), addr(9), U256::from(300u64))
            .unwrap();

        bank.transfer_from(addr(100), addr(9), addr(1), addr(2), U256::from(200u64))
            .unwrap();
        assert_eq!(
            bank.allowance(addr(100), addr(1), addr(9)).unwrap(),
            U256::from(100u64)
        );

        let err = bank
            .transfer_from(addr(100), addr(9), addr(1), addr(2), U256::from(101u64))
            .unwrap_err();
        assert!(matches!(err, TokenError::InsufficientAllowance { .. }));
    }

    #[test]
    fn test_unknown_token() {
        let bank = bank();
        assert_eq!(
            bank.balance_of(addr(7), addr(1)),
            Err(TokenError::UnknownToken(addr(7)))
        );
        assert_eq!(bank.symbol(addr(100)).unwrap(), "USDC");
        assert_eq!(bank.decimals(addr(100)).unwrap(), 6);
    }
}
