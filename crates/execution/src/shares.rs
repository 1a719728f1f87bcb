//! Share token balances.

use crate::error::{VaultError, VaultResult};
use clmm_vault_domain::error::MathError;
use clmm_vault_domain::token::Address;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fungible vault shares. The total supply always equals the sum of the
/// balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareToken {
    total_supply: U256,
    balances: BTreeMap<Address, U256>,
}

impl ShareToken {
    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    /// Holders with a non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> VaultResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(MathError::Overflow)?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> VaultResult<()> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> VaultResult<()> {
        self.debit(from, amount)?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance.checked_add(amount).ok_or(MathError::Overflow)?;
        Ok(())
    }

    fn debit(&mut self, from: Address, amount: U256) -> VaultResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(VaultError::InsufficientShares {
                available,
                requested: amount,
            });
        }
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, remaining);
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

    fn sum_of_balances(shares: &ShareToken) -> U256 {
        shares.holders().fold(U256::zero(), |acc, (_, b)| acc + *b)
    }

    #[test]
    fn test_mint_burn_transfer() {
        let mut shares = ShareToken::default();
        shares.mint(addr(1), U256::from(100u64)).unwrap();
        shares.transfer(addr(1), addr(2), U256::from(30u64)).unwrap();
        shares.burn(addr(1), U256::from(70u64)).unwrap();

        assert_eq!(shares.total_supply(), U256::from(30u64));
        assert_eq!(shares.balance_of(addr(1)), U256::zero());
        assert_eq!(shares.balance_of(addr(2)), U256::from(30u64));
        assert_eq!(sum_of_balances(&shares), shares.total_supply());
        assert_eq!(shares.holders().count(), 1);
    }

    #[test]
    fn test_insufficient_shares() {
        let mut shares = ShareToken::default();
        shares.mint(addr(1), U256::from(10u64)).unwrap();

        assert_eq!(
            shares.burn(addr(1), U256::from(11u64)),
            Err(VaultError::InsufficientShares {
                available: U256::from(10u64),
                requested: U256::from(11u64)
            })
        );
        assert!(shares.transfer(addr(2), addr(1), U256::one()).is_err());
        assert_eq!(shares.total_supply(), U256::from(10u64));
    }
}
