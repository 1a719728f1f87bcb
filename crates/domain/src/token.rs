use primitive_types::{H160, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account or contract address.
pub type Address = H160;

/// The two assets held by a vault, ordered as in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenPair {
    pub token0: Address,
    pub token1: Address,
}

impl TokenPair {
    pub fn new(token0: Address, token1: Address) -> Self {
        Self { token0, token1 }
    }

    /// Returns true when `token` is one of the pair.
    pub fn contains(&self, token: Address) -> bool {
        token == self.token0 || token == self.token1
    }

    /// Returns the other token of the pair, if `token` belongs to it.
    pub fn counterpart(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }
}

/// An amount of each token of the pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmounts {
    pub amount0: U256,
    pub amount1: U256,
}

impl TokenAmounts {
    pub fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    /// Component-wise checked addition.
    pub fn checked_add(&self, other: TokenAmounts) -> Option<TokenAmounts> {
        Some(Self {
            amount0: self.amount0.checked_add(other.amount0)?,
            amount1: self.amount1.checked_add(other.amount1)?,
        })
    }
}

impl From<(U256, U256)> for TokenAmounts {
    fn from((amount0, amount1): (U256, U256)) -> Self {
        Self { amount0, amount1 }
    }
}

impl fmt::Display for TokenAmounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.amount0, self.amount1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_counterpart() {
        let a = Address::from_low_u64_be(1);
        let b = Address::from_low_u64_be(2);
        let pair = TokenPair::new(a, b);

        assert!(pair.contains(a));
        assert_eq!(pair.counterpart(a), Some(b));
        assert_eq!(pair.counterpart(b), Some(a));
        assert_eq!(pair.counterpart(Address::from_low_u64_be(3)), None);
    }

    #[test]
    fn test_amounts_add() {
        let a = TokenAmounts::new(U256::from(1u64), U256::from(2u64));
        let b = TokenAmounts::new(U256::from(3u64), U256::from(4u64));
        assert_eq!(
            a.checked_add(b),
            Some(TokenAmounts::new(U256::from(4u64), U256::from(6u64)))
        );
        assert!(TokenAmounts::zero().is_zero());
        assert!(
            TokenAmounts::new(U256::MAX, U256::zero())
                .checked_add(a)
                .is_none()
        );
    }
}
