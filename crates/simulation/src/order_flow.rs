//! Random swap flow for moving a pool's price.
//!
//! Trade sizes are log-normal around a median and directions are drawn
//! with a fixed probability, from a seeded generator so scenarios replay
//! identically.

use clmm_vault_domain::math::tick_math::{max_sqrt_ratio, min_sqrt_ratio};
use clmm_vault_domain::token::Address;
use clmm_vault_protocols::error::PoolError;
use clmm_vault_protocols::pool::{ConcentratedPool, SwapAmount, SwapParams, SwapResult};
use clmm_vault_protocols::token::TokenLedger;
use primitive_types::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

/// Rejected order flow parameters.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OrderFlowError {
    #[error("median trade size must be positive and finite, got {0}")]
    InvalidMedianSize(f64),
    #[error("dispersion must be non-negative and finite, got {0}")]
    InvalidDispersion(f64),
    #[error(transparent)]
    Distribution(#[from] NormalError),
}

/// One exact-input trade against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trade {
    pub zero_for_one: bool,
    pub amount_in: U256,
}

pub struct RandomOrderFlow {
    rng: StdRng,
    size: Normal<f64>,
    median_size: f64,
    sell_probability: f64,
}

impl RandomOrderFlow {
    /// `median_size` is in base units of the input token, `dispersion` is
    /// the standard deviation of the log size.
    pub fn new(seed: u64, median_size: f64, dispersion: f64) -> Result<Self, OrderFlowError> {
        if !median_size.is_finite() || median_size <= 0.0 {
            return Err(OrderFlowError::InvalidMedianSize(median_size));
        }
        if !dispersion.is_finite() || dispersion < 0.0 {
            return Err(OrderFlowError::InvalidDispersion(dispersion));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            size: Normal::new(0.0, dispersion)?,
            median_size,
            sell_probability: 0.5,
        })
    }

    /// Probability that a trade sells token0.
    #[must_use]
    pub fn with_sell_probability(mut self, probability: f64) -> Self {
        self.sell_probability = probability.clamp(0.0, 1.0);
        self
    }

    pub fn next_trade(&mut self) -> Trade {
        let zero_for_one = self.rng.random_bool(self.sell_probability);
        let z = self.size.sample(&mut self.rng);
        let size = (self.median_size * z.exp()).max(1.0);
        Trade {
            zero_for_one,
            amount_in: U256::from(size as u128),
        }
    }

    pub fn generate(&mut self, steps: usize) -> Vec<Trade> {
        (0..steps).map(|_| self.next_trade()).collect()
    }
}

/// Executes a trade for `trader` with no price limit.
pub fn execute_trade(
    pool: &mut dyn ConcentratedPool,
    tokens: &mut dyn TokenLedger,
    trader: Address,
    trade: Trade,
) -> Result<SwapResult, PoolError> {
    let sqrt_price_limit_x96 = if trade.zero_for_one {
        min_sqrt_ratio() + 1
    } else {
        max_sqrt_ratio() - 1
    };
    pool.swap(
        tokens,
        SwapParams {
            payer: trader,
            recipient: trader,
            zero_for_one: trade.zero_for_one,
            amount: SwapAmount::ExactInput(trade.amount_in),
            sqrt_price_limit_x96,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_flow() {
        let a = RandomOrderFlow::new(7, 1_000_000.0, 0.5).unwrap().generate(20);
        let b = RandomOrderFlow::new(7, 1_000_000.0, 0.5).unwrap().generate(20);
        assert_eq!(a, b);
        assert!(a.iter().all(|t| !t.amount_in.is_zero()));
    }

    #[test]
    fn test_one_sided_flow() {
        let trades = RandomOrderFlow::new(1, 100.0, 0.1)
            .unwrap()
            .with_sell_probability(1.0)
            .generate(10);
        assert!(trades.iter().all(|t| t.zero_for_one));
    }

    #[test]
    fn test_invalid_dispersion() {
        assert_eq!(
            RandomOrderFlow::new(1, 100.0, -1.0).err(),
            Some(OrderFlowError::InvalidDispersion(-1.0))
        );
        assert!(RandomOrderFlow::new(1, 100.0, f64::INFINITY).is_err());
        assert!(RandomOrderFlow::new(1, 100.0, 0.0).is_ok());
    }

    #[test]
    fn test_invalid_median_size() {
        assert_eq!(
            RandomOrderFlow::new(1, 0.0, 0.5).err(),
            Some(OrderFlowError::InvalidMedianSize(0.0))
        );
        assert!(RandomOrderFlow::new(1, -5.0, 0.5).is_err());
        assert!(matches!(
            RandomOrderFlow::new(1, f64::NAN, 0.5),
            Err(OrderFlowError::InvalidMedianSize(_))
        ));
    }
}
