//! Fixed-point integer math.
//!
//! Prices are Q64.96 sqrt prices held in `U256`, liquidity is `u128` and
//! token amounts are `U256`. Every function documents its rounding.

/// 512-bit intermediate mul/div.
pub mod full_math;
/// Liquidity and amount conversions.
pub mod liquidity_amounts;
/// Price conversions for valuation and reporting.
pub mod price;
/// Token deltas and next-price computation.
pub mod sqrt_price_math;
/// Tick and sqrt price conversions.
pub mod tick_math;

/// Number of fractional bits in a Q64.96 value.
pub const Q96_RESOLUTION: u32 = 96;
