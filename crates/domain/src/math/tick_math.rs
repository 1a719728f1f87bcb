//! Conversions between ticks and Q64.96 sqrt prices.
//!
//! `sqrt_price_x96 = sqrt(1.0001^tick) * 2^96`, computed with the same
//! fixed-point bit decomposition used on-chain so results are bit exact.

use crate::error::MathError;
use primitive_types::U256;

/// Smallest tick with a representable sqrt price.
pub const MIN_TICK: i32 = -887_272;
/// Largest tick with a representable sqrt price.
pub const MAX_TICK: i32 = 887_272;

/// Sqrt price at [`MIN_TICK`].
pub fn min_sqrt_ratio() -> U256 {
    U256::from(4_295_128_739u64)
}

/// Sqrt price at [`MAX_TICK`].
pub fn max_sqrt_ratio() -> U256 {
    U256::from_dec_str("1461446703485210103287273052203988822378723970342")
        .unwrap_or(U256::MAX)
}

const TICK_FACTORS: [(u32, u128); 19] = [
    (0x2, 0xfff97272373d413259a46990580e213a),
    (0x4, 0xfff2e50f5f656932ef12357cf3c7fdcc),
    (0x8, 0xffe5caca7e10e4e61c3624eaa0941cd0),
    (0x10, 0xffcb9843d60f6159c9db58835c926644),
    (0x20, 0xff973b41fa98c081472e6896dfb254c0),
    (0x40, 0xff2ea16466c96a3843ec78b326b52861),
    (0x80, 0xfe5dee046a99a2a811c461f1969c3053),
    (0x100, 0xfcbe86c7900a88aedcffc83b479aa3a4),
    (0x200, 0xf987a7253ac413176f2b074cf7815e54),
    (0x400, 0xf3392b0822b70005940c7a398e4b70f3),
    (0x800, 0xe7159475a2c29b7443b29c7fa6e889d9),
    (0x1000, 0xd097f3bdfd2022b8845ad8f792aa5825),
    (0x2000, 0xa9f746462d870fdf8a65dc1f90e061e5),
    (0x4000, 0x70d869a156d2a1b890bb3df62baf32f7),
    (0x8000, 0x31be135f97d08fd981231505542fcfa6),
    (0x10000, 0x9aa508b5b7a84e1c677de54f3e99bc9),
    (0x20000, 0x5d6af8dedb81196699c329225ee604),
    (0x40000, 0x2216e584f5fa1ea926041bedfe98),
    (0x80000, 0x48a170391f7dc42444e8fa2),
];

/// Returns the Q64.96 sqrt price for a tick.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, MathError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(MathError::TickOutOfBounds(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
    } else {
        U256::one() << 128
    };
    for (mask, factor) in TICK_FACTORS {
        if abs_tick & mask != 0 {
            ratio = (ratio * U256::from(factor)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Back to Q64.96, rounding up so the ratio is never understated.
    let remainder = ratio & U256::from(u32::MAX);
    let mut sqrt_price = ratio >> 32;
    if !remainder.is_zero() {
        sqrt_price += U256::one();
    }
    Ok(sqrt_price)
}

/// Returns the greatest tick whose sqrt price is `<= sqrt_price_x96`.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, MathError> {
    if sqrt_price_x96 < min_sqrt_ratio() || sqrt_price_x96 >= max_sqrt_ratio() {
        return Err(MathError::SqrtPriceOutOfBounds);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        // Upper midpoint so the loop always makes progress.
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Checks that a tick is inside the representable range and on the spacing grid.
pub fn is_usable_tick(tick: i32, tick_spacing: i32) -> bool {
    tick_spacing > 0 && (MIN_TICK..=MAX_TICK).contains(&tick) && tick % tick_spacing == 0
}
