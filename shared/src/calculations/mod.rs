//! Machine-run calculation core
//!
//! Pure functions over a form snapshot ([`RunInputs`]) and cross-check
//! entries. Nothing here fails. Unparseable text reads as zero, and a zero
//! denominator or an arithmetic overflow yields zero.
//!
//! Every displayed value is rounded half away from zero to a fixed number
//! of places and carries that scale, so `0.08` renders as `0.0800`.

mod cross_check;
mod gram_ratio;
mod inputs;
mod quantity;
mod run_yield;
mod summary;

pub use cross_check::*;
pub use gram_ratio::*;
pub use inputs::*;
pub use quantity::*;
pub use run_yield::*;
pub use summary::*;

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places for weights and volumes
pub const WEIGHT_DP: u32 = 1;

/// Decimal places for per-ml and per-unit ratios
pub const RATIO_DP: u32 = 4;

/// Decimal places for the water content percentage
pub const PERCENT_DP: u32 = 1;

/// Decimal places for cross-check totals and variance
pub const CROSS_CHECK_DP: u32 = 2;

/// Round to `dp` places and pin the scale so trailing zeros survive display.
pub(crate) fn fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

pub(crate) fn add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(Decimal::ZERO)
}

pub(crate) fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.checked_sub(b).unwrap_or(Decimal::ZERO)
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.checked_mul(b).unwrap_or(Decimal::ZERO)
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}
