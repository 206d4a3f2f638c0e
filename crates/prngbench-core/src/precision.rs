//! Fixed-precision helpers.
//!
//! Every normalized value in this workspace is **truncated**, never rounded,
//! to [`PRECISION`] decimal places. Rounding shifts values that sit on a
//! boundary into the neighbouring interval, which changes test outcomes.

/// Decimal places kept in normalized values.
pub const PRECISION: u32 = 5;

/// Largest value with [`PRECISION`] decimals that is still below one.
pub const UNIT_CEILING: f64 = 0.99999;

/// Distance kept from 0 and 1 before a logarithm or inverse CDF.
pub const OPEN_UNIT_EPSILON: f64 = 1e-10;

/// Truncate `value` toward zero to `decimals` decimal places.
pub fn truncate(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).trunc() / factor
}

/// Truncate to [`PRECISION`] decimals.
pub fn truncate5(value: f64) -> f64 {
    truncate(value, PRECISION)
}

/// Exact truncation of `numerator / denominator` to `decimals` places.
///
/// Integer division avoids the `0.57 * 1e5 = 56999.999...` artifact that a
/// float multiply-then-truncate would introduce for exact ratios.
pub fn truncate_ratio(numerator: u128, denominator: u128, decimals: u32) -> f64 {
    debug_assert!(denominator > 0);
    let factor = 10u128.pow(decimals);
    let scaled = numerator.saturating_mul(factor) / denominator;
    scaled as f64 / factor as f64
}

/// Number of base-10 digits in `value` (`0` has one digit).
pub fn decimal_digits(value: u128) -> u32 {
    if value == 0 { 1 } else { value.ilog10() + 1 }
}

/// Move `x` into `[OPEN_UNIT_EPSILON, 1 - OPEN_UNIT_EPSILON]`.
pub fn clamp_open_unit(x: f64) -> f64 {
    x.clamp(OPEN_UNIT_EPSILON, 1.0 - OPEN_UNIT_EPSILON)
}
