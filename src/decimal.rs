//! Fixed-precision decimal helpers used throughout the book.
//!
//! Prices and quantities are [`rust_decimal::Decimal`] values quantized to a
//! configured number of fractional digits. Matching never touches floating
//! point: every comparison and every arithmetic operation in the engine
//! operates on these quantized decimals.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;

use crate::consts::{DEFAULT_PRECISION, MAX_VALUE, MIN_VALUE};
use crate::error::{ErrorType, Result};

/// A price, quantized to the book's configured precision.
pub type Price = Decimal;

/// A quantity, quantized to the book's configured precision.
pub type Quantity = Decimal;

/// Quantize `value` to `precision` fractional digits using banker's rounding,
/// the same rounding `rust_decimal::Decimal::round_dp` applies by default.
pub fn quantize(value: Decimal, precision: u32) -> Decimal {
    value.round_dp(precision)
}

fn min_value() -> Decimal {
    Decimal::from_str(MIN_VALUE).expect("MIN_VALUE is a valid decimal literal")
}

fn max_value() -> Decimal {
    Decimal::from_str(MAX_VALUE).expect("MAX_VALUE is a valid decimal literal")
}

/// Validate and quantize a price or quantity to the book's default precision.
///
/// Returns `InvalidParams` if the value falls outside `[MIN_VALUE, MAX_VALUE]`
/// once quantized.
pub fn validate(value: Decimal) -> Result<Decimal> {
    let q = quantize(value, DEFAULT_PRECISION);
    if q < min_value() || q > max_value() {
        return Err(ErrorType::InvalidParams.into());
    }
    Ok(q)
}

/// `0`, used as the identity value for `fill`/volume bookkeeping.
pub fn zero() -> Decimal {
    dec!(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_to_configured_precision() {
        assert_eq!(quantize(dec!(1.005), 2), dec!(1.00));
        assert_eq!(quantize(dec!(1.015), 2), dec!(1.02));
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(validate(dec!(0)).is_err());
        assert!(validate(dec!(-1)).is_err());
        assert!(validate(dec!(100000000001)).is_err());
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(validate(dec!(0.01)).is_ok());
        assert!(validate(dec!(100000000000)).is_ok());
    }
}
