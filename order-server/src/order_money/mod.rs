//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts live in memory as `Decimal` with exactly 2 fractional digits and
//! are persisted as integer minor units (cents). Multiplication and summing
//! run unrounded; rounding happens once, at the end.

use rust_decimal::prelude::*;
use shared::models::OrderLine;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price (1,000,000.00)
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// Round to 2 decimal places, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a Decimal amount into integer cents for storage
///
/// Returns `None` when the rounded amount does not fit in an i64.
#[inline]
pub fn to_cents(value: Decimal) -> Option<i64> {
    (round_money(value) * Decimal::ONE_HUNDRED).to_i64()
}

/// Convert stored cents back into a 2dp Decimal
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Sum of `unit_price * quantity`, rounded once at the end
pub fn lines_total<'a>(lines: impl IntoIterator<Item = &'a OrderLine>) -> Decimal {
    let total: Decimal = lines.into_iter().map(OrderLine::line_total).sum();
    round_money(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, unit_price: Decimal) -> OrderLine {
        OrderLine {
            food_id: 1,
            food_name: "Pide".into(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_round_money_half_up() {
        assert_eq!(round_money(Decimal::new(1005, 3)), Decimal::new(101, 2));
        assert_eq!(round_money(Decimal::new(1004, 3)), Decimal::new(100, 2));
        assert_eq!(round_money(Decimal::new(-1005, 3)), Decimal::new(-101, 2));
    }

    #[test]
    fn test_cents_conversion() {
        assert_eq!(to_cents(Decimal::new(1999, 2)), Some(1999));
        assert_eq!(to_cents(Decimal::new(5, 0)), Some(500));
        assert_eq!(to_cents(Decimal::new(12345, 3)), Some(1235));
        assert_eq!(from_cents(1999), Decimal::new(1999, 2));
        assert_eq!(from_cents(0).scale(), 2);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let lines: Vec<OrderLine> = (0..1000).map(|_| line(1, Decimal::new(1, 2))).collect();
        assert_eq!(lines_total(&lines), Decimal::new(1000, 2));
    }

    #[test]
    fn test_lines_total_matches_cents_arithmetic() {
        let lines = vec![line(3, Decimal::new(1999, 2)), line(2, Decimal::new(1050, 2))];
        let cents: i64 = lines
            .iter()
            .map(|l| to_cents(l.unit_price).unwrap() * i64::from(l.quantity))
            .sum();
        assert_eq!(lines_total(&lines), from_cents(cents));
        assert_eq!(lines_total(&lines), Decimal::new(8097, 2));
    }

    #[test]
    fn test_empty_total_is_zero() {
        assert_eq!(lines_total(&[]), Decimal::ZERO);
    }
}
