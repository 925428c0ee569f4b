//! Shared arithmetic helpers for payroll calculations.

use rust_decimal::Decimal;

/// Rounds a monetary value to two decimal places using half-up rounding.
///
/// Midpoint values round away from zero, the usual convention for payroll
/// amounts.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(66666.664)), dec!(66666.66));
/// assert_eq!(round_half_up(dec!(66666.665)), dec!(66666.67));
/// assert_eq!(round_half_up(dec!(-12.345)), dec!(-12.35));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value at zero.
///
/// The tax and projection pipelines use this wherever a derived figure is
/// defined as never negative (taxable income, incremental tax, in-hand pay).
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::non_negative;
///
/// assert_eq!(non_negative(dec!(150.00)), dec!(150.00));
/// assert_eq!(non_negative(dec!(-150.00)), Decimal::ZERO);
/// ```
pub fn non_negative(value: Decimal) -> Decimal {
    if value > Decimal::ZERO {
        value
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(2600.004));

        assert_eq!(result, dec!(2600.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(2600.005));

        assert_eq!(result, dec!(2600.01));
    }

    #[test]
    fn round_half_up_rounds_negative_away_from_zero() {
        let result = round_half_up(dec!(-2600.005));

        assert_eq!(result, dec!(-2600.01));
    }

    #[test]
    fn round_half_up_keeps_two_decimal_values() {
        let result = round_half_up(dec!(64066.67));

        assert_eq!(result, dec!(64066.67));
    }

    #[test]
    fn round_half_up_handles_repeating_division() {
        let result = round_half_up(dec!(800000) / Decimal::from(12));

        assert_eq!(result, dec!(66666.67));
    }

    // =========================================================================
    // non_negative tests
    // =========================================================================

    #[test]
    fn non_negative_passes_positive_through() {
        let result = non_negative(dec!(31200.00));

        assert_eq!(result, dec!(31200.00));
    }

    #[test]
    fn non_negative_clamps_negative_to_zero() {
        let result = non_negative(dec!(-500.00));

        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn non_negative_keeps_zero() {
        let result = non_negative(Decimal::ZERO);

        assert_eq!(result, Decimal::ZERO);
    }
}
