//! Common utility functions for report calculations.
//!
//! This module provides shared functionality used across the derivation
//! modules: rounding, lenient amount parsing, guarded percentages, and the
//! presentation formatters used by the report and the review step.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// One hundred, as used by every percentage conversion.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use loan_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas
/// (thousands separator) and a leading currency marker.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed
        .strip_prefix('₹')
        .or_else(|| trimmed.strip_prefix("Rs."))
        .unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses a user-entered amount, falling back to zero.
///
/// Entered costs arrive as free text. Empty, whitespace-only and
/// non-numeric input all yield `0`; this function never fails. Commas are
/// accepted as thousands separators (`"1,25,000"` and `"125,000"` both
/// parse).
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use loan_core::calculations::common::parse_amount;
///
/// assert_eq!(parse_amount("1,25,000.50"), dec!(125000.50));
/// assert_eq!(parse_amount("abc"), Decimal::ZERO);
/// assert_eq!(parse_amount(""), Decimal::ZERO);
/// ```
pub fn parse_amount(s: &str) -> Decimal {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized))
        .unwrap_or_else(|e| {
            debug!(input = %s, "treating unparseable amount as zero: {}", e);
            Decimal::ZERO
        })
}

/// Returns `part` as a percentage of `whole`.
///
/// A zero `whole` yields `0` instead of dividing by zero, so shares of an
/// empty project render as `0%`.
pub fn percent_of(
    part: Decimal,
    whole: Decimal,
) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Formats a percentage for display: rounded to two places, trailing
/// zeros dropped, with a `%` suffix.
///
/// ```
/// use rust_decimal_macros::dec;
/// use loan_core::calculations::common::format_percent;
///
/// assert_eq!(format_percent(dec!(0)), "0%");
/// assert_eq!(format_percent(dec!(12.5)), "12.5%");
/// assert_eq!(format_percent(dec!(33.3333)), "33.33%");
/// ```
pub fn format_percent(value: Decimal) -> String {
    format!("{}%", round_half_up(value).normalize())
}

/// Formats a currency amount with two decimals and Indian digit grouping
/// (`12,34,567.80`).
///
/// ```
/// use rust_decimal_macros::dec;
/// use loan_core::calculations::common::format_currency;
///
/// assert_eq!(format_currency(dec!(900000)), "9,00,000.00");
/// assert_eq!(format_currency(dec!(1234567.805)), "12,34,567.81");
/// assert_eq!(format_currency(dec!(-999.5)), "-999.50");
/// ```
pub fn format_currency(value: Decimal) -> String {
    let rounded = round_half_up(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let grouped = group_indian(whole);
    if negative {
        format!("-{grouped}.{fraction}")
    } else {
        format!("{grouped}.{fraction}")
    }
}

/// Groups an unsigned digit string as `xx,xx,xxx`.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, last_three) = digits.split_at(digits.len() - 3);

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), last_three)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        assert_eq!(round_half_up(dec!(999999.999)), dec!(1000000.00));
    }

    // =========================================================================
    // max tests
    // =========================================================================

    #[test]
    fn max_returns_larger_value() {
        assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
        assert_eq!(max(dec!(200.00), dec!(100.00)), dec!(200.00));
    }

    #[test]
    fn max_handles_negative_and_zero() {
        assert_eq!(max(dec!(-50.00), Decimal::ZERO), Decimal::ZERO);
    }

    // =========================================================================
    // parse_amount tests
    // =========================================================================

    #[test]
    fn parse_amount_accepts_plain_numbers() {
        assert_eq!(parse_amount("250000"), dec!(250000));
        assert_eq!(parse_amount("1234.56"), dec!(1234.56));
    }

    #[test]
    fn parse_amount_accepts_thousands_separators() {
        assert_eq!(parse_amount("1,234,567.89"), dec!(1234567.89));
        assert_eq!(parse_amount("12,34,567.89"), dec!(1234567.89));
    }

    #[test]
    fn parse_amount_trims_whitespace_and_currency_marker() {
        assert_eq!(parse_amount("  500  "), dec!(500));
        assert_eq!(parse_amount("₹ 1,000"), dec!(1000));
        assert_eq!(parse_amount("Rs. 750"), dec!(750));
    }

    #[test]
    fn parse_amount_empty_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("12abc"), Decimal::ZERO);
        assert_eq!(parse_amount("--5"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_keeps_sign() {
        assert_eq!(parse_amount("-42"), dec!(-42));
    }

    // =========================================================================
    // percent_of tests
    // =========================================================================

    #[test]
    fn percent_of_computes_share() {
        assert_eq!(percent_of(dec!(25), dec!(200)), dec!(12.5));
    }

    #[test]
    fn percent_of_zero_whole_is_zero() {
        assert_eq!(percent_of(dec!(25), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_of(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    // =========================================================================
    // formatting tests
    // =========================================================================

    #[test]
    fn format_percent_drops_trailing_zeros() {
        assert_eq!(format_percent(dec!(10.00)), "10%");
        assert_eq!(format_percent(dec!(0.00)), "0%");
        assert_eq!(format_percent(dec!(66.666)), "66.67%");
    }

    #[test]
    fn format_currency_small_values_are_not_grouped() {
        assert_eq!(format_currency(dec!(0)), "0.00");
        assert_eq!(format_currency(dec!(999.999)), "1,000.00");
        assert_eq!(format_currency(dec!(100)), "100.00");
    }

    #[test]
    fn format_currency_uses_lakh_grouping() {
        assert_eq!(format_currency(dec!(100000)), "1,00,000.00");
        assert_eq!(format_currency(dec!(2224.4448)), "2,224.44");
        assert_eq!(format_currency(dec!(123456789.1)), "12,34,56,789.10");
    }

    #[test]
    fn format_currency_keeps_sign() {
        assert_eq!(format_currency(dec!(-150000)), "-1,50,000.00");
    }
}
