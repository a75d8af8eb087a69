//! Equated monthly installment (EMI) calculations.
//!
//! Uses the standard amortization formula:
//!
//! ```text
//! EMI = P × r × (1 + r)^n / ((1 + r)^n - 1)
//! ```
//!
//! where `r` is the monthly rate (`annual_rate_percent / 12 / 100`) and `n`
//! the number of monthly payments (`tenure_years × 12`). A zero rate falls
//! back to straight-line repayment, `P / n`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use loan_core::calculations::{compute_emi, common::round_half_up};
//!
//! let emi = compute_emi(dec!(100000), dec!(12), dec!(5)).unwrap();
//!
//! assert_eq!(emi.months, 60);
//! assert_eq!(round_half_up(emi.monthly_emi), dec!(2224.44));
//! ```

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::HUNDRED;
use crate::calculations::project_cost::MONTHS_PER_YEAR;

/// Longest repayment period accepted, in months (50 years).
pub const MAX_TENURE_MONTHS: u32 = 600;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmiError {
    /// The tenure rounds to zero months or exceeds [`MAX_TENURE_MONTHS`].
    #[error("tenure must be between 1 and 600 months, got {0} years")]
    InvalidTenure(Decimal),

    #[error("interest rate must be non-negative, got {0}")]
    NegativeRate(Decimal),

    #[error("principal must be non-negative, got {0}")]
    NegativePrincipal(Decimal),

    /// The compounding factor does not fit in a decimal.
    #[error("EMI calculation overflowed")]
    Overflow,
}

/// Repayment figures for an amortized loan, at full precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiResult {
    pub principal: Decimal,
    pub monthly_rate: Decimal,
    pub months: u32,
    pub monthly_emi: Decimal,
    pub total_amount: Decimal,
    pub total_interest: Decimal,
}

/// One row of a month-by-month repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub month: u32,
    pub opening_balance: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub closing_balance: Decimal,
}

/// Repayment totals for one year of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRepayment {
    pub year: u32,
    pub interest: Decimal,
    pub principal: Decimal,
    pub closing_balance: Decimal,
}

/// Computes the monthly installment, total repayment and total interest.
///
/// # Errors
///
/// Returns [`EmiError`] if:
/// - the principal or rate is negative
/// - the tenure is not between one month and [`MAX_TENURE_MONTHS`]
/// - the compounding factor overflows
pub fn compute_emi(
    principal: Decimal,
    annual_rate_percent: Decimal,
    tenure_years: Decimal,
) -> Result<EmiResult, EmiError> {
    if principal.is_sign_negative() && !principal.is_zero() {
        return Err(EmiError::NegativePrincipal(principal));
    }
    if annual_rate_percent.is_sign_negative() && !annual_rate_percent.is_zero() {
        return Err(EmiError::NegativeRate(annual_rate_percent));
    }

    let months = tenure_months(tenure_years)?;
    let n = Decimal::from(months);
    let monthly_rate = annual_rate_percent / MONTHS_PER_YEAR / HUNDRED;

    let monthly_emi = if monthly_rate.is_zero() {
        principal / n
    } else {
        let factor = compound_factor(monthly_rate, months)?;
        principal
            .checked_mul(monthly_rate)
            .and_then(|v| v.checked_mul(factor))
            .and_then(|v| v.checked_div(factor - Decimal::ONE))
            .ok_or(EmiError::Overflow)?
    };

    let total_amount = monthly_emi.checked_mul(n).ok_or(EmiError::Overflow)?;

    Ok(EmiResult {
        principal,
        monthly_rate,
        months,
        monthly_emi,
        total_amount,
        total_interest: total_amount.saturating_sub(principal),
    })
}

/// Converts a (possibly fractional) tenure in years to whole months.
fn tenure_months(tenure_years: Decimal) -> Result<u32, EmiError> {
    tenure_years
        .saturating_mul(MONTHS_PER_YEAR)
        .round()
        .to_u32()
        .filter(|months| (1..=MAX_TENURE_MONTHS).contains(months))
        .ok_or(EmiError::InvalidTenure(tenure_years))
}

/// `(1 + rate)^months`, failing instead of panicking on overflow.
fn compound_factor(
    rate: Decimal,
    months: u32,
) -> Result<Decimal, EmiError> {
    let base = Decimal::ONE + rate;
    (0..months).try_fold(Decimal::ONE, |acc, _| {
        acc.checked_mul(base).ok_or(EmiError::Overflow)
    })
}

impl EmiResult {
    /// Month-by-month repayment schedule.
    ///
    /// The final installment absorbs any residue so the loan closes at
    /// exactly zero.
    pub fn amortization(&self) -> Vec<Installment> {
        let mut balance = self.principal;
        let mut rows = Vec::with_capacity(self.months as usize);

        for month in 1..=self.months {
            let interest = balance.saturating_mul(self.monthly_rate);
            let principal = if month == self.months {
                balance
            } else {
                self.monthly_emi.saturating_sub(interest)
            };
            let closing_balance = balance.saturating_sub(principal);

            rows.push(Installment {
                month,
                opening_balance: balance,
                interest,
                principal,
                closing_balance,
            });
            balance = closing_balance;
        }

        rows
    }

    /// The amortization schedule rolled up by year.
    pub fn yearly_summary(&self) -> Vec<YearlyRepayment> {
        let mut years: Vec<YearlyRepayment> = Vec::new();

        for row in self.amortization() {
            let year = (row.month - 1) / 12 + 1;
            if let Some(current) = years.last_mut().filter(|current| current.year == year) {
                current.interest = current.interest.saturating_add(row.interest);
                current.principal = current.principal.saturating_add(row.principal);
                current.closing_balance = row.closing_balance;
                continue;
            }
            years.push(YearlyRepayment {
                year,
                interest: row.interest,
                principal: row.principal,
                closing_balance: row.closing_balance,
            });
        }

        years
    }
}
