//! Project cost and loan eligibility.
//!
//! Totals are summed at full precision from the selected cost entries of a
//! [`FormAggregate`]. The financed share of the project is fixed by
//! [`MARGIN_MONEY_RATE`]: the promoter brings the margin money and the rest is
//! the eligible loan.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use loan_core::calculations::compute_loan_split;
//!
//! let split = compute_loan_split(dec!(1000));
//!
//! assert_eq!(split.margin_money, dec!(100));
//! assert_eq!(split.eligible_loan, dec!(900));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::percent_of;
use crate::models::{CostEntry, FormAggregate, RequirementKey};

/// Share of total project cost the borrower contributes (10%).
pub const MARGIN_MONEY_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Months in a year, for annualising monthly figures.
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Sums the cost of every selected entry.
///
/// Unselected entries are skipped whatever their cost text; selected entries
/// with empty or non-numeric costs count as zero. The sum saturates at
/// [`Decimal::MAX`].
pub fn total_selected_cost<'a, I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = &'a CostEntry>,
{
    entries
        .into_iter()
        .map(CostEntry::amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Total project cost divided into margin money and eligible loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanSplit {
    pub total_cost: Decimal,
    pub margin_money: Decimal,
    pub eligible_loan: Decimal,
}

/// Splits a total project cost at the fixed margin-money rate.
pub fn compute_loan_split(total_cost: Decimal) -> LoanSplit {
    let margin_money = total_cost.saturating_mul(MARGIN_MONEY_RATE);
    LoanSplit {
        total_cost,
        margin_money,
        eligible_loan: total_cost.saturating_sub(margin_money),
    }
}

/// Display totals derived from a form. Recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedTotals {
    pub total_cost: Decimal,
    pub margin_money: Decimal,
    pub eligible_loan: Decimal,
    pub monthly_expense_total: Decimal,
    pub annual_expense_total: Decimal,
}

impl DerivedTotals {
    pub fn from_form(form: &FormAggregate) -> Self {
        let split = compute_loan_split(total_selected_cost(form.requirements.values()));
        let monthly_expense_total = total_selected_cost(form.monthly_expenses.values());

        Self {
            total_cost: split.total_cost,
            margin_money: split.margin_money,
            eligible_loan: split.eligible_loan,
            monthly_expense_total,
            annual_expense_total: monthly_expense_total.saturating_mul(MONTHS_PER_YEAR),
        }
    }

    pub fn loan_split(&self) -> LoanSplit {
        LoanSplit {
            total_cost: self.total_cost,
            margin_money: self.margin_money,
            eligible_loan: self.eligible_loan,
        }
    }
}

/// One selected requirement and its share of the total project cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetShare {
    pub key: RequirementKey,
    pub amount: Decimal,
    pub percent: Decimal,
}

/// Breaks the project cost down by selected requirement, in category order.
pub fn asset_breakdown(form: &FormAggregate) -> Vec<AssetShare> {
    let total = total_selected_cost(form.requirements.values());

    form.requirements
        .iter()
        .filter(|(_, entry)| entry.selected)
        .map(|(key, entry)| {
            let amount = entry.amount();
            AssetShare {
                key: *key,
                amount,
                percent: percent_of(amount, total),
            }
        })
        .collect()
}
