//! Working capital requirement and its means of finance.
//!
//! The requirement is either assessed from its components (stock plus
//! receivables, less trade payables), from an operating cycle (monthly
//! expenses carried for a number of months), or entered directly. The
//! promoter funds the margin share and the bank finances the rest.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{HUNDRED, max, parse_amount};
use crate::models::WorkingCapitalEntry;

/// Parsed working capital inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum WorkingCapitalInput {
    OperatingCycle {
        monthly_expenses: Decimal,
        months: Decimal,
    },
    Components {
        stock: Decimal,
        receivables: Decimal,
        payables: Decimal,
    },
    Manual {
        amount: Decimal,
    },
}

impl WorkingCapitalInput {
    /// Builds the input from the form's raw entry. The operating cycle uses
    /// the form's monthly expense total.
    pub fn from_entry(
        entry: &WorkingCapitalEntry,
        monthly_expense_total: Decimal,
    ) -> Self {
        match entry {
            WorkingCapitalEntry::OperatingCycle { months } => Self::OperatingCycle {
                monthly_expenses: monthly_expense_total,
                months: parse_amount(months),
            },
            WorkingCapitalEntry::Components {
                stock,
                receivables,
                payables,
            } => Self::Components {
                stock: parse_amount(stock),
                receivables: parse_amount(receivables),
                payables: parse_amount(payables),
            },
            WorkingCapitalEntry::Manual { amount } => Self::Manual {
                amount: parse_amount(amount),
            },
        }
    }

    /// The requirement, never below zero.
    pub fn requirement(&self) -> Decimal {
        let gross = match *self {
            Self::OperatingCycle {
                monthly_expenses,
                months,
            } => monthly_expenses.saturating_mul(months),
            Self::Components {
                stock,
                receivables,
                payables,
            } => stock.saturating_add(receivables).saturating_sub(payables),
            Self::Manual { amount } => amount,
        };
        max(gross, Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingCapitalSplit {
    pub requirement: Decimal,
    pub own_margin: Decimal,
    pub bank_finance: Decimal,
}

/// Splits the working capital requirement into promoter margin and bank finance.
pub fn compute_working_capital(
    input: &WorkingCapitalInput,
    margin_percent: Decimal,
) -> WorkingCapitalSplit {
    let requirement = input.requirement();
    let own_margin = (requirement / HUNDRED).saturating_mul(margin_percent);

    WorkingCapitalSplit {
        requirement,
        own_margin,
        bank_finance: requirement.saturating_sub(own_margin),
    }
}
