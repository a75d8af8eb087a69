//! Financial derivations for loan reports.
//!
//! Every function here is pure and recomputed from the form on each read;
//! nothing derived is stored. Values keep full decimal precision and are
//! rounded only when formatted for display.

pub mod asset_allocation;
pub mod common;
pub mod emi;
pub mod project_cost;
pub mod working_capital;

pub use asset_allocation::{AllocationShares, AssetAllocation, compute_asset_allocation};
pub use emi::{EmiError, EmiResult, Installment, YearlyRepayment, compute_emi};
pub use project_cost::{
    AssetShare, DerivedTotals, LoanSplit, MARGIN_MONEY_RATE, asset_breakdown, compute_loan_split,
    total_selected_cost,
};
pub use working_capital::{WorkingCapitalInput, WorkingCapitalSplit, compute_working_capital};
