//! Means of finance for the fixed assets of a project.
//!
//! | Line | Description |
//! |------|-------------|
//! | 1    | Total asset value |
//! | 2    | Capital subsidy |
//! | 3    | Net asset (Line 1 - Line 2) |
//! | 4    | Own contribution (Line 3 × own contribution %) |
//! | 5    | Term loan (Line 3 - Line 4) |
//!
//! Shares are reported against the total asset value. A project with no
//! assets reports every share as 0. Lines saturate at the decimal range.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{HUNDRED, percent_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub total_asset: Decimal,
    pub subsidy: Decimal,
    pub net_asset: Decimal,
    pub own_contribution: Decimal,
    pub term_loan: Decimal,
}

/// Percentages of the total asset value taken by each source of finance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationShares {
    pub subsidy: Decimal,
    pub own_contribution: Decimal,
    pub term_loan: Decimal,
}

/// Splits the asset value net of subsidy into own contribution and term loan.
pub fn compute_asset_allocation(
    total_asset: Decimal,
    subsidy: Decimal,
    own_contribution_percent: Decimal,
) -> AssetAllocation {
    let net_asset = total_asset.saturating_sub(subsidy);
    let own_contribution = (net_asset / HUNDRED).saturating_mul(own_contribution_percent);

    AssetAllocation {
        total_asset,
        subsidy,
        net_asset,
        own_contribution,
        term_loan: net_asset.saturating_sub(own_contribution),
    }
}

impl AssetAllocation {
    pub fn shares(&self) -> AllocationShares {
        AllocationShares {
            subsidy: percent_of(self.subsidy, self.total_asset),
            own_contribution: percent_of(self.own_contribution, self.total_asset),
            term_loan: percent_of(self.term_loan, self.total_asset),
        }
    }
}
