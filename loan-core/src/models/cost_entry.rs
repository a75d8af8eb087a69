use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::parse_amount;

/// A selectable line item with its raw, user-entered cost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostEntry {
    pub selected: bool,
    pub cost: String,
}

impl CostEntry {
    pub fn new(
        selected: bool,
        cost: impl Into<String>,
    ) -> Self {
        Self {
            selected,
            cost: cost.into(),
        }
    }

    /// Cost contributed to totals: the parsed cost when selected, otherwise 0.
    pub fn amount(&self) -> Decimal {
        if self.selected {
            parse_amount(&self.cost)
        } else {
            Decimal::ZERO
        }
    }
}

/// Project cost categories collected by the requirements step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKey {
    Land,
    Building,
    Machinery,
    Computers,
    Furniture,
    Electrification,
    Storage,
    Transportation,
    Installation,
    Other,
}

impl RequirementKey {
    pub const ALL: [RequirementKey; 10] = [
        Self::Land,
        Self::Building,
        Self::Machinery,
        Self::Computers,
        Self::Furniture,
        Self::Electrification,
        Self::Storage,
        Self::Transportation,
        Self::Installation,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::Building => "building",
            Self::Machinery => "machinery",
            Self::Computers => "computers",
            Self::Furniture => "furniture",
            Self::Electrification => "electrification",
            Self::Storage => "storage",
            Self::Transportation => "transportation",
            Self::Installation => "installation",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Land => "Land",
            Self::Building => "Building / Civil Works",
            Self::Machinery => "Plant & Machinery",
            Self::Computers => "Computers & Peripherals",
            Self::Furniture => "Furniture & Fixtures",
            Self::Electrification => "Electrification",
            Self::Storage => "Storage",
            Self::Transportation => "Transportation",
            Self::Installation => "Installation",
            Self::Other => "Other Assets",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

/// Recurring cost categories collected by the monthly expenses step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthlyExpenseKey {
    Rent,
    Salary,
    Consumables,
    Stationary,
    Utilities,
    Maintenance,
    Transportation,
    Communication,
    Marketing,
    Miscellaneous,
}

impl MonthlyExpenseKey {
    pub const ALL: [MonthlyExpenseKey; 10] = [
        Self::Rent,
        Self::Salary,
        Self::Consumables,
        Self::Stationary,
        Self::Utilities,
        Self::Maintenance,
        Self::Transportation,
        Self::Communication,
        Self::Marketing,
        Self::Miscellaneous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Salary => "salary",
            Self::Consumables => "consumables",
            Self::Stationary => "stationary",
            Self::Utilities => "utilities",
            Self::Maintenance => "maintenance",
            Self::Transportation => "transportation",
            Self::Communication => "communication",
            Self::Marketing => "marketing",
            Self::Miscellaneous => "miscellaneous",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Salary => "Salaries & Wages",
            Self::Consumables => "Consumables",
            Self::Stationary => "Stationery",
            Self::Utilities => "Utilities",
            Self::Maintenance => "Maintenance",
            Self::Transportation => "Transportation",
            Self::Communication => "Communication",
            Self::Marketing => "Marketing",
            Self::Miscellaneous => "Miscellaneous",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }
}

/// Project cost entries keyed by category. Absent keys count as unselected.
pub type Requirements = BTreeMap<RequirementKey, CostEntry>;

/// Monthly expense entries keyed by category. Absent keys count as unselected.
pub type MonthlyExpenses = BTreeMap<MonthlyExpenseKey, CostEntry>;
