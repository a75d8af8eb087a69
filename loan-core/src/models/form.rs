use serde::{Deserialize, Serialize};

use super::cost_entry::{CostEntry, MonthlyExpenseKey, MonthlyExpenses, RequirementKey, Requirements};
use super::loan_category::{LoanCategory, RegistrationType};

/// Everything the report wizard collects, as one aggregate.
///
/// Numeric inputs stay as the text the user typed; the calculation modules
/// parse them leniently when deriving totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormAggregate {
    pub full_name: String,
    pub business_type: String,
    pub industry: String,
    pub loan: Option<LoanCategory>,
    pub requirements: Requirements,
    pub monthly_expenses: MonthlyExpenses,
    pub personal_info: PersonalInfo,
    pub business_info: BusinessInfo,
    pub financing: FinancingTerms,
    /// Free-text annexure printed at the end of the report.
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub owner_name: String,
    pub gender: String,
    pub education: String,
    /// Social category of the promoter.
    pub category: String,
    /// When the business started (or is planned to start).
    pub business_start: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessInfo {
    pub address: String,
    pub locality: String,
    pub panchayath: String,
    pub town: String,
    pub pincode: String,
    pub registration_type: Option<RegistrationType>,
    pub phone: String,
    pub email: String,
}

/// Loan terms used for EMI, asset allocation and working capital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancingTerms {
    pub interest_rate_percent: String,
    pub tenure_years: String,
    pub subsidy: String,
    pub own_contribution_percent: String,
    pub working_capital: WorkingCapitalEntry,
    /// Promoter's margin on the working capital requirement.
    pub working_capital_margin_percent: String,
}

/// How the working capital requirement was entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum WorkingCapitalEntry {
    /// Monthly expenses carried for a number of months.
    OperatingCycle { months: String },
    /// Stock plus receivables, less trade payables.
    Components {
        stock: String,
        receivables: String,
        payables: String,
    },
    Manual { amount: String },
}

impl Default for WorkingCapitalEntry {
    fn default() -> Self {
        Self::OperatingCycle {
            months: String::new(),
        }
    }
}

impl FormAggregate {
    /// A fresh aggregate for a new wizard session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requirement(
        &self,
        key: RequirementKey,
    ) -> Option<&CostEntry> {
        self.requirements.get(&key)
    }

    pub fn monthly_expense(
        &self,
        key: MonthlyExpenseKey,
    ) -> Option<&CostEntry> {
        self.monthly_expenses.get(&key)
    }

    /// Demonstration data for report previews.
    ///
    /// Only [`crate::report::ReportData::preview`] should build reports from
    /// this; previews are flagged so they cannot pass for a real submission.
    pub fn sample() -> Self {
        let requirements = [
            (RequirementKey::Building, "300000"),
            (RequirementKey::Machinery, "450000"),
            (RequirementKey::Computers, "60000"),
            (RequirementKey::Furniture, "40000"),
            (RequirementKey::Electrification, "50000"),
        ]
        .into_iter()
        .map(|(key, cost)| (key, CostEntry::new(true, cost)))
        .collect();

        let monthly_expenses = [
            (MonthlyExpenseKey::Rent, "8000"),
            (MonthlyExpenseKey::Salary, "36000"),
            (MonthlyExpenseKey::Consumables, "12000"),
            (MonthlyExpenseKey::Utilities, "4000"),
        ]
        .into_iter()
        .map(|(key, cost)| (key, CostEntry::new(true, cost)))
        .collect();

        Self {
            full_name: "Sample Bakery Works".to_string(),
            business_type: "Manufacturing".to_string(),
            industry: "Food Processing".to_string(),
            loan: Some(LoanCategory::Composite),
            requirements,
            monthly_expenses,
            personal_info: PersonalInfo {
                owner_name: "Sample Owner".to_string(),
                gender: "Female".to_string(),
                education: "Graduate".to_string(),
                category: "General".to_string(),
                business_start: "Within 3 months".to_string(),
            },
            business_info: BusinessInfo {
                address: "12 Market Road".to_string(),
                locality: "Town Centre".to_string(),
                panchayath: "Sample Panchayath".to_string(),
                town: "Sampleville".to_string(),
                pincode: "682001".to_string(),
                registration_type: Some(RegistrationType::Proprietorship),
                phone: "9876543210".to_string(),
                email: "owner@example.com".to_string(),
            },
            financing: FinancingTerms {
                interest_rate_percent: "11.5".to_string(),
                tenure_years: "5".to_string(),
                subsidy: "150000".to_string(),
                own_contribution_percent: "10".to_string(),
                working_capital: WorkingCapitalEntry::OperatingCycle {
                    months: "3".to_string(),
                },
                working_capital_margin_percent: "25".to_string(),
            },
            notes: String::new(),
        }
    }
}
