use serde::{Deserialize, Serialize};

/// The wizard's steps, in the order they are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    BusinessName,
    BusinessType,
    Industry,
    LoanType,
    Requirements,
    MonthlyExpenses,
    PersonalInfo,
    BusinessInfo,
    Address,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 10] = [
        Self::BusinessName,
        Self::BusinessType,
        Self::Industry,
        Self::LoanType,
        Self::Requirements,
        Self::MonthlyExpenses,
        Self::PersonalInfo,
        Self::BusinessInfo,
        Self::Address,
        Self::Review,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|step| step == self)
            .unwrap_or_default()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BusinessName => "Business Name",
            Self::BusinessType => "Business Type",
            Self::Industry => "Industry",
            Self::LoanType => "Loan Type",
            Self::Requirements => "Project Requirements",
            Self::MonthlyExpenses => "Monthly Expenses",
            Self::PersonalInfo => "Promoter Details",
            Self::BusinessInfo => "Business Details",
            Self::Address => "Address",
            Self::Review => "Review & Submit",
        }
    }

    pub fn is_last(&self) -> bool {
        self.index() == Self::COUNT - 1
    }
}
