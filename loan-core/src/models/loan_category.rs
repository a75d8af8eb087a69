use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoanCategory {
    TermLoan,
    WorkingCapital,
    Composite,
    Mudra,
}

impl LoanCategory {
    pub const ALL: [LoanCategory; 4] = [
        Self::TermLoan,
        Self::WorkingCapital,
        Self::Composite,
        Self::Mudra,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TermLoan => "term-loan",
            Self::WorkingCapital => "working-capital",
            Self::Composite => "composite",
            Self::Mudra => "mudra",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "term-loan" => Some(Self::TermLoan),
            "working-capital" => Some(Self::WorkingCapital),
            "composite" => Some(Self::Composite),
            "mudra" => Some(Self::Mudra),
            _ => None,
        }
    }

    pub fn to_long_str(&self) -> &'static str {
        match self {
            Self::TermLoan => "Term Loan",
            Self::WorkingCapital => "Working Capital Loan",
            Self::Composite => "Composite Loan (Term + Working Capital)",
            Self::Mudra => "MUDRA Loan",
        }
    }

    /// Whether the facility finances working capital alongside (or instead
    /// of) fixed assets. MUDRA loans cover both.
    pub fn includes_working_capital(&self) -> bool {
        matches!(self, Self::WorkingCapital | Self::Composite | Self::Mudra)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegistrationType {
    Proprietorship,
    Partnership,
    Llp,
    PrivateLimited,
    Cooperative,
}

impl RegistrationType {
    pub fn to_long_str(&self) -> &'static str {
        match self {
            Self::Proprietorship => "Proprietorship",
            Self::Partnership => "Partnership Firm",
            Self::Llp => "Limited Liability Partnership",
            Self::PrivateLimited => "Private Limited Company",
            Self::Cooperative => "Co-operative Society",
        }
    }
}
