mod cost_entry;
mod form;
mod loan_category;
mod loan_report;

pub use cost_entry::{CostEntry, MonthlyExpenseKey, MonthlyExpenses, RequirementKey, Requirements};
pub use form::{BusinessInfo, FinancingTerms, FormAggregate, PersonalInfo, WorkingCapitalEntry};
pub use loan_category::{LoanCategory, RegistrationType};
pub use loan_report::{LoanReport, NewLoanReport, ReportSummary};
