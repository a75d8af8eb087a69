use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{HUNDRED, format_currency, max, parse_amount};
use crate::calculations::{
    AllocationShares, AssetAllocation, AssetShare, DerivedTotals, EmiResult, MARGIN_MONEY_RATE,
    WorkingCapitalInput, WorkingCapitalSplit, YearlyRepayment, asset_breakdown,
    compute_asset_allocation, compute_emi, compute_working_capital,
};
use crate::calculations::project_cost::MONTHS_PER_YEAR;
use crate::models::{FormAggregate, MonthlyExpenseKey};

/// Everything a renderer needs, already derived from one form.
///
/// Renderers only lay this out; they never recompute totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    /// Set only for reports built from demonstration data.
    pub preview: bool,
    pub company: CompanyDetails,
    pub totals: DerivedTotals,
    pub assets: Vec<AssetShare>,
    pub expenses: Vec<ExpenseLine>,
    pub terms: FinancingSummary,
    pub allocation: AssetAllocation,
    pub allocation_shares: AllocationShares,
    /// Present for loan categories that finance working capital.
    pub working_capital: Option<WorkingCapitalSplit>,
    /// Absent when the tenure or rate cannot be amortized.
    pub repayment: Option<EmiResult>,
    pub repayment_schedule: Vec<YearlyRepayment>,
    pub annexure: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    pub business_type: String,
    pub industry: String,
    pub loan_category: Option<String>,
    pub owner_name: String,
    pub gender: String,
    pub education: String,
    pub category: String,
    pub business_start: String,
    pub registration_type: Option<String>,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseLine {
    pub key: MonthlyExpenseKey,
    pub monthly: Decimal,
    pub annual: Decimal,
}

/// Parsed loan terms as used in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancingSummary {
    pub interest_rate_percent: Decimal,
    pub tenure_years: Decimal,
    pub own_contribution_percent: Decimal,
    pub working_capital_margin_percent: Decimal,
}

impl FinancingSummary {
    /// A blank own contribution falls back to the margin-money rate.
    pub fn from_form(form: &FormAggregate) -> Self {
        let terms = &form.financing;
        let own_contribution_percent = if terms.own_contribution_percent.trim().is_empty() {
            MARGIN_MONEY_RATE * HUNDRED
        } else {
            parse_amount(&terms.own_contribution_percent)
        };

        Self {
            interest_rate_percent: parse_amount(&terms.interest_rate_percent),
            tenure_years: parse_amount(&terms.tenure_years),
            own_contribution_percent,
            working_capital_margin_percent: parse_amount(&terms.working_capital_margin_percent),
        }
    }
}

impl ReportData {
    /// Derives a report from a submitted form.
    pub fn from_form(form: &FormAggregate) -> Self {
        Self::build(form, false)
    }

    /// A report over built-in sample data, flagged as a preview.
    pub fn preview() -> Self {
        Self::build(&FormAggregate::sample(), true)
    }

    fn build(
        form: &FormAggregate,
        preview: bool,
    ) -> Self {
        let totals = DerivedTotals::from_form(form);
        let terms = FinancingSummary::from_form(form);

        let allocation = compute_asset_allocation(
            totals.total_cost,
            parse_amount(&form.financing.subsidy),
            terms.own_contribution_percent,
        );

        let working_capital = form
            .loan
            .filter(|loan| loan.includes_working_capital())
            .map(|_| {
                let input = WorkingCapitalInput::from_entry(
                    &form.financing.working_capital,
                    totals.monthly_expense_total,
                );
                compute_working_capital(&input, terms.working_capital_margin_percent)
            });

        let principal = max(allocation.term_loan, Decimal::ZERO);
        let repayment =
            match compute_emi(principal, terms.interest_rate_percent, terms.tenure_years) {
                Ok(emi) => Some(emi),
                Err(e) => {
                    debug!("no repayment schedule: {}", e);
                    None
                }
            };
        let repayment_schedule = repayment
            .as_ref()
            .map(EmiResult::yearly_summary)
            .unwrap_or_default();

        let expenses = form
            .monthly_expenses
            .iter()
            .filter(|(_, entry)| entry.selected)
            .map(|(key, entry)| {
                let monthly = entry.amount();
                ExpenseLine {
                    key: *key,
                    monthly,
                    annual: monthly.saturating_mul(MONTHS_PER_YEAR),
                }
            })
            .collect();

        Self {
            preview,
            company: CompanyDetails::from_form(form),
            totals,
            assets: asset_breakdown(form),
            expenses,
            terms,
            allocation_shares: allocation.shares(),
            allocation,
            working_capital,
            repayment,
            repayment_schedule,
            annexure: form.notes.trim().to_string(),
        }
    }

    pub fn fields(&self) -> ReportFields {
        ReportFields::from_totals(&self.totals)
    }
}

impl CompanyDetails {
    fn from_form(form: &FormAggregate) -> Self {
        let business = &form.business_info;
        let personal = &form.personal_info;

        let address = [
            &business.address,
            &business.locality,
            &business.panchayath,
            &business.town,
            &business.pincode,
        ]
        .into_iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            name: form.full_name.trim().to_string(),
            business_type: form.business_type.clone(),
            industry: form.industry.clone(),
            loan_category: form.loan.map(|loan| loan.to_long_str().to_string()),
            owner_name: personal.owner_name.clone(),
            gender: personal.gender.clone(),
            education: personal.education.clone(),
            category: personal.category.clone(),
            business_start: personal.business_start.clone(),
            registration_type: business
                .registration_type
                .map(|kind| kind.to_long_str().to_string()),
            address,
            phone: business.phone.clone(),
            email: business.email.clone(),
        }
    }
}

/// Amount text returned alongside a stored report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFields {
    pub asset_amount: String,
    pub margin_money: String,
    pub loan_amount: String,
    pub monthly_expense_amount: String,
    pub annual_expense_amount: String,
}

impl ReportFields {
    pub fn from_form(form: &FormAggregate) -> Self {
        Self::from_totals(&DerivedTotals::from_form(form))
    }

    pub fn from_totals(totals: &DerivedTotals) -> Self {
        Self {
            asset_amount: format_currency(totals.total_cost),
            margin_money: format_currency(totals.margin_money),
            loan_amount: format_currency(totals.eligible_loan),
            monthly_expense_amount: format_currency(totals.monthly_expense_total),
            annual_expense_amount: format_currency(totals.annual_expense_total),
        }
    }
}
