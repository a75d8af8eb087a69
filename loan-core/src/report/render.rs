//! Report renderers.
//!
//! A renderer lays out a [`ReportData`] as a document. The plain-text
//! renderer fits an 80-column terminal or a printed page.

use std::fmt::Write;

use rust_decimal::Decimal;
use thiserror::Error;

use super::data::ReportData;
use crate::calculations::MARGIN_MONEY_RATE;
use crate::calculations::common::{HUNDRED, format_currency, format_percent};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write report: {0}")]
    Write(#[from] std::fmt::Error),

    #[error("failed to encode report: {0}")]
    Encode(String),
}

pub trait ReportRenderer: Send + Sync {
    /// MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    fn render(
        &self,
        data: &ReportData,
    ) -> Result<String, RenderError>;
}

/// Renders the report as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

/// Renders the report data as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

const RULE_WIDTH: usize = 72;
pub const PREVIEW_BANNER: &str = "*** PREVIEW: SAMPLE DATA, NOT A SUBMITTED REPORT ***";

impl ReportRenderer for TextRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(
        &self,
        data: &ReportData,
    ) -> Result<String, RenderError> {
        let mut out = String::new();

        if data.preview {
            writeln!(out, "{PREVIEW_BANNER}")?;
            writeln!(out)?;
        }

        let title = if data.company.name.is_empty() {
            "Untitled business"
        } else {
            data.company.name.as_str()
        };
        writeln!(out, "PROJECT REPORT: {title}")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

        write_company(&mut out, data)?;
        write_project_cost(&mut out, data)?;
        write_means_of_finance(&mut out, data)?;
        write_working_capital(&mut out, data)?;
        write_expenses(&mut out, data)?;
        write_repayment(&mut out, data)?;

        if !data.annexure.is_empty() {
            section(&mut out, "Annexure")?;
            writeln!(out, "{}", data.annexure)?;
        }

        Ok(out)
    }
}

impl ReportRenderer for JsonRenderer {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(
        &self,
        data: &ReportData,
    ) -> Result<String, RenderError> {
        serde_json::to_string_pretty(data).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

fn section(
    out: &mut String,
    title: &str,
) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn field(
    out: &mut String,
    label: &str,
    value: &str,
) -> std::fmt::Result {
    if value.is_empty() {
        return Ok(());
    }
    writeln!(out, "{label:28}{value}")
}

fn amount_row(
    out: &mut String,
    label: &str,
    amount: Decimal,
) -> std::fmt::Result {
    writeln!(out, "{label:40}{:>18}", format_currency(amount))
}

fn share_row(
    out: &mut String,
    label: &str,
    amount: Decimal,
    percent: Decimal,
) -> std::fmt::Result {
    writeln!(
        out,
        "{label:40}{:>18}{:>10}",
        format_currency(amount),
        format_percent(percent)
    )
}

fn write_company(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    let company = &data.company;
    section(out, "Promoter and Business")?;
    field(out, "Business type:", &company.business_type)?;
    field(out, "Industry:", &company.industry)?;
    field(out, "Loan type:", company.loan_category.as_deref().unwrap_or_default())?;
    field(
        out,
        "Constitution:",
        company.registration_type.as_deref().unwrap_or_default(),
    )?;
    field(out, "Promoter:", &company.owner_name)?;
    field(out, "Gender:", &company.gender)?;
    field(out, "Education:", &company.education)?;
    field(out, "Category:", &company.category)?;
    field(out, "Commencement:", &company.business_start)?;
    field(out, "Address:", &company.address)?;
    field(out, "Phone:", &company.phone)?;
    field(out, "Email:", &company.email)
}

fn write_project_cost(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    section(out, "Cost of Project")?;
    for asset in &data.assets {
        share_row(out, asset.key.label(), asset.amount, asset.percent)?;
    }
    let total_share = if data.totals.total_cost.is_zero() {
        Decimal::ZERO
    } else {
        HUNDRED
    };
    share_row(out, "Total project cost", data.totals.total_cost, total_share)
}

fn write_means_of_finance(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    let allocation = &data.allocation;
    let shares = &data.allocation_shares;

    section(out, "Means of Finance")?;
    amount_row(
        out,
        &format!("Margin money ({})", format_percent(MARGIN_MONEY_RATE * HUNDRED)),
        data.totals.margin_money,
    )?;
    amount_row(out, "Eligible loan", data.totals.eligible_loan)?;
    writeln!(out)?;
    share_row(out, "Capital subsidy", allocation.subsidy, shares.subsidy)?;
    share_row(
        out,
        &format!(
            "Own contribution ({})",
            format_percent(data.terms.own_contribution_percent)
        ),
        allocation.own_contribution,
        shares.own_contribution,
    )?;
    share_row(out, "Term loan", allocation.term_loan, shares.term_loan)
}

fn write_working_capital(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    let Some(split) = &data.working_capital else {
        return Ok(());
    };

    section(out, "Working Capital")?;
    amount_row(out, "Requirement", split.requirement)?;
    amount_row(
        out,
        &format!(
            "Own margin ({})",
            format_percent(data.terms.working_capital_margin_percent)
        ),
        split.own_margin,
    )?;
    amount_row(out, "Bank finance", split.bank_finance)
}

fn write_expenses(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    if data.expenses.is_empty() {
        return Ok(());
    }

    section(out, "Monthly Expenses")?;
    writeln!(out, "{:30}{:>20}{:>20}", "", "Monthly", "Annual")?;
    for line in &data.expenses {
        writeln!(
            out,
            "{:30}{:>20}{:>20}",
            line.key.label(),
            format_currency(line.monthly),
            format_currency(line.annual)
        )?;
    }
    writeln!(
        out,
        "{:30}{:>20}{:>20}",
        "Total",
        format_currency(data.totals.monthly_expense_total),
        format_currency(data.totals.annual_expense_total)
    )
}

fn write_repayment(
    out: &mut String,
    data: &ReportData,
) -> std::fmt::Result {
    section(out, "Repayment")?;
    let Some(emi) = &data.repayment else {
        return writeln!(out, "Repayment terms not provided.");
    };

    amount_row(out, "Loan amount", emi.principal)?;
    writeln!(
        out,
        "{:40}{:>18}",
        "Interest rate",
        format_percent(data.terms.interest_rate_percent)
    )?;
    writeln!(out, "{:40}{:>18}", "Tenure (months)", emi.months)?;
    amount_row(out, "Monthly EMI", emi.monthly_emi)?;
    amount_row(out, "Total repayment", emi.total_amount)?;
    amount_row(out, "Total interest", emi.total_interest)?;

    writeln!(out)?;
    writeln!(
        out,
        "{:>6}{:>22}{:>22}{:>22}",
        "Year", "Principal", "Interest", "Balance"
    )?;
    for year in &data.repayment_schedule {
        writeln!(
            out,
            "{:>6}{:>22}{:>22}{:>22}",
            year.year,
            format_currency(year.principal),
            format_currency(year.interest),
            format_currency(year.closing_balance)
        )?;
    }
    Ok(())
}
