//! CSV export of stored report summaries.

use std::io;

use anyhow::{Context, Result};
use loan_core::calculations::common::round_half_up;
use loan_core::models::ReportSummary;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    id: i64,
    business_name: &'a str,
    loan_category: &'a str,
    total_cost: String,
    eligible_loan: String,
    updated_at: String,
}

impl<'a> From<&'a ReportSummary> for ExportRow<'a> {
    fn from(summary: &'a ReportSummary) -> Self {
        Self {
            id: summary.id,
            business_name: &summary.full_name,
            loan_category: summary.loan.map(|loan| loan.as_str()).unwrap_or_default(),
            total_cost: format!("{:.2}", round_half_up(summary.total_cost)),
            eligible_loan: format!("{:.2}", round_half_up(summary.eligible_loan)),
            updated_at: summary.updated_at.to_rfc3339(),
        }
    }
}

/// Writes one header row and one row per summary. Returns the row count.
pub fn write_summaries<W: io::Write>(
    writer: W,
    summaries: &[ReportSummary],
) -> Result<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    for summary in summaries {
        csv.serialize(ExportRow::from(summary))
            .with_context(|| format!("failed to write report {}", summary.id))?;
    }
    csv.flush().context("failed to flush CSV output")?;
    Ok(summaries.len())
}
