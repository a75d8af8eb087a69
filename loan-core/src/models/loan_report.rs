use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::form::FormAggregate;
use super::loan_category::LoanCategory;
use crate::calculations::DerivedTotals;
use crate::calculations::common::round_half_up;

/// A persisted report submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanReport {
    pub id: i64,
    pub form: FormAggregate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new reports (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoanReport {
    pub form: FormAggregate,
}

impl From<FormAggregate> for NewLoanReport {
    fn from(form: FormAggregate) -> Self {
        Self { form }
    }
}

/// Listing row for a stored report, without the full form.
///
/// The amounts are snapshots taken when the report was last written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: i64,
    pub full_name: String,
    pub loan: Option<LoanCategory>,
    pub total_cost: Decimal,
    pub eligible_loan: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl ReportSummary {
    /// Builds a listing row from a full report, totals rounded to paise.
    pub fn of(report: &LoanReport) -> Self {
        let totals = DerivedTotals::from_form(&report.form);
        Self {
            id: report.id,
            full_name: report.form.full_name.trim().to_string(),
            loan: report.form.loan,
            total_cost: round_half_up(totals.total_cost),
            eligible_loan: round_half_up(totals.eligible_loan),
            updated_at: report.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn summary_of_sample_report() {
        let stamp = Utc.with_ymd_and_hms(2025, 3, 1, 10, 30, 0).unwrap();
        let report = LoanReport {
            id: 3,
            form: FormAggregate::sample(),
            created_at: stamp,
            updated_at: stamp,
        };

        let summary = ReportSummary::of(&report);

        assert_eq!(summary.id, 3);
        assert_eq!(summary.full_name, "Sample Bakery Works");
        assert_eq!(summary.loan, Some(LoanCategory::Composite));
        assert_eq!(summary.total_cost, dec!(900000));
        assert_eq!(summary.eligible_loan, dec!(810000));
        assert_eq!(summary.updated_at, stamp);
    }
}
