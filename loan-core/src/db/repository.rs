use async_trait::async_trait;
use thiserror::Error;

use crate::models::{LoanCategory, LoanReport, NewLoanReport, ReportSummary};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A stored form could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Storage for submitted loan reports.
///
/// Implementations persist the whole [`crate::models::FormAggregate`] so a
/// report read back by id is field-for-field equal to what was submitted.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn create_report(
        &self,
        report: NewLoanReport,
    ) -> Result<LoanReport, RepositoryError>;

    async fn get_report(
        &self,
        id: i64,
    ) -> Result<LoanReport, RepositoryError>;

    /// Replaces the stored form and bumps `updated_at`.
    async fn update_report(
        &self,
        report: &LoanReport,
    ) -> Result<(), RepositoryError>;

    async fn delete_report(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Most recently updated first, optionally filtered by loan category.
    async fn list_reports(
        &self,
        loan: Option<LoanCategory>,
    ) -> Result<Vec<LoanReport>, RepositoryError>;

    /// Listing rows for every report, most recently updated first.
    async fn list_summaries(&self) -> Result<Vec<ReportSummary>, RepositoryError>;
}
