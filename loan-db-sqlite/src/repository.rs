use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use loan_core::calculations::DerivedTotals;
use loan_core::{
    FormAggregate, LoanCategory, LoanReport, NewLoanReport, ReportRepository, ReportSummary,
    RepositoryError,
};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::{debug, info};

use crate::decimal::{decimal_to_f64, get_decimal};

const MEMORY: &str = ":memory:";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `database` as a file path, a `sqlite:` URL, or `:memory:`.
    ///
    /// Files are created if missing. An in-memory database lives on a
    /// single pooled connection that is never recycled.
    pub async fn new(database: &str) -> Result<Self> {
        let pool = if database == MEMORY || database == "sqlite::memory:" {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await
        } else {
            let options = if database.starts_with("sqlite:") {
                SqliteConnectOptions::from_str(database)
                    .with_context(|| format!("Invalid database URL: {database}"))?
            } else {
                SqliteConnectOptions::new().filename(database)
            };
            SqlitePoolOptions::new()
                .connect_with(options.create_if_missing(true))
                .await
        }
        .with_context(|| format!("Failed to connect to database: {database}"))?;

        info!(database, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn parse_category(value: Option<String>) -> Result<Option<LoanCategory>, RepositoryError> {
    value
        .map(|tag| {
            LoanCategory::parse(&tag).ok_or_else(|| {
                RepositoryError::Database(format!("Unknown loan category '{tag}'"))
            })
        })
        .transpose()
}

fn row_to_loan_report(row: &SqliteRow) -> Result<LoanReport, RepositoryError> {
    let form_json: String = row.try_get("form_json").map_err(db_err)?;
    let form: FormAggregate = serde_json::from_str(&form_json)?;

    Ok(LoanReport {
        id: row.try_get("id").map_err(db_err)?,
        form,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {e}")))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {e}")))?,
    })
}

fn row_to_summary(row: &SqliteRow) -> Result<ReportSummary, RepositoryError> {
    Ok(ReportSummary {
        id: row.try_get("id").map_err(db_err)?,
        full_name: row.try_get("full_name").map_err(db_err)?,
        loan: parse_category(row.try_get("loan_category").map_err(db_err)?)?,
        total_cost: get_decimal(row, "total_cost")?,
        eligible_loan: get_decimal(row, "eligible_loan")?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {e}")))?,
    })
}

/// Columns derived from the form and stored beside it for listings.
struct Snapshot {
    full_name: String,
    loan_category: Option<&'static str>,
    total_cost: f64,
    eligible_loan: f64,
    form_json: String,
}

impl Snapshot {
    fn of(form: &FormAggregate) -> Result<Self, RepositoryError> {
        let totals = DerivedTotals::from_form(form);
        Ok(Self {
            full_name: form.full_name.trim().to_string(),
            loan_category: form.loan.map(|loan| loan.as_str()),
            total_cost: decimal_to_f64(totals.total_cost),
            eligible_loan: decimal_to_f64(totals.eligible_loan),
            form_json: serde_json::to_string(form)?,
        })
    }
}

#[async_trait]
impl ReportRepository for SqliteRepository {
    async fn create_report(
        &self,
        report: NewLoanReport,
    ) -> Result<LoanReport, RepositoryError> {
        let now = Utc::now();
        let snapshot = Snapshot::of(&report.form)?;

        let result = sqlx::query(
            "INSERT INTO loan_report (
                full_name, loan_category, total_cost, eligible_loan, form_json,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&snapshot.full_name)
        .bind(snapshot.loan_category)
        .bind(snapshot.total_cost)
        .bind(snapshot.eligible_loan)
        .bind(&snapshot.form_json)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, "stored loan report");
        self.get_report(id).await
    }

    async fn get_report(
        &self,
        id: i64,
    ) -> Result<LoanReport, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, form_json, created_at, updated_at FROM loan_report WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_loan_report(&row)
    }

    async fn update_report(
        &self,
        report: &LoanReport,
    ) -> Result<(), RepositoryError> {
        let snapshot = Snapshot::of(&report.form)?;

        let result = sqlx::query(
            "UPDATE loan_report SET
                full_name = ?, loan_category = ?, total_cost = ?, eligible_loan = ?,
                form_json = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&snapshot.full_name)
        .bind(snapshot.loan_category)
        .bind(snapshot.total_cost)
        .bind(snapshot.eligible_loan)
        .bind(&snapshot.form_json)
        .bind(Utc::now())
        .bind(report.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete_report(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loan_report WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_reports(
        &self,
        loan: Option<LoanCategory>,
    ) -> Result<Vec<LoanReport>, RepositoryError> {
        const BASE_QUERY: &str = "SELECT id, form_json, created_at, updated_at FROM loan_report";

        let rows = match loan {
            Some(category) => {
                sqlx::query(&format!(
                    "{BASE_QUERY} WHERE loan_category = ? ORDER BY updated_at DESC, id DESC"
                ))
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{BASE_QUERY} ORDER BY updated_at DESC, id DESC"))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_loan_report).collect()
    }

    async fn list_summaries(&self) -> Result<Vec<ReportSummary>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, full_name, loan_category, total_cost, eligible_loan, updated_at
             FROM loan_report ORDER BY updated_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_summary).collect()
    }
}

#[cfg(test)]
mod tests {
    use loan_core::{CostEntry, RequirementKey};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let repo = SqliteRepository::new(MEMORY)
            .await
            .expect("Failed to create in-memory database");
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn form_named(
        name: &str,
        loan: LoanCategory,
    ) -> FormAggregate {
        let mut form = FormAggregate::sample();
        form.full_name = name.to_string();
        form.loan = Some(loan);
        form
    }

    #[tokio::test]
    async fn test_create_and_get_round_trips_the_form() {
        let repo = setup_test_db().await;
        let mut form = FormAggregate::sample();
        form.notes = "Quotations attached.".to_string();
        form.requirements
            .insert(RequirementKey::Land, CostEntry::new(false, "not a number"));

        let created = repo
            .create_report(NewLoanReport::from(form.clone()))
            .await
            .expect("Should create report");
        let fetched = repo
            .get_report(created.id)
            .await
            .expect("Should fetch report");

        assert!(created.id > 0);
        assert_eq!(fetched.form, form);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_report_not_found() {
        let repo = setup_test_db().await;

        assert_eq!(repo.get_report(99999).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_update_report_replaces_form() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("Should create report");

        created.form.full_name = "Renamed Works".to_string();
        created
            .form
            .requirements
            .insert(RequirementKey::Land, CostEntry::new(true, "100000"));
        repo.update_report(&created)
            .await
            .expect("Should update report");

        let fetched = repo
            .get_report(created.id)
            .await
            .expect("Should fetch report");
        assert_eq!(fetched.form, created.form);
        assert!(fetched.updated_at >= created.updated_at);

        let summaries = repo.list_summaries().await.expect("Should list summaries");
        assert_eq!(summaries[0].full_name, "Renamed Works");
        assert_eq!(summaries[0].total_cost, dec!(1000000));
    }

    #[tokio::test]
    async fn test_update_report_not_found() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("Should create report");

        created.id = 99999;

        assert_eq!(repo.update_report(&created).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_report() {
        let repo = setup_test_db().await;
        let created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("Should create report");

        repo.delete_report(created.id)
            .await
            .expect("Should delete report");

        assert_eq!(repo.get_report(created.id).await, Err(RepositoryError::NotFound));
        assert_eq!(repo.delete_report(created.id).await, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_reports_filters_by_category() {
        let repo = setup_test_db().await;
        for (name, loan) in [
            ("First", LoanCategory::TermLoan),
            ("Second", LoanCategory::Mudra),
            ("Third", LoanCategory::TermLoan),
        ] {
            repo.create_report(form_named(name, loan).into())
                .await
                .expect("Should create report");
        }

        let all = repo.list_reports(None).await.expect("Should list reports");
        let term_loans = repo
            .list_reports(Some(LoanCategory::TermLoan))
            .await
            .expect("Should list reports");

        assert_eq!(all.len(), 3);
        assert_eq!(term_loans.len(), 2);
        assert!(term_loans
            .iter()
            .all(|report| report.form.loan == Some(LoanCategory::TermLoan)));
    }

    #[tokio::test]
    async fn test_list_summaries_snapshot_totals() {
        let repo = setup_test_db().await;
        let created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("Should create report");

        let summaries = repo.list_summaries().await.expect("Should list summaries");

        assert_eq!(
            summaries,
            vec![ReportSummary {
                id: created.id,
                full_name: "Sample Bakery Works".to_string(),
                loan: Some(LoanCategory::Composite),
                total_cost: dec!(900000),
                eligible_loan: dec!(810000),
                updated_at: created.updated_at,
            }]
        );
    }

    #[tokio::test]
    async fn test_corrupt_form_json_is_a_serialization_error() {
        let repo = setup_test_db().await;
        let created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("Should create report");
        sqlx::query("UPDATE loan_report SET form_json = '{\"loan\":\"payday\"}' WHERE id = ?")
            .bind(created.id)
            .execute(repo.pool())
            .await
            .expect("Should corrupt row");

        assert!(matches!(
            repo.get_report(created.id).await,
            Err(RepositoryError::Serialization(_))
        ));
    }
}
