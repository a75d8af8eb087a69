use async_trait::async_trait;
use loan_core::db::{DbConfig, RepositoryFactory};
use loan_core::{ReportRepository, RepositoryError};

use crate::repository::SqliteRepository;

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use loan_core::db::RepositoryRegistry;
/// use loan_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// `config.connection_string` is a file path (created if missing), a
    /// `sqlite:` URL, or `:memory:`. Migrations run before the repository
    /// is returned.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn ReportRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(format!("{e:#}")))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(format!("{e:#}")))?;
        Ok(Box::new(repo))
    }
}

#[cfg(test)]
mod tests {
    use loan_core::FormAggregate;
    use loan_core::db::{DbConfig, RepositoryFactory, RepositoryRegistry};

    use super::SqliteRepositoryFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteRepositoryFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn registry_opens_a_migrated_in_memory_repository() {
        let mut registry = RepositoryRegistry::new();
        registry.register(Box::new(SqliteRepositoryFactory));

        let repo = registry
            .create(&DbConfig::default())
            .await
            .expect("failed to create in-memory repository");

        let created = repo
            .create_report(FormAggregate::sample().into())
            .await
            .expect("migrated schema should accept a report");
        assert_eq!(repo.get_report(created.id).await, Ok(created));
    }

    #[tokio::test]
    async fn bad_url_is_a_connection_error() {
        let config = DbConfig {
            backend: "sqlite".to_string(),
            connection_string: "sqlite://no/such/dir/reports.db?mode=ro".to_string(),
        };

        let result = SqliteRepositoryFactory.create(&config).await;

        assert!(matches!(result, Err(loan_core::RepositoryError::Connection(_))));
    }
}
