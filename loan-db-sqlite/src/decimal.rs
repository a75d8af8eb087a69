use loan_core::RepositoryError;
use loan_core::calculations::common::round_half_up;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Reads a money column stored as INTEGER or REAL. NULL reads as zero.
pub fn get_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{column}' not found: {e}")))?;

    if value_ref.is_null() {
        return Ok(Decimal::ZERO);
    }

    let type_name = value_ref.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get INTEGER from '{column}': {e}"))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{column}': {e}"))
            })?;
            Decimal::try_from(val)
                .map(round_half_up)
                .map_err(|e| RepositoryError::Database(format!("Failed to convert {val}: {e}")))
        }
        other => Err(RepositoryError::Database(format!(
            "Unexpected type '{other}' for column '{column}'"
        ))),
    }
}

/// Converts an amount for a REAL column, rounded to paise first.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    round_half_up(d).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::*;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE amounts (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                text_value TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch(
        pool: &SqlitePool,
        insert: &str,
        column: &str,
    ) -> Result<Decimal, RepositoryError> {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        let row = sqlx::query("SELECT * FROM amounts WHERE id = 1")
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row");
        get_decimal(&row, column)
    }

    #[tokio::test]
    async fn reads_integer_column() {
        let pool = setup_test_db().await;

        let result = fetch(&pool, "INSERT INTO amounts (id, int_value) VALUES (1, 900000)", "int_value").await;

        assert_eq!(result, Ok(dec!(900000)));
    }

    #[tokio::test]
    async fn reads_real_column_rounded_to_paise() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO amounts (id, real_value) VALUES (1, 810000.5)",
            "real_value",
        )
        .await;

        assert_eq!(result, Ok(dec!(810000.50)));
    }

    #[tokio::test]
    async fn null_reads_as_zero() {
        let pool = setup_test_db().await;

        let result = fetch(&pool, "INSERT INTO amounts (id) VALUES (1)", "real_value").await;

        assert_eq!(result, Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn text_column_is_rejected() {
        let pool = setup_test_db().await;

        let result = fetch(
            &pool,
            "INSERT INTO amounts (id, text_value) VALUES (1, '12.5')",
            "text_value",
        )
        .await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("TEXT")));
    }

    #[tokio::test]
    async fn missing_column_is_a_database_error() {
        let pool = setup_test_db().await;

        let result = fetch(&pool, "INSERT INTO amounts (id) VALUES (1)", "no_such_column").await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    #[test]
    fn decimal_to_f64_rounds_first() {
        assert_eq!(decimal_to_f64(dec!(1234.565)), 1234.57);
        assert_eq!(decimal_to_f64(Decimal::ZERO), 0.0);
    }
}
