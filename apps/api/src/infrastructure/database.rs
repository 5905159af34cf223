// Database connection, migrations and error mapping
// Shared by every PostgreSQL repository

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::domain::errors::RepositoryError;

/// Embedded reversible migrations from `apps/api/migrations`
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const UNIQUE_VIOLATION: &str = "23505";

/// Opens a connection pool
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Applies pending migrations
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

/// Classifies a driver error
///
/// A unique-index violation becomes `Conflict`; everything else is
/// `Internal` with `context` prefixed.
pub fn map_sqlx_error(context: &str, err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return RepositoryError::Conflict(constraint.to_string());
        }
    }

    RepositoryError::Internal(format!("{}: {}", context, err))
}

/// Wraps a filter needle for `ILIKE`, escaping its wildcards
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_internal() {
        let err = map_sqlx_error("Failed to find user", sqlx::Error::RowNotFound);

        match err {
            RepositoryError::Internal(message) => {
                assert!(message.starts_with("Failed to find user: "))
            }
            other => panic!("expected internal, got {:?}", other),
        }
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("widget"), "%widget%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn migrations_are_embedded() {
        assert!(MIGRATOR.iter().count() >= 2);
    }
}
