//! PostgreSQL pool construction and error classification

use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, Error as SqlxError, PgPool};
use tracing::info;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Connection pool built from a [`DatabaseConfig`]
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, SqlxError> {
        info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Opening PostgreSQL pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect(&config.url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn has_code(err: &SqlxError, code: &str) -> bool {
    match err {
        SqlxError::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

/// A row collided with a `UNIQUE` constraint
pub fn is_unique_violation(err: &SqlxError) -> bool {
    has_code(err, UNIQUE_VIOLATION)
}

/// A row referenced a missing parent
pub fn is_foreign_key_violation(err: &SqlxError) -> bool {
    has_code(err, FOREIGN_KEY_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_have_no_code() {
        assert!(!is_unique_violation(&SqlxError::RowNotFound));
        assert!(!is_foreign_key_violation(&SqlxError::PoolTimedOut));
    }

    #[tokio::test]
    async fn test_unreachable_database_fails_fast() {
        let config = DatabaseConfig {
            url: "postgresql://127.0.0.1:1/programmer_helper".to_string(),
            acquire_timeout: std::time::Duration::from_secs(1),
            min_connections: 0,
            ..DatabaseConfig::default()
        };

        assert!(DatabasePool::new(&config).await.is_err());
    }
}
