//! SQL credential store.
//!
//! Retrieves clear-text passwords from PostgreSQL with a configurable
//! query. The query receives the user name as its only bind parameter and
//! must return the password in the first column of the first row.

use crate::backend::CredentialStore;
use crate::config::DatabaseSettings;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum SqlError {
    #[error("Database connection error: {0}")]
    Connection(String),
    #[error("Database query error: {0}")]
    Query(String),
}

pub struct SqlCredentialStore {
    pool: PgPool,
    password_sql: String,
}

impl SqlCredentialStore {
    /// Connect a small pool to the configured database.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, SqlError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&settings.connection)
            .await
            .map_err(|e| SqlError::Connection(e.to_string()))?;

        debug!("Connected credential store database");
        Ok(SqlCredentialStore {
            pool,
            password_sql: settings.password_sql.clone(),
        })
    }

    async fn query_password(&self, user_name: &str) -> Result<Option<String>, SqlError> {
        let row = sqlx::query(&self.password_sql)
            .bind(user_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| SqlError::Query(e.to_string()))?;

        match row {
            Some(row) => row
                .try_get::<String, _>(0)
                .map(Some)
                .map_err(|e| SqlError::Query(e.to_string())),
            None => Ok(None),
        }
    }
}

impl CredentialStore for SqlCredentialStore {
    fn password_for(&self, user_name: &str) -> Option<String> {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                match self.query_password(user_name).await {
                    Ok(password) => password,
                    Err(e) => {
                        warn!(username = %user_name, error = %e, "Credential store lookup failed");
                        None
                    }
                }
            })
        })
    }
}
