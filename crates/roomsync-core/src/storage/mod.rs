//! Database access layer implementing the repository pattern.
//!
//! Repositories translate between domain models and the relational
//! schema. All database operations go through this module so the store
//! behind it stays interchangeable: any relational database with an
//! upsert-by-primary-key primitive satisfies the same contract.

use std::sync::Arc;

use sqlx::SqlitePool;

pub mod documents;

use crate::error::Result;

/// Container for repository instances providing unified database access.
#[derive(Clone)]
pub struct Storage {
    /// Repository for document snapshot operations.
    pub documents: Arc<documents::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);

        Self { documents: Arc::new(documents::Repository::new(pool)) }
    }

    /// Performs a health check on the database connection.
    ///
    /// Executes a trivial query to verify connectivity. Used by the
    /// `/health` and `/ready` endpoints.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.documents.pool()).await?;

        Ok(())
    }
}

/// Creates the schema objects this service needs.
///
/// Plain DDL rather than a migration framework: the schema is a single
/// uniqueness-constrained table and the service owns it end to end.
///
/// # Errors
///
/// Returns an error if the DDL statement fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS documents (
            room_id TEXT PRIMARY KEY,
            snapshot BLOB NOT NULL,
            synced_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}
