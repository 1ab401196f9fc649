//! Repository for document snapshot database operations.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    error::Result,
    models::{DocumentRecord, RoomId},
};

/// Repository for the `documents` table.
///
/// One row per room, replaced wholesale on every sync. The primary key's
/// conflict resolution is the only write coordination: concurrent syncs
/// for the same room resolve to whichever write completes last.
pub struct Repository {
    pool: Arc<SqlitePool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<SqlitePool> {
        self.pool.clone()
    }

    /// Inserts or replaces the snapshot for a room.
    ///
    /// A connection is acquired for the scope of this call and returned
    /// to the pool on every exit path, including query failure. After a
    /// successful return the table holds exactly one row for `room_id`
    /// whose snapshot equals `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if acquisition or the write fails.
    pub async fn upsert(&self, room_id: &RoomId, snapshot: &[u8]) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        sqlx::query(
            r"
            INSERT INTO documents (room_id, snapshot, synced_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(room_id) DO UPDATE SET
                snapshot = excluded.snapshot,
                synced_at = excluded.synced_at
            ",
        )
        .bind(room_id)
        .bind(snapshot)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Fetches the stored snapshot for a room, if any.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the query fails.
    pub async fn find(&self, room_id: &RoomId) -> Result<Option<DocumentRecord>> {
        let record = sqlx::query_as::<_, DocumentRecord>(
            "SELECT room_id, snapshot, synced_at FROM documents WHERE room_id = ?1",
        )
        .bind(room_id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(record)
    }

    /// Counts stored document rows.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents").fetch_one(&*self.pool).await?;

        Ok(count)
    }
}
