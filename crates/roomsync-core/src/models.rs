//! Core domain models and strongly-typed identifiers.
//!
//! Defines the room identifier newtype and the persisted document record.
//! Database serialization impls live next to the types so repositories can
//! bind and decode domain values directly.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

type Db = sqlx::Sqlite;
type SqliteTypeInfo = sqlx::sqlite::SqliteTypeInfo;
type SqliteValueRef<'r> = sqlx::sqlite::SqliteValueRef<'r>;
type SqliteArgumentValue<'q> = sqlx::sqlite::SqliteArgumentValue<'q>;
type EncodeResult = Result<sqlx::encode::IsNull, BoxDynError>;
type BoxDynError = sqlx::error::BoxDynError;

/// Strongly-typed room identifier.
///
/// Wraps the upstream service's room key to prevent mixing with other
/// string-shaped values. The key is opaque: the upstream service chooses
/// it, and this system only requires it to be unique per document room.
///
/// # Example
///
/// ```
/// use roomsync_core::models::RoomId;
/// let room = RoomId::from("room-1");
/// println!("Syncing room: {}", room);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl sqlx::Type<Db> for RoomId {
    fn type_info() -> SqliteTypeInfo {
        <String as sqlx::Type<Db>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, Db> for RoomId {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let s = <String as sqlx::Decode<Db>>::decode(value)?;
        Ok(Self(s))
    }
}

impl<'q> sqlx::Encode<'q, Db> for RoomId {
    fn encode_by_ref(&self, buf: &mut Vec<SqliteArgumentValue<'q>>) -> EncodeResult {
        <String as sqlx::Encode<Db>>::encode_by_ref(&self.0, buf)
    }
}

/// Persisted snapshot of a room's document state.
///
/// One row per room, enforced by the table's primary key. The snapshot is
/// an opaque byte blob: this system never interprets its contents, it only
/// replaces it wholesale on each sync. Rows are created on first sync and
/// overwritten on every subsequent one; nothing here deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentRecord {
    /// Room this snapshot belongs to. Unique across the table.
    pub room_id: RoomId,

    /// Full serialized document state captured by the last sync.
    pub snapshot: Vec<u8>,

    /// When the last successful sync wrote this row.
    pub synced_at: DateTime<Utc>,
}
