//! Inbound webhook event types.
//!
//! The upstream document service notifies this system with JSON events.
//! Only `ydocUpdated` triggers work; every other kind is accepted and
//! ignored, so new upstream event types never break ingestion.

use serde::Deserialize;

use crate::models::RoomId;

/// A verified inbound webhook event.
///
/// Values of this type only exist after signature verification; handlers
/// can trust the payload they carry. The tag mirrors the upstream wire
/// format (`{"type": "ydocUpdated", "data": {...}}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// A room's document storage changed and its snapshot should be
    /// re-synced.
    #[serde(rename = "ydocUpdated")]
    YdocUpdated {
        /// Event payload carrying the affected room.
        data: YdocUpdated,
    },

    /// Any event kind this system does not act on.
    ///
    /// Unknown kinds are acknowledged with success and dropped.
    #[serde(other)]
    Unsupported,
}

impl InboundEvent {
    /// Returns the room to sync, if this event kind triggers one.
    pub fn room_to_sync(&self) -> Option<&RoomId> {
        match self {
            Self::YdocUpdated { data } => Some(&data.room_id),
            Self::Unsupported => None,
        }
    }
}

/// Payload of a `ydocUpdated` event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YdocUpdated {
    /// Room whose document changed.
    pub room_id: RoomId,
}
