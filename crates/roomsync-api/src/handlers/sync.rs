//! Webhook handler that syncs room snapshots into the database.
//!
//! Accepts the document service's change notifications, verifies their
//! signature, and for `ydocUpdated` events pulls the room's current
//! snapshot and upserts it. Every other verified event kind is
//! acknowledged without side effects.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::{debug, error, info, instrument, warn};

use crate::AppState;

/// Handles an inbound webhook delivery.
///
/// The flow is verify, dispatch, fetch, persist; the first failing step
/// ends the request with its mapped status and no further side effects:
/// - 400: signature verification failed
/// - 200: verified but ignored event kind, or completed sync
/// - 500: snapshot fetch or database write failed
#[instrument(name = "sync_webhook", skip(state, headers, body))]
pub async fn sync_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // The raw body bytes are verified as received; parsing happens
    // inside the verifier only after the signature checks out.
    let event = match state.verifier.verify(&headers, &body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Webhook verification failed");
            return (StatusCode::BAD_REQUEST, format!("could not verify webhook call: {e}"))
                .into_response();
        },
    };

    let Some(room_id) = event.room_to_sync().cloned() else {
        debug!("Event kind does not trigger a sync, acknowledging");
        return StatusCode::OK.into_response();
    };

    debug!(room_id = %room_id, "Document update notification received");

    let snapshot = match state.snapshots.fetch(&room_id).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!(room_id = %room_id, error = %e, "Snapshot fetch failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("problem fetching room snapshot: {e}"),
            )
                .into_response();
        },
    };

    match state.storage.documents.upsert(&room_id, &snapshot).await {
        Ok(()) => {
            info!(room_id = %room_id, snapshot_len = snapshot.len(), "Room snapshot synced");
            StatusCode::OK.into_response()
        },
        Err(e) => {
            error!(room_id = %room_id, error = %e, "Snapshot persistence failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("problem writing snapshot to database: {e}"),
            )
                .into_response()
        },
    }
}
