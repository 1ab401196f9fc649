//! Roomsync HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use roomsync_core::{storage::Storage, Clock};
use roomsync_upstream::SnapshotClient;

pub mod config;
pub mod crypto;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use crypto::{VerifyError, WebhookVerifier};
pub use server::{create_router, start_server};

/// Shared application state cloned into each request handler.
///
/// Collaborators are injected at construction time; handlers never reach
/// for ambient configuration or global lookups.
#[derive(Clone)]
pub struct AppState {
    /// Storage layer for snapshot persistence.
    pub storage: Storage,
    /// Verifier for inbound webhook signatures.
    pub verifier: WebhookVerifier,
    /// Client for upstream snapshot reads.
    pub snapshots: SnapshotClient,
    /// Time source for handlers.
    pub clock: Arc<dyn Clock>,
}
