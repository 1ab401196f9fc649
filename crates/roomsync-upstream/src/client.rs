//! HTTP client for fetching room snapshots from the document service.
//!
//! Handles request construction, bearer authentication, and error
//! categorization. There is no partial-snapshot handling: a fetch yields
//! the full response body or an error.

use std::time::Duration;

use bytes::Bytes;
use roomsync_core::RoomId;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::{Result, UpstreamError};

/// Configuration for the snapshot client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the document service.
    pub base_url: String,
    /// Bearer token for the service's REST API.
    pub api_token: String,
    /// Timeout for snapshot requests.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.liveblocks.io".to_string(),
            api_token: String::new(),
            timeout: Duration::from_secs(30),
            user_agent: "Roomsync/0.1".to_string(),
        }
    }
}

/// HTTP client for per-room snapshot reads.
///
/// Uses connection pooling and a configured timeout. Cheap to clone;
/// the application state holds one instance shared across requests.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl SnapshotClient {
    /// Creates a new snapshot client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `UpstreamError::Configuration` if the HTTP client cannot
    /// be built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Fetches the full current snapshot for a room.
    ///
    /// Issues `GET {base}/v2/rooms/{room}/ydoc` with bearer
    /// authentication and returns the raw response body as received.
    ///
    /// # Errors
    ///
    /// - `Timeout` if the request exceeds the configured timeout
    /// - `Network` for connection and transport failures
    /// - `Status` for any non-2xx response
    pub async fn fetch(&self, room_id: &RoomId) -> Result<Bytes> {
        let url = format!(
            "{}/v2/rooms/{}/ydoc",
            self.config.base_url.trim_end_matches('/'),
            room_id
        );

        let span = info_span!("snapshot_fetch", room_id = %room_id, url = %url);

        async move {
            debug!("Fetching room snapshot");

            let response =
                match self.client.get(&url).bearer_auth(&self.config.api_token).send().await {
                    Ok(response) => response,
                    Err(e) => {
                        if e.is_timeout() {
                            return Err(UpstreamError::Timeout {
                                timeout_secs: self.config.timeout.as_secs(),
                            });
                        }
                        return Err(UpstreamError::Network(e.to_string()));
                    },
                };

            let status = response.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "Snapshot fetch rejected");
                return Err(UpstreamError::Status { status: status.as_u16() });
            }

            let body = response.bytes().await.map_err(|e| {
                UpstreamError::Network(format!("failed to read snapshot body: {e}"))
            })?;

            debug!(snapshot_len = body.len(), "Snapshot fetched");
            Ok(body)
        }
        .instrument(span)
        .await
    }
}
