//! Test infrastructure and utilities for roomsync.
//!
//! Provides an isolated in-memory database environment, webhook signing
//! helpers, and a mock upstream document service so integration tests
//! run deterministically without external dependencies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use anyhow::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use roomsync_core::{storage, storage::Storage};
use sha2::Sha256;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

type HmacSha256 = Hmac<Sha256>;

/// Signing secret used by tests, in the dashboard's `whsec_` format.
///
/// Decodes to the key `test-signing-secret`.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_dGVzdC1zaWduaW5nLXNlY3JldA==";

/// Test environment with an isolated in-memory database.
///
/// The pool is capped at a single connection, which doubles as a leak
/// detector: a request path that fails to release its connection
/// deadlocks the next acquisition instead of silently growing the pool.
pub struct TestEnv {
    pool: SqlitePool,
    /// Storage layer bound to the test database.
    pub storage: Storage,
}

impl TestEnv {
    /// Creates a fresh environment with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or prepared.
    pub async fn new() -> Result<Self> {
        let pool = SqlitePoolOptions::new().max_connections(1).connect("sqlite::memory:").await?;

        storage::run_migrations(&pool).await?;

        let storage = Storage::new(pool.clone());
        Ok(Self { pool, storage })
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Computes a `v1,<base64>` signature entry for a webhook delivery.
///
/// Mirrors the sender's scheme: HMAC-SHA256 over `{id}.{timestamp}.{body}`
/// keyed with the (optionally `whsec_`-prefixed, base64) secret.
pub fn sign_webhook(secret: &str, id: &str, timestamp: i64, body: &[u8]) -> String {
    let material = secret.strip_prefix("whsec_").unwrap_or(secret);
    let key = BASE64.decode(material).unwrap_or_else(|_| material.as_bytes().to_vec());

    let mut mac = HmacSha256::new_from_slice(&key).expect("hmac accepts any key length");
    mac.update(id.as_bytes());
    mac.update(b".");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(body);

    format!("v1,{}", BASE64.encode(mac.finalize().into_bytes()))
}

/// Mock of the upstream document service.
///
/// Expectations are verified when the mock is dropped at the end of a
/// test; an unexpected or missing snapshot fetch fails the test.
pub struct MockUpstream {
    server: MockServer,
}

impl MockUpstream {
    /// Starts a fresh mock server.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Base URL for pointing a snapshot client at this mock.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Serves `snapshot` for the given room, expecting exactly `hits`
    /// fetches over the test's lifetime.
    pub async fn stub_snapshot(&self, room: &str, snapshot: &[u8], hits: u64) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path(format!("/v2/rooms/{room}/ydoc")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(snapshot.to_vec()))
            .expect(hits)
            .mount(&self.server)
            .await;
    }

    /// Fails fetches for the given room with the given status.
    pub async fn stub_failure(&self, room: &str, status: u16) {
        Mock::given(matchers::method("GET"))
            .and(matchers::path(format!("/v2/rooms/{room}/ydoc")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Asserts that no snapshot fetch reaches the service at all.
    pub async fn expect_no_fetches(&self) {
        Mock::given(matchers::method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}
