//! Health check handlers for service monitoring.
//!
//! Provides liveness, readiness, and health endpoints with a database
//! connectivity check for orchestration systems.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status.
    pub status: HealthStatus,
    /// Timestamp when the check was performed.
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks.
    pub checks: HealthChecks,
    /// Service version information.
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational.
    Healthy,
    /// Critical systems failing.
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Database connectivity and basic query test.
    pub database: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status.
    pub status: ComponentStatus,
    /// Optional error message if unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Component-level health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Component is healthy.
    Up,
    /// Component is experiencing issues.
    Down,
}

/// Health check endpoint handler.
///
/// Designed to be called frequently by orchestration systems and load
/// balancers, so it performs only a lightweight connectivity query.
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let timestamp = DateTime::<Utc>::from(state.clock.now_system());

    let database = match state.storage.health_check().await {
        Ok(()) => {
            debug!("Database health check passed");
            ComponentHealth { status: ComponentStatus::Up, message: None }
        },
        Err(e) => {
            error!(error = %e, "Database health check failed");
            ComponentHealth { status: ComponentStatus::Down, message: Some(e.to_string()) }
        },
    };

    let (status_code, overall) = match database.status {
        ComponentStatus::Up => (StatusCode::OK, HealthStatus::Healthy),
        ComponentStatus::Down => (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Unhealthy),
    };

    let response = HealthResponse {
        status: overall,
        timestamp,
        checks: HealthChecks { database },
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response)).into_response()
}

/// Readiness check endpoint for orchestration probes.
///
/// Ready means the same thing as healthy here: the service can reach
/// its database.
#[instrument(name = "readiness_check", skip(state))]
pub async fn readiness_check(State(state): State<AppState>) -> Response {
    health_check(State(state)).await
}

/// Liveness check endpoint for orchestration probes.
///
/// Minimal check that does not touch external dependencies; only
/// confirms the HTTP server is responding.
#[instrument(name = "liveness_check", skip(state))]
pub async fn liveness_check(State(state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": DateTime::<Utc>::from(state.clock.now_system()),
        "service": "roomsync-api",
    });

    (StatusCode::OK, Json(response)).into_response()
}
