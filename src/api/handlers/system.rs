//! System endpoints: health check and database probe.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, ProbeRowDto};
use crate::app_state::AppState;
use crate::config::SettingsPresence;
use crate::error::{ErrorResponse, ServiceError};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"SERVER ALIVE"`.
    status: &'static str,
    /// RFC 3339 time of the check.
    timestamp: String,
    /// `"connected"` or `"disconnected"`.
    database: &'static str,
    /// Which database settings were supplied.
    env: SettingsReport,
}

/// `"SET"` / `"NOT SET"` per database setting. Values are never echoed.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SettingsReport {
    db_host: &'static str,
    db_user: &'static str,
    db_password: &'static str,
    db_name: &'static str,
}

impl From<SettingsPresence> for SettingsReport {
    fn from(presence: SettingsPresence) -> Self {
        let flag = |set: bool| if set { "SET" } else { "NOT SET" };
        Self {
            db_host: flag(presence.host),
            db_user: flag(presence.user),
            db_password: flag(presence.password),
            db_name: flag(presence.name),
        }
    }
}

/// `GET /health` — Process liveness and database readiness.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Reports that the process is alive, whether the database was connected at startup, and which database settings were supplied. Never fails.",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.message_service.health();
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "SERVER ALIVE",
            timestamp: snapshot.timestamp.to_rfc3339(),
            database: if snapshot.connected {
                "connected"
            } else {
                "disconnected"
            },
            env: state.settings.into(),
        }),
    )
}

/// `GET /api/db-test` — Trivial round-trip query against the pool.
///
/// # Errors
///
/// Returns [`ServiceError::Unavailable`] when no pool exists, or
/// [`ServiceError::Store`] when the query fails.
#[utoipa::path(
    get,
    path = "/api/db-test",
    tag = "System",
    summary = "Database connectivity probe",
    description = "Runs `SELECT 1 AS test` on the pool. Works whenever a pool handle exists, even if startup could not verify it.",
    responses(
        (status = 200, description = "Database answered", body = ApiResponse<Vec<ProbeRowDto>>),
        (status = 500, description = "Query failed", body = ErrorResponse),
        (status = 503, description = "Database not configured", body = ErrorResponse),
    )
)]
pub async fn db_test_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.message_service.probe().await?;
    let data: Vec<ProbeRowDto> = rows.into_iter().map(ProbeRowDto::from).collect();
    Ok(Json(ApiResponse::with_message(
        "Database connected successfully!",
        data,
    )))
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/db-test", get(db_test_handler))
}
