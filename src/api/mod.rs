//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Message endpoints are mounted under `/api`; `/health` and
//! `/api/db-test` come from the system routes. Every other `GET` falls
//! through to the built single-page client.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get_service;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::ServiceConfig;
use crate::error::ServiceError;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
        .merge(docs_routes())
}

/// Builds the full application: API routes, OpenAPI document, client
/// fallback and middleware, bound to `state`.
///
/// A request that exceeds `config.request_timeout` is answered with `408`
/// and the usual failure envelope.
pub fn build_app(state: AppState, config: &ServiceConfig) -> Router {
    let index = config.static_dir.join("index.html");
    let client = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    build_router()
        // The only API path without a GET of its own.
        .route("/api/messages/{id}", get_service(client.clone()))
        .fallback_service(client)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(middleware::map_response(timeout_envelope))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        tracing::warn!("request timed out");
        return ServiceError::TimedOut.into_response();
    }
    response
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(
        SwaggerUi::new("/swagger-ui").url(openapi::OPENAPI_PATH, openapi::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    Router::new().route(openapi::OPENAPI_PATH, axum::routing::get(openapi::openapi_json))
}
