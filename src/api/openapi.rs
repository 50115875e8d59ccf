//! OpenAPI document for the REST surface.

use axum::Json;
use axum::response::IntoResponse;
use utoipa::OpenApi;

use super::handlers::{message, system};

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Collected OpenAPI description of every endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "msgboard",
        description = "Health, database probe and message endpoints over MySQL."
    ),
    paths(
        system::health_handler,
        system::db_test_handler,
        message::list_messages,
        message::create_message,
        message::delete_message,
    ),
    tags(
        (name = "System", description = "Liveness and database connectivity"),
        (name = "Messages", description = "Message storage"),
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json` — serves [`ApiDoc`] when Swagger UI is
/// compiled out.
pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
