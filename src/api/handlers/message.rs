//! Message handlers: list, create, delete.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get};
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, CreateMessageRequest, MessageDto, StatusResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServiceError};

/// `GET /messages` — Most recent messages, newest first.
///
/// # Errors
///
/// Returns [`ServiceError::Unavailable`] in degraded mode or
/// [`ServiceError::Store`] on query failure.
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    summary = "List recent messages",
    description = "Returns up to 50 messages ordered by creation time, newest first.",
    responses(
        (status = 200, description = "Message list", body = ApiResponse<Vec<MessageDto>>),
        (status = 500, description = "Query failed", body = ErrorResponse),
        (status = 503, description = "Database not available", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let messages = state.message_service.list_recent().await?;
    let data: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();
    Ok(Json(ApiResponse::data(data)))
}

/// `POST /messages` — Store a new message.
///
/// A body that is missing or not valid JSON is treated like absent
/// content.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] on blank content,
/// [`ServiceError::Unavailable`] in degraded mode, or
/// [`ServiceError::Store`] if the insert or the read-back fails.
#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    summary = "Create a message",
    description = "Stores the trimmed content and returns the row as recorded by the database, including its assigned id and timestamp.",
    request_body = CreateMessageRequest,
    responses(
        (status = 201, description = "Message saved", body = ApiResponse<MessageDto>),
        (status = 400, description = "Content missing or blank", body = ErrorResponse),
        (status = 500, description = "Insert or read-back failed", body = ErrorResponse),
        (status = 503, description = "Database not available", body = ErrorResponse),
    )
)]
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ServiceError> {
    let content = match payload {
        Ok(Json(req)) => req.content,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "unreadable message body");
            None
        }
    };

    let message = state.message_service.create(content.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Message saved successfully!",
            MessageDto::from(message),
        )),
    ))
}

/// `DELETE /messages/{id}` — Remove a message.
///
/// Succeeds whether or not a row with that id existed.
///
/// # Errors
///
/// Returns [`ServiceError::Unavailable`] in degraded mode,
/// [`ServiceError::InvalidRequest`] for a non-integer id, or
/// [`ServiceError::Store`] on query failure.
#[utoipa::path(
    delete,
    path = "/api/messages/{id}",
    tag = "Messages",
    summary = "Delete a message",
    description = "Deletes the message with the given id. Deleting an id that does not exist also reports success.",
    params(
        ("id" = i64, Path, description = "Message id"),
    ),
    responses(
        (status = 200, description = "Delete processed", body = StatusResponse),
        (status = 400, description = "Id is not an integer", body = ErrorResponse),
        (status = 500, description = "Query failed", body = ErrorResponse),
        (status = 503, description = "Database not available", body = ErrorResponse),
    )
)]
pub async fn delete_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.message_service.delete(&id).await?;
    Ok(Json(StatusResponse::ok("Message deleted")))
}

/// Message routes, nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages", get(list_messages).post(create_message))
        .route("/messages/{id}", delete(delete_message))
}
