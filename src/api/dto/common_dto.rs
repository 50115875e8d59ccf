//! Response envelope shared by every `/api` endpoint.

use serde::Serialize;
use utoipa::ToSchema;

/// Uniform success envelope: `{ success, message?, data? }`.
///
/// Failures use [`crate::error::ErrorResponse`], which has the same shape
/// with `success: false` and no data.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` for every response built through this type.
    pub success: bool,
    /// Human-readable outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Endpoint payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// A payload without a message.
    #[must_use]
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    /// A payload with a message.
    #[must_use]
    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

/// Success envelope carrying only a message.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl StatusResponse {
    /// A successful outcome with `message`.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
