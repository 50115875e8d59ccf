//! Message DTOs for create, list and probe responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::persistence::models::{Message, ProbeRow};

/// Request body for `POST /api/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMessageRequest {
    /// Message text; surrounding whitespace is trimmed before storing.
    #[serde(default)]
    pub content: Option<String>,
}

/// A stored message as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageDto {
    /// Store-assigned identifier.
    pub id: i64,
    /// Trimmed message text.
    pub content: String,
    /// Store-assigned creation time.
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            content: message.content,
            created_at: message.created_at,
        }
    }
}

/// One row of the `GET /api/db-test` result.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct ProbeRowDto {
    /// Always `1`.
    pub test: i64,
}

impl From<ProbeRow> for ProbeRowDto {
    fn from(row: ProbeRow) -> Self {
        Self { test: row.test }
    }
}
