//! Database models for stored messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored row from the `messages` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Auto-increment row ID assigned by the store.
    pub id: i64,
    /// Trimmed, non-empty text.
    pub content: String,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The single row returned by the connectivity probe (`SELECT 1 AS test`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRow {
    /// Always `1`.
    pub test: i64,
}
