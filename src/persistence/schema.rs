//! Idempotent table bootstrap.

use sqlx::MySqlConnection;

/// Creates the `messages` table if it does not exist yet.
pub const CREATE_MESSAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS messages (
    id INT AUTO_INCREMENT PRIMARY KEY,
    content TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

/// Ensures the `messages` table exists on the given connection.
///
/// Safe to run on every start.
///
/// # Errors
///
/// Returns the driver error if the statement fails.
pub async fn ensure_schema(conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_MESSAGES_TABLE).execute(&mut *conn).await?;
    tracing::info!("messages table ready");
    Ok(())
}
