//! Error types for every layer, with HTTP status code mapping.
//!
//! [`ServiceError`] is what handlers return; each variant maps to an HTTP
//! status and renders the `{success: false, message}` envelope.
//! [`InitError`] never reaches a handler: the composition root turns it into
//! degraded mode.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::MySqlPool;
use sqlx::mysql::MySqlDatabaseError;
use utoipa::ToSchema;

/// JSON body of every failed request.
///
/// ```json
/// { "success": false, "message": "Database not available" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub message: String,
}

/// Invalid listener-level configuration. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that cannot be parsed.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Environment key.
        key: &'static str,
        /// Raw value found.
        value: String,
    },
}

/// Why the database pool could not be brought up at startup.
///
/// `Connect` and `Schema` keep the pool that was built so the service can
/// still hold an (unused) handle in degraded mode.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Required settings are absent; no connection was attempted.
    #[error("missing required database settings: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    /// Acquiring the first connection failed (network, auth or timeout).
    #[error("database connection failed: {source}")]
    Connect {
        /// The pool built before the failed acquire.
        pool: MySqlPool,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },

    /// The table bootstrap statement failed.
    #[error("schema bootstrap failed: {source}")]
    Schema {
        /// The pool whose connection ran the statement.
        pool: MySqlPool,
        /// Driver error.
        #[source]
        source: sqlx::Error,
    },
}

impl InitError {
    /// Consumes the error, returning the pool handle if one was built.
    #[must_use]
    pub fn into_pool(self) -> Option<MySqlPool> {
        match self {
            Self::MissingConfig(_) => None,
            Self::Connect { pool, .. } | Self::Schema { pool, .. } => Some(pool),
        }
    }

    /// Driver diagnostics: SQLSTATE code and MySQL error number, when the
    /// server reported them.
    #[must_use]
    pub fn diagnostics(&self) -> (Option<String>, Option<u16>) {
        match self {
            Self::MissingConfig(_) => (None, None),
            Self::Connect { source, .. } | Self::Schema { source, .. } => {
                driver_diagnostics(source)
            }
        }
    }
}

/// Extracts the SQLSTATE code and MySQL error number from a driver error.
#[must_use]
pub fn driver_diagnostics(err: &sqlx::Error) -> (Option<String>, Option<u16>) {
    match err {
        sqlx::Error::Database(db) => (
            db.code().map(|c| c.into_owned()),
            db.try_downcast_ref::<MySqlDatabaseError>()
                .map(MySqlDatabaseError::number),
        ),
        _ => (None, None),
    }
}

/// Failure of a single store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Driver or server error.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// The server assigned an id outside the signed 64-bit range.
    #[error("assigned id {0} is out of range")]
    IdOutOfRange(u64),

    /// The row just inserted could not be read back by its id.
    #[error("message {0} not found after insert")]
    MissingAfterInsert(i64),
}

/// Handler-facing error enum with HTTP status code mapping.
///
/// | Variant          | HTTP Status                 |
/// |------------------|-----------------------------|
/// | `InvalidRequest` | 400 Bad Request             |
/// | `TimedOut`       | 408 Request Timeout         |
/// | `Unavailable`    | 503 Service Unavailable     |
/// | `Store`          | 500 Internal Server Error   |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request input failed validation.
    #[error("{0}")]
    InvalidRequest(&'static str),

    /// The operation needs the database and it is not usable.
    #[error("{0}")]
    Unavailable(&'static str),

    /// The request ran past the configured request timeout.
    #[error("Request timed out")]
    TimedOut,

    /// A store call failed; `context` names the operation.
    #[error("{context}: {source}")]
    Store {
        /// Operation prefix, e.g. `"Failed to fetch messages"`.
        context: &'static str,
        /// Underlying failure.
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::TimedOut => StatusCode::REQUEST_TIMEOUT,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a closure wrapping a [`StoreError`] with `context`, for use
    /// with `map_err`.
    pub fn store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { context, source }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Store { context, source } = &self {
            let (code, errno) = match source {
                StoreError::Database(err) => driver_diagnostics(err),
                _ => (None, None),
            };
            tracing::error!(error = %source, code = ?code, errno = ?errno, "{context}");
        }
        let body = ErrorResponse {
            success: false,
            message: self.to_string(),
        };
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(
            ServiceError::InvalidRequest("Message content is required").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unavailable("Database not available").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::TimedOut.status_code(),
            StatusCode::REQUEST_TIMEOUT
        );
        let err = ServiceError::store("Failed to fetch messages")(StoreError::Database(
            sqlx::Error::PoolTimedOut,
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn store_error_message_carries_context_and_detail() {
        let err = ServiceError::store("Failed to save message")(StoreError::MissingAfterInsert(7));
        assert_eq!(
            err.to_string(),
            "Failed to save message: message 7 not found after insert"
        );
    }

    #[test]
    fn missing_config_lists_keys() {
        let err = InitError::MissingConfig(vec!["DB_HOST", "DB_NAME"]);
        assert_eq!(
            err.to_string(),
            "missing required database settings: DB_HOST, DB_NAME"
        );
        assert_eq!(err.diagnostics(), (None, None));
        assert!(err.into_pool().is_none());
    }

    #[tokio::test]
    async fn response_uses_failure_envelope() {
        let response = ServiceError::Unavailable("Database not available").into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("body should be readable");
        };
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
            panic!("body should be JSON");
        };
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Database not available");
        assert!(body.get("data").is_none());
    }
}
