//! Store readiness, fixed once at startup.
//!
//! ```text
//! UNINITIALIZED ──initialize()──┬── Ok ───────────────► Ready(handle)
//!                               ├── Connect / Schema ─► Degraded(handle)
//!                               └── MissingConfig ────► Unconfigured
//! ```
//!
//! There is no transition out of `Degraded` or `Unconfigured`: a database
//! that becomes healthy later is only picked up by a restart.

use std::sync::Arc;

use sqlx::MySqlPool;

use crate::error::InitError;
use crate::persistence::{MessageStore, MySqlMessageStore};

/// Readiness of the message store as seen by request handlers.
///
/// "Connected without a handle" is unrepresentable.
#[derive(Debug, Clone)]
pub enum StoreState {
    /// Required settings were missing; no pool exists.
    Unconfigured,
    /// A pool exists but startup could not verify it.
    Degraded(Arc<dyn MessageStore>),
    /// The pool answered and the schema is in place.
    Ready(Arc<dyn MessageStore>),
}

impl StoreState {
    /// Turns the pool manager's result into a readiness state, logging
    /// the failure that led to degraded mode.
    #[must_use]
    pub fn from_init(result: Result<MySqlPool, InitError>) -> Self {
        match result {
            Ok(pool) => Self::Ready(Arc::new(MySqlMessageStore::new(pool))),
            Err(err) => {
                log_init_failure(&err);
                match err.into_pool() {
                    Some(pool) => Self::Degraded(Arc::new(MySqlMessageStore::new(pool))),
                    None => Self::Unconfigured,
                }
            }
        }
    }

    /// `true` only in [`StoreState::Ready`].
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The store handle whenever a pool exists, verified or not.
    #[must_use]
    pub fn handle(&self) -> Option<&Arc<dyn MessageStore>> {
        match self {
            Self::Unconfigured => None,
            Self::Degraded(store) | Self::Ready(store) => Some(store),
        }
    }

    /// The store handle only when it is usable by message endpoints.
    #[must_use]
    pub fn ready(&self) -> Option<&Arc<dyn MessageStore>> {
        match self {
            Self::Ready(store) => Some(store),
            Self::Unconfigured | Self::Degraded(_) => None,
        }
    }
}

fn log_init_failure(err: &InitError) {
    match err {
        InitError::MissingConfig(fields) => {
            tracing::error!(
                missing = ?fields,
                "missing required database settings; starting without database"
            );
        }
        InitError::Connect { source, .. } | InitError::Schema { source, .. } => {
            let (code, errno) = err.diagnostics();
            tracing::error!(
                error = %source,
                detail = ?source,
                code = ?code,
                errno = ?errno,
                "MySQL initialization failed; starting in degraded mode"
            );
        }
    }
}
