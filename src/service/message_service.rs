//! Message service: readiness checks, validation and store orchestration.

use chrono::{DateTime, Utc};

use crate::error::{ServiceError, StoreError};
use crate::persistence::models::{Message, ProbeRow};
use crate::readiness::StoreState;

/// Maximum number of messages returned by a listing.
pub const RECENT_MESSAGES_LIMIT: u32 = 50;

const NOT_CONFIGURED: &str = "Database not configured - check environment variables";
const NOT_AVAILABLE: &str = "Database not available";
const CONTENT_REQUIRED: &str = "Message content is required";
const INVALID_ID: &str = "Invalid message id";

/// Process health as reported by `GET /health`.
#[derive(Debug, Clone, Copy)]
pub struct HealthSnapshot {
    /// Time the snapshot was taken.
    pub timestamp: DateTime<Utc>,
    /// Whether the store is ready.
    pub connected: bool,
}

/// Orchestration layer for all store-backed operations.
///
/// Holds the [`StoreState`] computed at startup and applies the same
/// precondition order for every operation: validate input, check
/// readiness, run the store calls, wrap failures with the operation's
/// context.
#[derive(Debug, Clone)]
pub struct MessageService {
    store: StoreState,
}

impl MessageService {
    /// Creates a new `MessageService`.
    #[must_use]
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    /// Reports liveness and readiness. Never fails.
    #[must_use]
    pub fn health(&self) -> HealthSnapshot {
        HealthSnapshot {
            timestamp: Utc::now(),
            connected: self.store.is_connected(),
        }
    }

    /// Runs the trivial round-trip query.
    ///
    /// Only needs a pool handle, not a verified one: a degraded pool is
    /// still probed, so this reports the database's current state.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unavailable`] if no pool exists.
    /// - [`ServiceError::Store`] if the query fails.
    pub async fn probe(&self) -> Result<Vec<ProbeRow>, ServiceError> {
        let store = self
            .store
            .handle()
            .ok_or(ServiceError::Unavailable(NOT_CONFIGURED))?;

        store
            .probe()
            .await
            .map_err(ServiceError::store("Database connection failed"))
    }

    /// Returns the most recent messages, newest first.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unavailable`] unless the store is ready.
    /// - [`ServiceError::Store`] if the query fails.
    pub async fn list_recent(&self) -> Result<Vec<Message>, ServiceError> {
        let store = self
            .store
            .ready()
            .ok_or(ServiceError::Unavailable(NOT_AVAILABLE))?;

        store
            .list_recent(RECENT_MESSAGES_LIMIT)
            .await
            .map_err(ServiceError::store("Failed to fetch messages"))
    }

    /// Stores trimmed `content` and returns the row as the store recorded
    /// it.
    ///
    /// The store assigns both id and timestamp, so the inserted row is
    /// read back by its new id before returning.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::InvalidRequest`] if `content` is absent or blank.
    /// - [`ServiceError::Unavailable`] unless the store is ready.
    /// - [`ServiceError::Store`] if the insert or the read-back fails.
    pub async fn create(&self, content: Option<&str>) -> Result<Message, ServiceError> {
        let content = validate_content(content)?;
        let store = self
            .store
            .ready()
            .ok_or(ServiceError::Unavailable(NOT_AVAILABLE))?;

        let wrap = ServiceError::store("Failed to save message");
        let id = match store.insert(content).await {
            Ok(id) => id,
            Err(err) => return Err(wrap(err)),
        };
        let message = match store.find(id).await {
            Ok(Some(message)) => message,
            Ok(None) => return Err(wrap(StoreError::MissingAfterInsert(id))),
            Err(err) => return Err(wrap(err)),
        };

        tracing::info!(id = message.id, "message saved");
        Ok(message)
    }

    /// Deletes the message with the given id.
    ///
    /// Deleting an id that does not exist succeeds as well.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unavailable`] unless the store is ready.
    /// - [`ServiceError::InvalidRequest`] if `raw_id` is not an integer.
    /// - [`ServiceError::Store`] if the query fails.
    pub async fn delete(&self, raw_id: &str) -> Result<(), ServiceError> {
        let store = self
            .store
            .ready()
            .ok_or(ServiceError::Unavailable(NOT_AVAILABLE))?;
        let id: i64 = raw_id
            .trim()
            .parse()
            .map_err(|_| ServiceError::InvalidRequest(INVALID_ID))?;

        let removed = store
            .delete(id)
            .await
            .map_err(ServiceError::store("Failed to delete message"))?;

        tracing::info!(id, removed, "message delete processed");
        Ok(())
    }
}

/// Returns the trimmed content, rejecting absent or whitespace-only input.
///
/// # Errors
///
/// Returns [`ServiceError::InvalidRequest`] on absent or blank content.
pub fn validate_content(content: Option<&str>) -> Result<&str, ServiceError> {
    content
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(ServiceError::InvalidRequest(CONTENT_REQUIRED))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::task::JoinSet;

    use super::*;
    use crate::persistence::{InMemoryMessageStore, MessageStore};

    /// A store whose every call fails the way an unreachable server does.
    #[derive(Debug)]
    struct FailingStore;

    #[async_trait]
    impl MessageStore for FailingStore {
        async fn probe(&self) -> Result<Vec<ProbeRow>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn list_recent(&self, _limit: u32) -> Result<Vec<Message>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn insert(&self, _content: &str) -> Result<i64, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn find(&self, _id: i64) -> Result<Option<Message>, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
        async fn delete(&self, _id: i64) -> Result<u64, StoreError> {
            Err(sqlx::Error::PoolTimedOut.into())
        }
    }

    /// Accepts inserts but loses the row before it can be read back.
    #[derive(Debug)]
    struct VanishingStore;

    #[async_trait]
    impl MessageStore for VanishingStore {
        async fn probe(&self) -> Result<Vec<ProbeRow>, StoreError> {
            Ok(vec![ProbeRow { test: 1 }])
        }
        async fn list_recent(&self, _limit: u32) -> Result<Vec<Message>, StoreError> {
            Ok(Vec::new())
        }
        async fn insert(&self, _content: &str) -> Result<i64, StoreError> {
            Ok(42)
        }
        async fn find(&self, _id: i64) -> Result<Option<Message>, StoreError> {
            Ok(None)
        }
        async fn delete(&self, _id: i64) -> Result<u64, StoreError> {
            Ok(0)
        }
    }

    fn ready_service() -> MessageService {
        MessageService::new(StoreState::Ready(Arc::new(InMemoryMessageStore::new())))
    }

    #[test]
    fn validate_content_trims_and_rejects_blank() {
        assert!(matches!(validate_content(Some("  hi  ")), Ok("hi")));
        assert!(validate_content(Some("")).is_err());
        assert!(validate_content(Some(" \t\n ")).is_err());
        assert!(validate_content(None).is_err());
    }

    #[tokio::test]
    async fn create_returns_stored_row_with_trimmed_content() {
        let service = ready_service();
        let Ok(message) = service.create(Some("  hello world ")).await else {
            panic!("create failed");
        };
        assert_eq!(message.content, "hello world");
        assert_eq!(message.id, 1);

        let Ok(list) = service.list_recent().await else {
            panic!("list failed");
        };
        assert_eq!(list[0], message);
    }

    #[tokio::test]
    async fn blank_content_is_rejected_before_readiness() {
        let service = MessageService::new(StoreState::Unconfigured);
        let Err(err) = service.create(Some("   ")).await else {
            panic!("blank content must be rejected");
        };
        assert!(matches!(err, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn blank_content_creates_no_row() {
        let service = ready_service();
        let _ = service.create(Some("")).await;
        let _ = service.create(Some("   ")).await;
        let Ok(list) = service.list_recent().await else {
            panic!("list failed");
        };
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_store_is_unavailable() {
        let service = MessageService::new(StoreState::Unconfigured);
        assert!(!service.health().connected);
        assert!(matches!(
            service.probe().await,
            Err(ServiceError::Unavailable(NOT_CONFIGURED))
        ));
        assert!(matches!(
            service.list_recent().await,
            Err(ServiceError::Unavailable(NOT_AVAILABLE))
        ));
        assert!(matches!(
            service.create(Some("hi")).await,
            Err(ServiceError::Unavailable(_))
        ));
        assert!(matches!(
            service.delete("1").await,
            Err(ServiceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn degraded_store_can_be_probed_but_not_used() {
        let service =
            MessageService::new(StoreState::Degraded(Arc::new(InMemoryMessageStore::new())));
        let Ok(rows) = service.probe().await else {
            panic!("probe should reach the handle");
        };
        assert_eq!(rows, vec![ProbeRow { test: 1 }]);
        assert!(matches!(
            service.list_recent().await,
            Err(ServiceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn store_failures_carry_operation_context() {
        let service = MessageService::new(StoreState::Ready(Arc::new(FailingStore)));

        let Err(err) = service.list_recent().await else {
            panic!("list must fail");
        };
        assert!(err.to_string().starts_with("Failed to fetch messages: "));

        let Err(err) = service.create(Some("hi")).await else {
            panic!("create must fail");
        };
        assert!(err.to_string().starts_with("Failed to save message: "));

        let Err(err) = service.delete("3").await else {
            panic!("delete must fail");
        };
        assert!(err.to_string().starts_with("Failed to delete message: "));

        let Err(err) = service.probe().await else {
            panic!("probe must fail");
        };
        assert!(err.to_string().starts_with("Database connection failed: "));
    }

    #[tokio::test]
    async fn missing_row_after_insert_is_a_store_error() {
        let service = MessageService::new(StoreState::Ready(Arc::new(VanishingStore)));
        let Err(err) = service.create(Some("hi")).await else {
            panic!("create must fail when the row cannot be read back");
        };
        assert!(matches!(
            err,
            ServiceError::Store {
                source: StoreError::MissingAfterInsert(42),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn delete_removes_row_and_ignores_missing_ids() {
        let service = ready_service();
        let Ok(message) = service.create(Some("bye")).await else {
            panic!("create failed");
        };

        assert!(service.delete(&message.id.to_string()).await.is_ok());
        assert!(service.delete("9999").await.is_ok());

        let Ok(list) = service.list_recent().await else {
            panic!("list failed");
        };
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn delete_rejects_non_integer_ids() {
        let service = ready_service();
        assert!(matches!(
            service.delete("abc").await,
            Err(ServiceError::InvalidRequest(INVALID_ID))
        ));
    }

    #[tokio::test]
    async fn listing_is_capped_and_newest_first() {
        let service = ready_service();
        for i in 0..60 {
            let content = format!("message {i}");
            let _ = service.create(Some(content.as_str())).await;
        }

        let Ok(list) = service.list_recent().await else {
            panic!("list failed");
        };
        assert_eq!(list.len(), 50);
        assert_eq!(list[0].content, "message 59");
        assert!(
            list.windows(2)
                .all(|w| w[0].created_at >= w[1].created_at && w[0].id > w[1].id)
        );
    }

    #[tokio::test]
    async fn concurrent_creates_get_unique_ids() {
        let service = ready_service();
        let mut tasks = JoinSet::new();
        for i in 0..20 {
            let service = service.clone();
            let content = format!("c{i}");
            tasks.spawn(async move { service.create(Some(content.as_str())).await });
        }

        let mut ids = HashSet::new();
        while let Some(joined) = tasks.join_next().await {
            let Ok(Ok(message)) = joined else {
                panic!("concurrent create failed");
            };
            assert!(ids.insert(message.id), "duplicate id {}", message.id);
        }
        assert_eq!(ids.len(), 20);

        let Ok(list) = service.list_recent().await else {
            panic!("list failed");
        };
        assert_eq!(list.len(), 20);
    }
}
