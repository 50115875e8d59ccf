//! In-process message store.
//!
//! Mirrors the MySQL table semantics (auto-increment ids, store-assigned
//! timestamps, newest-first listing) so the service and router can be
//! exercised without a database server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::MessageStore;
use super::models::{Message, ProbeRow};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, Message>,
}

/// Message store held in a `RwLock<BTreeMap<...>>`.
///
/// Ids start at 1 and are never reused, even after deletion.
#[derive(Debug, Default)]
pub struct InMemoryMessageStore {
    table: RwLock<Table>,
}

impl InMemoryMessageStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored messages.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Returns `true` if no messages are stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn probe(&self) -> Result<Vec<ProbeRow>, StoreError> {
        Ok(vec![ProbeRow { test: 1 }])
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Message>, StoreError> {
        let table = self.table.read().await;
        let mut rows: Vec<Message> = table.rows.values().cloned().collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(rows)
    }

    async fn insert(&self, content: &str) -> Result<i64, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;
        table.rows.insert(
            id,
            Message {
                id,
                content: content.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn find(&self, id: i64) -> Result<Option<Message>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let removed = self.table.write().await.rows.remove(&id);
        Ok(u64::from(removed.is_some()))
    }
}
