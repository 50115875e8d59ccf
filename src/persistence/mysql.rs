//! MySQL implementation of the message store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use super::MessageStore;
use super::models::{Message, ProbeRow};
use crate::error::StoreError;

type MessageRow = (i32, String, DateTime<Utc>);

/// MySQL-backed message store using `sqlx::MySqlPool`.
#[derive(Debug, Clone)]
pub struct MySqlMessageStore {
    pool: MySqlPool,
}

impl MySqlMessageStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn into_message((id, content, created_at): MessageRow) -> Message {
    Message {
        id: i64::from(id),
        content,
        created_at,
    }
}

#[async_trait]
impl MessageStore for MySqlMessageStore {
    async fn probe(&self) -> Result<Vec<ProbeRow>, StoreError> {
        let rows = sqlx::query_scalar::<_, i64>("SELECT 1 AS test")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|test| ProbeRow { test }).collect())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, created_at FROM messages \
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(into_message).collect())
    }

    async fn insert(&self, content: &str) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO messages (content) VALUES (?)")
            .bind(content)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_id();
        i64::try_from(id).map_err(|_| StoreError::IdOutOfRange(id))
    }

    async fn find(&self, id: i64) -> Result<Option<Message>, StoreError> {
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, created_at FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(into_message))
    }

    async fn delete(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::persistence::schema::ensure_schema;

    /// Connects to the server named by `DATABASE_URL` and bootstraps the
    /// table. Run with `cargo test -- --ignored`.
    async fn live_store() -> MySqlMessageStore {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            panic!("DATABASE_URL must point at a disposable MySQL database");
        };
        let Ok(pool) = MySqlPool::connect(&url).await else {
            panic!("MySQL should be reachable at DATABASE_URL");
        };
        let Ok(mut conn) = pool.acquire().await else {
            panic!("a connection should be available");
        };
        if ensure_schema(&mut conn).await.is_err() {
            panic!("schema bootstrap should succeed");
        }
        drop(conn);
        MySqlMessageStore::new(pool)
    }

    #[tokio::test]
    #[ignore = "needs a MySQL server at DATABASE_URL"]
    async fn round_trips_rows_against_mysql() {
        let store = live_store().await;

        let Ok(probe) = store.probe().await else {
            panic!("probe should succeed");
        };
        assert_eq!(probe, vec![ProbeRow { test: 1 }]);

        let marker = format!("msgboard-test-{}", Utc::now().timestamp_nanos_opt().unwrap_or(0));
        let (Ok(first), Ok(second)) = (
            store.insert(&format!("{marker}-a")).await,
            store.insert(&format!("{marker}-b")).await,
        ) else {
            panic!("inserts should succeed");
        };
        assert!(second > first);

        let Ok(Some(found)) = store.find(second).await else {
            panic!("inserted row should be readable");
        };
        assert_eq!(found.content, format!("{marker}-b"));
        assert!(Utc::now() - found.created_at < chrono::Duration::minutes(5));

        let Ok(recent) = store.list_recent(2).await else {
            panic!("listing should succeed");
        };
        assert!(recent.len() <= 2);
        assert_eq!(recent[0].id, second);

        for id in [first, second] {
            let Ok(removed) = store.delete(id).await else {
                panic!("delete should succeed");
            };
            assert_eq!(removed, 1);
        }
        let Ok(gone) = store.find(first).await else {
            panic!("point read should succeed");
        };
        assert!(gone.is_none());
        let Ok(removed) = store.delete(first).await else {
            panic!("repeat delete should succeed");
        };
        assert_eq!(removed, 0);
    }
}
