//! Persistence layer: MySQL pool lifecycle and message storage.
//!
//! [`MessageStore`] is the seam between the service and the database. The
//! production implementation wraps a `sqlx::MySqlPool`; the in-memory one
//! backs the test suites.

pub mod memory;
pub mod models;
pub mod mysql;
pub mod pool;
pub mod schema;

use async_trait::async_trait;

use crate::error::StoreError;
use models::{Message, ProbeRow};

pub use memory::InMemoryMessageStore;
pub use mysql::MySqlMessageStore;

/// Message storage operations. Every call round-trips to the backing
/// store; implementations hold no cache.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Runs the trivial connectivity query.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be reached.
    async fn probe(&self) -> Result<Vec<ProbeRow>, StoreError>;

    /// Returns up to `limit` messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on query failure.
    async fn list_recent(&self, limit: u32) -> Result<Vec<Message>, StoreError>;

    /// Inserts `content` and returns the id the store assigned.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on query failure.
    async fn insert(&self, content: &str) -> Result<i64, StoreError>;

    /// Point read by id.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on query failure.
    async fn find(&self, id: i64) -> Result<Option<Message>, StoreError>;

    /// Deletes the row with `id`, returning how many rows were removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on query failure.
    async fn delete(&self, id: i64) -> Result<u64, StoreError>;
}
