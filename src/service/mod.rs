//! Service layer: business logic between the REST handlers and the store.

pub mod message_service;

pub use message_service::{HealthSnapshot, MessageService, RECENT_MESSAGES_LIMIT};
