//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::SettingsPresence;
use crate::service::MessageService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor. Immutable after startup.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Message service for all store-backed logic.
    pub message_service: Arc<MessageService>,
    /// Which database settings were supplied, for `GET /health`.
    pub settings: SettingsPresence,
}

impl AppState {
    /// Bundles the service with the configuration report.
    #[must_use]
    pub fn new(message_service: MessageService, settings: SettingsPresence) -> Self {
        Self {
            message_service: Arc::new(message_service),
            settings,
        }
    }
}
