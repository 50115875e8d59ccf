//! REST endpoint handlers organized by resource.

pub mod message;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().merge(message::routes())
}
