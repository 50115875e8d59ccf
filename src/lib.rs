//! # msgboard
//!
//! Backend for a small message board: health check, database probe and
//! message create/list/delete over MySQL, plus the built single-page
//! client served for every other `GET`.
//!
//! The database is optional at runtime. Startup tries once to bring up the
//! pool; if that fails the service still starts and store-backed
//! endpoints answer `503` until the next restart.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── MessageService (service/)
//!     ├── StoreState (readiness)
//!     │
//!     ├── MessageStore (persistence/)
//!     │
//!     └── MySQL pool (persistence::pool)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod error;
pub mod persistence;
pub mod readiness;
pub mod service;
