//! Data Transfer Objects for REST request/response serialization.

pub mod common_dto;
pub mod message_dto;

pub use common_dto::*;
pub use message_dto::*;
