//! REST API access: shared transport, typed services, and wire DTOs.

pub mod api;
pub mod auth;
pub mod property;
pub mod types;
