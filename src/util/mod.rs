//! Shared helpers for session persistence and token handling.

pub mod storage;
pub mod token;
