//! Core use-case services.
//!
//! # Responsibility
//! - Own the command engine behind a thread-safe entry point.
//! - Bridge committed store changes to snapshot persistence.

pub mod logic_service;
pub mod storage_service;
