//! Shared types, errors, and configuration for Rentra.
//!
//! This crate provides common types used across all other crates:
//! - Currency support for decimal monetary values
//! - Pagination types for list endpoints
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
