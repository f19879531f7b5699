//! TelAPI Database Layer
//!
//! This crate provides PostgreSQL database access and repository
//! implementations for the TelAPI system. It includes:
//!
//! - Connection pool management with sqlx
//! - The phone call repository with conditional state transitions
//! - Staleness queries used by the expiry workflows

pub mod pool;
pub mod repositories;

pub use pool::create_pool;
pub use repositories::*;

// Re-export commonly used types
pub use sqlx::PgPool;
pub use telapi_core::{AppError, AppResult};
