//! TelAPI Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the TelAPI call-management backend. It includes:
//!
//! - Domain models (PhoneCall, CallState)
//! - Common traits for repositories, job queues, and workflows
//! - Unified error handling with HTTP response mapping
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
