//! Domain models for TelAPI
//!
//! This module contains the core domain models used throughout the application.

pub mod phone_call;

pub use phone_call::{CallState, PhoneCall, API_VERSION};
