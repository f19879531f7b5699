//! HTTP handlers for the call resource endpoints

pub mod phone_call;

pub use phone_call::configure_calls;
