//! TelAPI HTTP layer
//!
//! Exposes phone call resources through the provider-compatible 2010-04-01
//! REST contract. The response DTOs in `dto` are the only serialization path
//! for call records: internal surrogate ids and audit timestamps are
//! structurally absent from every response.

pub mod dto;
pub mod handlers;
