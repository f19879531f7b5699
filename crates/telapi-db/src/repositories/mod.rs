//! Repository implementations
//!
//! PostgreSQL-backed implementations of the repository traits defined in
//! `telapi-core`.

pub mod phone_call_repo;

pub use phone_call_repo::PgPhoneCallRepository;
