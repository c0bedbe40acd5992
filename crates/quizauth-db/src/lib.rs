//! Quizauth Database Layer
//!
//! This crate provides the persistence capabilities the authentication
//! core depends on: a credential store and a TTL-bounded revocation cache.
//! Both are expressed as traits with a SQLite implementation (via sqlx)
//! and an in-memory implementation.

pub mod error;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use error::{DbError, DbResult};
pub use memory::{MemoryCredentialStore, MemoryRevocationCache};
pub use models::*;
pub use repository::Database;
pub use store::{CredentialStore, RevocationCache};
