//! Capability traits consumed by the authentication core

use async_trait::async_trait;
use std::time::Duration;

use crate::error::DbResult;
use crate::models::{Credential, CredentialUpdate, NewCredential};

/// Persistent store of user credentials.
///
/// Implementations report uniqueness violations (email or username) as
/// [`DbError::Duplicate`](crate::DbError::Duplicate). Every method is a
/// single atomic operation, so dropping the returned future never leaves
/// a partial write behind.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new credential and return its id
    async fn save_user(&self, user: NewCredential) -> DbResult<i64>;

    /// Get a credential by ID
    async fn find_by_id(&self, id: i64) -> DbResult<Option<Credential>>;

    /// Get a credential by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> DbResult<Option<Credential>>;

    /// Get a credential by username
    async fn find_by_username(&self, username: &str) -> DbResult<Option<Credential>>;

    /// Apply a partial update, returning the updated record or `None`
    /// when no credential has this id
    async fn update_user(&self, id: i64, update: CredentialUpdate)
    -> DbResult<Option<Credential>>;
}

/// TTL-bounded key/value store backing token revocation.
///
/// Entries are invisible to `exists`/`get` once their TTL has elapsed.
/// A zero TTL is rejected with
/// [`DbError::InvalidArgument`](crate::DbError::InvalidArgument): the cache
/// never holds an entry without a deadline.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Store `value` under `key` for `ttl`, replacing any previous entry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()>;

    /// Check whether a live entry exists for `key`
    async fn exists(&self, key: &str) -> DbResult<bool>;

    /// Get the value of a live entry, or [`DbError::NotFound`](crate::DbError::NotFound)
    async fn get(&self, key: &str) -> DbResult<String>;

    /// Drop expired entries, returning how many were removed
    async fn purge_expired(&self) -> DbResult<u64>;
}
