//! In-memory implementations of the store traits
//!
//! Used by tests and by deployments that do not need persistence.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{DbError, DbResult};
use crate::models::{Credential, CredentialUpdate, NewCredential};
use crate::store::{CredentialStore, RevocationCache};

#[derive(Default)]
struct Users {
    next_id: i64,
    by_id: HashMap<i64, Credential>,
}

impl Users {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.by_id
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.by_id
            .values()
            .any(|u| Some(u.id) != except && u.username.as_deref() == Some(username))
    }
}

/// In-memory credential store
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Users>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn save_user(&self, user: NewCredential) -> DbResult<i64> {
        let mut users = self.users.write();

        if users.email_taken(&user.email, None) {
            return Err(DbError::Duplicate(format!("User '{}' already exists", user.email)));
        }
        if let Some(ref username) = user.username
            && users.username_taken(username, None)
        {
            return Err(DbError::Duplicate(format!("User '{}' already exists", username)));
        }

        users.next_id += 1;
        let id = users.next_id;
        let now = Utc::now();
        users.by_id.insert(
            id,
            Credential {
                id,
                email: user.email,
                username: user.username,
                password_hash: user.password_hash,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Credential>> {
        Ok(self.users.read().by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<Credential>> {
        Ok(self
            .users
            .read()
            .by_id
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<Credential>> {
        Ok(self
            .users
            .read()
            .by_id
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn update_user(
        &self,
        id: i64,
        update: CredentialUpdate,
    ) -> DbResult<Option<Credential>> {
        let mut users = self.users.write();

        if !users.by_id.contains_key(&id) {
            return Ok(None);
        }
        if let Some(ref email) = update.email
            && users.email_taken(email, Some(id))
        {
            return Err(DbError::Duplicate(format!("User '{}' already exists", email)));
        }
        if let Some(ref username) = update.username
            && users.username_taken(username, Some(id))
        {
            return Err(DbError::Duplicate(format!("User '{}' already exists", username)));
        }

        let Some(user) = users.by_id.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(username) = update.username {
            user.username = Some(username);
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }
}

/// In-memory revocation cache
///
/// Deadlines use [`tokio::time::Instant`], so paused-clock tests can
/// advance past them deterministically.
#[derive(Default)]
pub struct MemoryRevocationCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl MemoryRevocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including expired ones not yet purged
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .filter(|(_, deadline)| *deadline > now)
            .map(|(value, _)| value.clone())
    }
}

#[async_trait]
impl RevocationCache for MemoryRevocationCache {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()> {
        if ttl.is_zero() {
            return Err(DbError::InvalidArgument(
                "revocation entries require a positive TTL".to_string(),
            ));
        }
        let deadline = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| DbError::InvalidArgument("TTL out of range".to_string()))?;
        self.entries
            .write()
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }

    async fn exists(&self, key: &str) -> DbResult<bool> {
        Ok(self.live_value(key).is_some())
    }

    async fn get(&self, key: &str) -> DbResult<String> {
        self.live_value(key)
            .ok_or_else(|| DbError::NotFound(format!("revocation entry '{}'", key)))
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, (_, deadline)| *deadline > now);
        Ok((before - entries.len()) as u64)
    }
}
