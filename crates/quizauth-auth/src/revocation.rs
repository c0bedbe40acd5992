//! Revocation cache adapter

use quizauth_db::RevocationCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::error::AuthError;

/// Namespace for blacklisted tokens inside the shared cache
pub const REVOCATION_KEY_PREFIX: &str = "jwt_blacklist:";

const REVOKED_MARKER: &str = "1";

/// Token blacklist on top of a shared [`RevocationCache`].
///
/// Every call is bounded by `timeout`; a timeout or backend error is
/// reported as [`AuthError::CacheUnavailable`] and never as "not revoked".
#[derive(Clone)]
pub struct Revocations {
    cache: Arc<dyn RevocationCache>,
    timeout: Duration,
}

impl Revocations {
    pub fn new(cache: Arc<dyn RevocationCache>, timeout: Duration) -> Self {
        Self { cache, timeout }
    }

    fn key(token: &str) -> String {
        format!("{}{}", REVOCATION_KEY_PREFIX, token)
    }

    /// Blacklist `token` for its `remaining` lifetime.
    ///
    /// A zero `remaining` means the token has already expired naturally;
    /// nothing is written.
    pub async fn revoke(&self, token: &str, remaining: Duration) -> Result<(), AuthError> {
        if remaining.is_zero() {
            debug!("Token already expired, skipping revocation entry");
            return Ok(());
        }

        match timeout(
            self.timeout,
            self.cache.set(&Self::key(token), REVOKED_MARKER, remaining),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                error!("Failed to write revocation entry: {}", e);
                Err(AuthError::CacheUnavailable(e.to_string()))
            }
            Err(_) => {
                error!("Revocation cache write timed out after {:?}", self.timeout);
                Err(AuthError::CacheUnavailable("timed out".to_string()))
            }
        }
    }

    /// Whether `token` has been revoked
    pub async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        match timeout(self.timeout, self.cache.exists(&Self::key(token))).await {
            Ok(Ok(revoked)) => Ok(revoked),
            Ok(Err(e)) => {
                error!("Failed to read revocation entry: {}", e);
                Err(AuthError::CacheUnavailable(e.to_string()))
            }
            Err(_) => {
                error!("Revocation cache read timed out after {:?}", self.timeout);
                Err(AuthError::CacheUnavailable("timed out".to_string()))
            }
        }
    }

    /// Drop expired entries from the backend
    pub async fn purge_expired(&self) -> Result<u64, AuthError> {
        match timeout(self.timeout, self.cache.purge_expired()).await {
            Ok(result) => result.map_err(|e| AuthError::CacheUnavailable(e.to_string())),
            Err(_) => Err(AuthError::CacheUnavailable("timed out".to_string())),
        }
    }
}

/// Spawn a background task that purges expired revocation entries every
/// `interval`
pub fn spawn_purge_task(revocations: Revocations, interval: Duration) -> JoinHandle<()> {
    info!("Starting revocation purge task (interval: {:?})", interval);

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match revocations.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!("Purged {} expired revocation entries", removed),
                Err(e) => error!("Revocation purge failed: {}", e),
            }
        }
    })
}
