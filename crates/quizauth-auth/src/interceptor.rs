//! Per-call authorization

use axum::http::HeaderMap;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::error::AuthError;
use crate::identity::AuthenticatedIdentity;
use crate::service::AuthService;

/// Operations reachable without a token
pub const DEFAULT_PUBLIC_OPERATIONS: &[&str] = &["/api/v1/auth/login", "/api/v1/auth/register"];

const AUTHORIZATION_KEY: &str = "authorization";

/// Case-insensitive key/value metadata attached to an inbound call
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    entries: HashMap<String, String>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; keys are stored lowercased
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn authorization(&self) -> Option<&str> {
        self.get(AUTHORIZATION_KEY)
    }

    /// Build from HTTP headers; the first value of each header wins and
    /// non-UTF-8 values are skipped
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut metadata = Self::new();
        for (name, value) in headers {
            if metadata.entries.contains_key(name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                metadata.insert(name.as_str(), value);
            }
        }
        metadata
    }
}

/// Authorization outcome handed to the handler of one call
#[derive(Debug, Clone)]
pub struct CallScope {
    operation: String,
    identity: Option<AuthenticatedIdentity>,
}

impl CallScope {
    fn anonymous(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            identity: None,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The caller's identity; anonymous scopes yield
    /// [`AuthError::Unauthenticated`]
    pub fn identity(&self) -> Result<&AuthenticatedIdentity, AuthError> {
        self.identity.as_ref().ok_or(AuthError::Unauthenticated)
    }

    pub fn into_identity(self) -> Result<AuthenticatedIdentity, AuthError> {
        self.identity.ok_or(AuthError::Unauthenticated)
    }
}

/// Gate run in front of every inbound call
pub struct AuthInterceptor {
    service: Arc<AuthService>,
    public_operations: HashSet<String>,
}

impl AuthInterceptor {
    pub fn new<I, S>(service: Arc<AuthService>, public_operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            service,
            public_operations: public_operations.into_iter().map(Into::into).collect(),
        }
    }

    /// Interceptor whose allow-list is [`DEFAULT_PUBLIC_OPERATIONS`]
    pub fn with_default_public_operations(service: Arc<AuthService>) -> Self {
        Self::new(service, DEFAULT_PUBLIC_OPERATIONS.iter().copied())
    }

    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }

    pub fn is_public(&self, operation: &str) -> bool {
        self.public_operations.contains(operation)
    }

    /// Decide whether a call to `operation` may proceed.
    ///
    /// Token and credential failures are all reported as
    /// [`AuthError::Unauthenticated`]; the specific reason is only logged.
    /// Store and cache outages are passed through unchanged so they surface
    /// as internal errors, and the call is rejected either way.
    pub async fn authorize(
        &self,
        operation: &str,
        metadata: Option<&CallMetadata>,
    ) -> Result<CallScope, AuthError> {
        if self.is_public(operation) {
            debug!("Public operation {}", operation);
            return Ok(CallScope::anonymous(operation));
        }

        let Some(header) = metadata.and_then(CallMetadata::authorization) else {
            warn!("Rejected call to {}: no authorization metadata", operation);
            return Err(AuthError::Unauthenticated);
        };

        match self.service.validate_token(header).await {
            Ok(identity) => {
                debug!("Authorized user {} for {}", identity.user_id, operation);
                Ok(CallScope {
                    operation: operation.to_string(),
                    identity: Some(identity),
                })
            }
            Err(e) if e.is_unauthenticated() => {
                warn!("Rejected call to {}: {}", operation, e);
                Err(AuthError::Unauthenticated)
            }
            Err(e) => {
                error!("Could not authorize call to {}: {}", operation, e);
                Err(e)
            }
        }
    }

    /// Authorize, then run `handler` with the resulting scope
    pub async fn intercept<F, Fut, T>(
        &self,
        operation: &str,
        metadata: Option<&CallMetadata>,
        handler: F,
    ) -> Result<T, AuthError>
    where
        F: FnOnce(CallScope) -> Fut,
        Fut: Future<Output = Result<T, AuthError>>,
    {
        let scope = self.authorize(operation, metadata).await?;
        handler(scope).await
    }
}
