//! Authentication service

use chrono::{Duration, Utc};
use quizauth_db::{CredentialStore, CredentialUpdate, DbError, DbResult, NewCredential};
use std::future::Future;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::AuthError;
use crate::identity::{AuthenticatedIdentity, LoginOutcome, UserProfile, UserUpdate};
use crate::jwt::{Claims, TokenCodec, extract_bearer_token};
use crate::password::PasswordHasher;
use crate::revocation::Revocations;
use crate::validation::{self, MAX_PASSWORD_LENGTH};

/// Service tunables
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of issued tokens
    pub token_ttl: Duration,
    /// Upper bound on every credential store call
    pub store_timeout: std::time::Duration,
    /// Reject registrations without a username
    pub require_username: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl: Duration::minutes(15),
            store_timeout: std::time::Duration::from_secs(2),
            require_username: true,
        }
    }
}

/// Registration, login, token validation and logout.
///
/// Holds no mutable state of its own; everything shared lives behind the
/// credential store and the revocation cache.
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    revocations: Revocations,
    codec: TokenCodec,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        revocations: Revocations,
        codec: TokenCodec,
        hasher: PasswordHasher,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            revocations,
            codec,
            hasher,
            config,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn revocations(&self) -> &Revocations {
        &self.revocations
    }

    /// Run a store call under the configured timeout
    async fn store<T>(&self, op: impl Future<Output = DbResult<T>>) -> Result<T, AuthError> {
        match timeout(self.config.store_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(DbError::Duplicate(msg))) => Err(AuthError::AlreadyExists(msg)),
            Ok(Err(e)) => {
                error!("Credential store error: {}", e);
                Err(AuthError::StoreUnavailable(e.to_string()))
            }
            Err(_) => {
                error!(
                    "Credential store call timed out after {:?}",
                    self.config.store_timeout
                );
                Err(AuthError::StoreUnavailable("timed out".to_string()))
            }
        }
    }

    fn check_username(&self, username: Option<&str>) -> Result<Option<String>, AuthError> {
        match username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(username) => {
                validation::validate_username(username)?;
                Ok(Some(username.to_string()))
            }
            None if self.config.require_username => Err(AuthError::InvalidInput(
                "username is required".to_string(),
            )),
            None => Ok(None),
        }
    }

    /// Create an account and return its id
    pub async fn register(
        &self,
        email: &str,
        username: Option<&str>,
        password: &str,
    ) -> Result<i64, AuthError> {
        let email = validation::normalize_email(email)?;
        let username = self.check_username(username)?;
        validation::validate_password(password)?;

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;
        let id = self
            .store(self.users.save_user(NewCredential {
                email,
                username,
                password_hash,
            }))
            .await?;

        info!("Registered user {}", id);
        Ok(id)
    }

    /// Check a password and issue a token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_LENGTH
            )));
        }

        let credential = self.store(self.users.find_by_email(&email)).await?;
        // Unknown accounts still pay for one verification
        let stored_hash = credential.as_ref().map(|c| c.password_hash.clone());
        let matched = self
            .hasher
            .verify_blocking(password.to_string(), stored_hash)
            .await?;

        let credential = match credential {
            Some(credential) if matched => credential,
            _ => {
                warn!("Failed login attempt for {}", email);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let claims = Claims::new(credential.id, &credential.email, Utc::now(), self.config.token_ttl)?;
        let token = self.codec.sign(&claims)?;

        info!("User {} logged in", credential.id);
        Ok(LoginOutcome {
            token,
            expires_at: claims.expires_at(),
            user: UserProfile::from(&credential),
        })
    }

    /// Validate an `authorization` value of the form `Bearer <token>`
    pub async fn validate_token(
        &self,
        bearer_header: &str,
    ) -> Result<AuthenticatedIdentity, AuthError> {
        let token = extract_bearer_token(bearer_header)?;
        self.validate_raw_token(token).await
    }

    /// Validate a bare token
    pub async fn validate_raw_token(&self, token: &str) -> Result<AuthenticatedIdentity, AuthError> {
        let token = token.trim();

        if self.revocations.is_revoked(token).await? {
            warn!("Rejected revoked token");
            return Err(AuthError::TokenRevoked);
        }

        let claims = self.codec.parse(token).map_err(|e| {
            warn!("Rejected token: {}", e);
            AuthError::Token(e)
        })?;

        if claims.is_expired_at(Utc::now()) {
            warn!("Rejected expired token for user {}", claims.user_id);
            return Err(AuthError::TokenExpired);
        }

        let credential = self
            .store(self.users.find_by_id(claims.user_id))
            .await?
            .ok_or_else(|| {
                warn!("Rejected token for missing user {}", claims.user_id);
                AuthError::UnknownSubject
            })?;

        if !credential.email.eq_ignore_ascii_case(&claims.email) {
            warn!("Rejected token with stale email for user {}", credential.id);
            return Err(AuthError::IdentityMismatch);
        }

        debug!("Validated token for user {}", credential.id);
        Ok(AuthenticatedIdentity::from(&credential))
    }

    /// Revoke a token for the rest of its lifetime.
    ///
    /// An already expired token needs no entry; repeated logout succeeds.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        let token = token.trim();
        let claims = self.codec.parse(token)?;

        let remaining = claims.remaining_at(Utc::now());
        match remaining.to_std() {
            Ok(remaining) if !remaining.is_zero() => {
                self.revocations.revoke(token, remaining).await?;
                info!("User {} logged out", claims.user_id);
            }
            _ => debug!("Logout of expired token for user {}", claims.user_id),
        }
        Ok(())
    }

    /// Change the caller's own profile.
    ///
    /// A changed email invalidates every token issued before the change.
    pub async fn update_user(
        &self,
        identity: &AuthenticatedIdentity,
        update: UserUpdate,
    ) -> Result<UserProfile, AuthError> {
        let email = update
            .email
            .as_deref()
            .map(validation::normalize_email)
            .transpose()?;

        let username = match update.username.as_deref().map(str::trim) {
            Some(username) => {
                validation::validate_username(username)?;
                Some(username.to_string())
            }
            None => None,
        };

        let password_hash = match update.password {
            Some(password) => {
                validation::validate_password(&password)?;
                Some(self.hasher.hash_blocking(password).await?)
            }
            None => None,
        };

        let change = CredentialUpdate {
            email,
            username,
            password_hash,
        };
        let credential = self
            .store(self.users.update_user(identity.user_id, change))
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("user {}", identity.user_id)))?;

        info!("Updated user {}", credential.id);
        Ok(UserProfile::from(&credential))
    }

    pub async fn get_user_by_id(&self, id: i64) -> Result<UserProfile, AuthError> {
        self.store(self.users.find_by_id(id))
            .await?
            .map(|c| UserProfile::from(&c))
            .ok_or_else(|| AuthError::NotFound(format!("user {}", id)))
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<UserProfile, AuthError> {
        self.store(self.users.find_by_username(username.trim()))
            .await?
            .map(|c| UserProfile::from(&c))
            .ok_or_else(|| AuthError::NotFound(format!("user '{}'", username.trim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCode, TokenError};
    use async_trait::async_trait;
    use quizauth_db::{
        Credential, MemoryCredentialStore, MemoryRevocationCache, RevocationCache,
    };

    const SECRET: &str = "service-test-secret";

    fn revocations(cache: Arc<dyn RevocationCache>) -> Revocations {
        Revocations::new(cache, std::time::Duration::from_secs(1))
    }

    fn service_with(
        users: Arc<dyn CredentialStore>,
        cache: Arc<dyn RevocationCache>,
        config: AuthConfig,
    ) -> AuthService {
        AuthService::new(
            users,
            revocations(cache),
            TokenCodec::new(SECRET),
            PasswordHasher::with_params(64, 1, 1).unwrap(),
            config,
        )
    }

    fn service() -> AuthService {
        service_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryRevocationCache::new()),
            AuthConfig::default(),
        )
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    struct BrokenStore;

    #[async_trait]
    impl CredentialStore for BrokenStore {
        async fn save_user(&self, _: NewCredential) -> DbResult<i64> {
            Err(DbError::Unavailable("disk gone".to_string()))
        }
        async fn find_by_id(&self, _: i64) -> DbResult<Option<Credential>> {
            Err(DbError::Unavailable("disk gone".to_string()))
        }
        async fn find_by_email(&self, _: &str) -> DbResult<Option<Credential>> {
            Err(DbError::Unavailable("disk gone".to_string()))
        }
        async fn find_by_username(&self, _: &str) -> DbResult<Option<Credential>> {
            Err(DbError::Unavailable("disk gone".to_string()))
        }
        async fn update_user(&self, _: i64, _: CredentialUpdate) -> DbResult<Option<Credential>> {
            Err(DbError::Unavailable("disk gone".to_string()))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn save_user(&self, _: NewCredential) -> DbResult<i64> {
            std::future::pending().await
        }
        async fn find_by_id(&self, _: i64) -> DbResult<Option<Credential>> {
            std::future::pending().await
        }
        async fn find_by_email(&self, _: &str) -> DbResult<Option<Credential>> {
            std::future::pending().await
        }
        async fn find_by_username(&self, _: &str) -> DbResult<Option<Credential>> {
            std::future::pending().await
        }
        async fn update_user(&self, _: i64, _: CredentialUpdate) -> DbResult<Option<Credential>> {
            std::future::pending().await
        }
    }

    struct BrokenCache;

    #[async_trait]
    impl RevocationCache for BrokenCache {
        async fn set(&self, _: &str, _: &str, _: std::time::Duration) -> DbResult<()> {
            Err(DbError::Unavailable("refused".to_string()))
        }
        async fn exists(&self, _: &str) -> DbResult<bool> {
            Err(DbError::Unavailable("refused".to_string()))
        }
        async fn get(&self, _: &str) -> DbResult<String> {
            Err(DbError::Unavailable("refused".to_string()))
        }
        async fn purge_expired(&self) -> DbResult<u64> {
            Err(DbError::Unavailable("refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_register_login_validate_logout() {
        let service = service();

        let id = service
            .register("a@b.com", Some("alice"), "pw123456")
            .await
            .unwrap();
        let outcome = service.login("a@b.com", "pw123456").await.unwrap();
        assert_eq!(outcome.user.id, id);
        assert_eq!(outcome.user.username.as_deref(), Some("alice"));
        assert!(outcome.expires_at > Utc::now());

        let identity = service.validate_token(&bearer(&outcome.token)).await.unwrap();
        assert_eq!(identity.user_id, id);
        assert_eq!(identity.email, "a@b.com");

        service.logout(&outcome.token).await.unwrap();
        assert!(matches!(
            service.validate_token(&bearer(&outcome.token)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));

        // A fresh login is unaffected by the earlier logout
        let again = service.login("a@b.com", "pw123456").await.unwrap();
        assert_eq!(
            service.validate_token(&bearer(&again.token)).await.unwrap().user_id,
            id
        );
    }

    #[tokio::test]
    async fn test_concurrent_sessions_are_independent() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        let phone = service.login("a@b.com", "pw123456").await.unwrap();
        let laptop = service.login("a@b.com", "pw123456").await.unwrap();
        assert_ne!(phone.token, laptop.token);

        service.logout(&phone.token).await.unwrap();
        assert!(matches!(
            service.validate_token(&bearer(&phone.token)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));
        assert!(service.validate_token(&bearer(&laptop.token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_oversized_ttl_fails_login_internally() {
        let service = service_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryRevocationCache::new()),
            AuthConfig {
                token_ttl: Duration::seconds(10_000_000_000_000),
                ..Default::default()
            },
        );
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        let err = service.login("a@b.com", "pw123456").await.unwrap_err();
        assert!(matches!(err, AuthError::Token(TokenError::InvalidLifetime)));
        assert_eq!(err.code(), ErrorCode::Internal);
    }

    #[tokio::test]
    async fn test_sqlite_backed_flow() {
        let db = Arc::new(quizauth_db::Database::in_memory().await.unwrap());
        let service = service_with(db.clone(), db, AuthConfig::default());

        let id = service
            .register("a@b.com", Some("alice"), "pw123456")
            .await
            .unwrap();
        let outcome = service.login("A@B.com", "pw123456").await.unwrap();
        assert_eq!(
            service.validate_token(&bearer(&outcome.token)).await.unwrap().user_id,
            id
        );

        service.logout(&outcome.token).await.unwrap();
        assert!(matches!(
            service.validate_token(&bearer(&outcome.token)).await.unwrap_err(),
            AuthError::TokenRevoked
        ));
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = service();
        service
            .register("  Alice@Example.COM ", Some("alice"), "pw123456")
            .await
            .unwrap();

        let outcome = service.login("ALICE@example.com", "pw123456").await.unwrap();
        assert_eq!(outcome.user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = service();

        let cases = [
            ("not-an-email", Some("alice"), "pw123456"),
            ("a@b.com", Some("alice"), "short"),
            ("a@b.com", Some("bad name"), "pw123456"),
            ("a@b.com", None, "pw123456"),
            ("a@b.com", Some("   "), "pw123456"),
        ];
        for (email, username, password) in cases {
            let err = service.register(email, username, password).await.unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidInput, "{:?}", (email, username));
        }
    }

    #[tokio::test]
    async fn test_username_optional_when_configured() {
        let service = service_with(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryRevocationCache::new()),
            AuthConfig {
                require_username: false,
                ..Default::default()
            },
        );

        service.register("a@b.com", None, "pw123456").await.unwrap();
        service.register("c@d.com", Some(""), "pw123456").await.unwrap();
        let outcome = service.login("c@d.com", "pw123456").await.unwrap();
        assert!(outcome.user.username.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        let by_email = service
            .register("A@B.com", Some("other"), "pw123456")
            .await
            .unwrap_err();
        assert!(matches!(by_email, AuthError::AlreadyExists(_)));

        let by_username = service
            .register("c@d.com", Some("alice"), "pw123456")
            .await
            .unwrap_err();
        assert_eq!(by_username.code(), ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        let wrong_password = service.login("a@b.com", "wrongpw1").await.unwrap_err();
        let unknown_user = service.login("x@y.com", "pw123456").await.unwrap_err();
        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());

        assert_eq!(
            service.login("", "pw123456").await.unwrap_err().code(),
            ErrorCode::InvalidInput
        );
        assert_eq!(
            service.login("a@b.com", "").await.unwrap_err().code(),
            ErrorCode::InvalidInput
        );
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_headers() {
        let service = service();
        assert!(matches!(
            service.validate_token("").await.unwrap_err(),
            AuthError::MissingAuthHeader
        ));
        assert!(matches!(
            service.validate_token("Token abc").await.unwrap_err(),
            AuthError::InvalidAuthHeader
        ));
        assert!(matches!(
            service.validate_token("Bearer not.a.jwt").await.unwrap_err(),
            AuthError::Token(TokenError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_expired_token() {
        let service = service();
        let id = service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        let token = service
            .codec()
            .issue_at(id, "a@b.com", Utc::now() - Duration::hours(2), Duration::hours(1))
            .unwrap();
        assert!(matches!(
            service.validate_token(&bearer(&token)).await.unwrap_err(),
            AuthError::TokenExpired
        ));

        // Logging out an expired token is a no-op
        service.logout(&token).await.unwrap();
        assert!(!service.revocations().is_revoked(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();
        let outcome = service.login("a@b.com", "pw123456").await.unwrap();

        service.logout(&outcome.token).await.unwrap();
        service.logout(&outcome.token).await.unwrap();
        assert!(service.revocations().is_revoked(&outcome.token).await.unwrap());
    }

    #[tokio::test]
    async fn test_logout_rejects_garbage() {
        let service = service();
        assert!(matches!(
            service.logout("garbage").await.unwrap_err(),
            AuthError::Token(_)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_is_checked_before_parsing() {
        let cache = Arc::new(MemoryRevocationCache::new());
        let service = service_with(
            Arc::new(MemoryCredentialStore::new()),
            cache.clone(),
            AuthConfig::default(),
        );

        service
            .revocations()
            .revoke("garbage", std::time::Duration::from_secs(60))
            .await
            .unwrap();
        assert!(matches!(
            service.validate_token("Bearer garbage").await.unwrap_err(),
            AuthError::TokenRevoked
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let service = service();
        let token = service.codec().issue(42, "ghost@b.com", Duration::hours(1)).unwrap();
        assert!(matches!(
            service.validate_token(&bearer(&token)).await.unwrap_err(),
            AuthError::UnknownSubject
        ));
    }

    #[tokio::test]
    async fn test_email_change_invalidates_tokens() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();
        let outcome = service.login("a@b.com", "pw123456").await.unwrap();
        let identity = service.validate_token(&bearer(&outcome.token)).await.unwrap();

        let profile = service
            .update_user(
                &identity,
                UserUpdate {
                    email: Some("New@B.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.email, "new@b.com");
        assert_eq!(profile.username.as_deref(), Some("alice"));

        assert!(matches!(
            service.validate_token(&bearer(&outcome.token)).await.unwrap_err(),
            AuthError::IdentityMismatch
        ));

        let fresh = service.login("new@b.com", "pw123456").await.unwrap();
        assert!(service.validate_token(&bearer(&fresh.token)).await.is_ok());
        assert!(matches!(
            service.login("a@b.com", "pw123456").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_update_password_and_username() {
        let service = service();
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();
        service.register("c@d.com", Some("carol"), "pw123456").await.unwrap();
        let outcome = service.login("a@b.com", "pw123456").await.unwrap();
        let identity = service.validate_token(&bearer(&outcome.token)).await.unwrap();

        let profile = service
            .update_user(
                &identity,
                UserUpdate {
                    username: Some("alice2".to_string()),
                    password: Some("newpass99".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.username.as_deref(), Some("alice2"));
        assert!(service.login("a@b.com", "newpass99").await.is_ok());
        assert!(service.login("a@b.com", "pw123456").await.is_err());

        // Password change alone keeps outstanding tokens valid
        assert!(service.validate_token(&bearer(&outcome.token)).await.is_ok());

        let taken = service
            .update_user(
                &identity,
                UserUpdate {
                    username: Some("carol".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(taken, AuthError::AlreadyExists(_)));

        let invalid = service
            .update_user(
                &identity,
                UserUpdate {
                    password: Some("short".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(invalid.code(), ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let service = service();
        let ghost = AuthenticatedIdentity {
            user_id: 99,
            email: "ghost@b.com".to_string(),
            username: None,
        };
        assert!(matches!(
            service.update_user(&ghost, UserUpdate::default()).await.unwrap_err(),
            AuthError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_user_lookups() {
        let service = service();
        let id = service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();

        assert_eq!(service.get_user_by_id(id).await.unwrap().email, "a@b.com");
        assert_eq!(service.get_user_by_username("alice").await.unwrap().id, id);
        assert!(matches!(
            service.get_user_by_id(id + 1).await.unwrap_err(),
            AuthError::NotFound(_)
        ));
        assert!(matches!(
            service.get_user_by_username("bob").await.unwrap_err(),
            AuthError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_store_failure_fails_closed() {
        let service = service_with(
            Arc::new(BrokenStore),
            Arc::new(MemoryRevocationCache::new()),
            AuthConfig::default(),
        );
        let token = service.codec().issue(1, "a@b.com", Duration::hours(1)).unwrap();

        let err = service.validate_token(&bearer(&token)).await.unwrap_err();
        assert!(matches!(err, AuthError::StoreUnavailable(_)));
        assert_eq!(err.code(), ErrorCode::Internal);

        assert!(matches!(
            service.login("a@b.com", "pw123456").await.unwrap_err(),
            AuthError::StoreUnavailable(_)
        ));
        assert!(matches!(
            service.register("a@b.com", Some("alice"), "pw123456").await.unwrap_err(),
            AuthError::StoreUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn test_cache_failure_fails_closed() {
        let users = Arc::new(MemoryCredentialStore::new());
        let service = service_with(users, Arc::new(BrokenCache), AuthConfig::default());
        service.register("a@b.com", Some("alice"), "pw123456").await.unwrap();
        let outcome = service.login("a@b.com", "pw123456").await.unwrap();

        assert!(matches!(
            service.validate_token(&bearer(&outcome.token)).await.unwrap_err(),
            AuthError::CacheUnavailable(_)
        ));
        assert!(matches!(
            service.logout(&outcome.token).await.unwrap_err(),
            AuthError::CacheUnavailable(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_store_times_out() {
        let service = service_with(
            Arc::new(StalledStore),
            Arc::new(MemoryRevocationCache::new()),
            AuthConfig {
                store_timeout: std::time::Duration::from_millis(100),
                ..Default::default()
            },
        );
        let token = service.codec().issue(1, "a@b.com", Duration::hours(1)).unwrap();

        assert!(matches!(
            service.validate_token(&bearer(&token)).await.unwrap_err(),
            AuthError::StoreUnavailable(_)
        ));
        assert!(matches!(
            service.get_user_by_id(1).await.unwrap_err(),
            AuthError::StoreUnavailable(_)
        ));
    }
}
