//! Password hashing with argon2id

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use std::sync::Arc;

use crate::error::AuthError;

/// Memory cost in KiB
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;
/// Number of passes
pub const DEFAULT_ITERATIONS: u32 = 2;
/// Degree of parallelism
pub const DEFAULT_PARALLELISM: u32 = 1;

const DUMMY_PASSWORD: &str = "quizauth-timing-equalizer";

/// One-way password hasher with a fixed cost.
///
/// A mismatch is always reported as `Ok(false)`; only a stored hash that
/// cannot be parsed produces an error.
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Create a hasher with the production cost
    pub fn new() -> Result<Self, AuthError> {
        Self::with_params(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, DEFAULT_PARALLELISM)
    }

    /// Create a hasher with an explicit argon2 cost
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, AuthError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        let dummy_hash = hash_with(&params, DUMMY_PASSWORD)?;
        Ok(Self {
            params,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a plaintext password into a PHC string
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_with(&self.params, password)
    }

    /// Verify a plaintext password against a PHC string
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::PasswordHash(e.to_string()))?;

        // Params come from the PHC string, not from self
        match argon2(&self.params).verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::PasswordHash(e.to_string())),
        }
    }

    /// Spend the cost of one verification without a real credential.
    ///
    /// Always returns `false`.
    pub fn verify_dummy(&self, password: &str) -> Result<bool, AuthError> {
        self.verify(password, &self.dummy_hash).map(|_| false)
    }

    /// [`hash`](Self::hash) on the blocking thread pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool; `hash: None`
    /// runs [`verify_dummy`](Self::verify_dummy)
    pub async fn verify_blocking(
        &self,
        password: String,
        hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || match hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => hasher.verify_dummy(&password),
        })
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?
    }
}

fn argon2(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2(params)
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}
