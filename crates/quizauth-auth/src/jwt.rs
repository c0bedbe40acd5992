//! JWT token codec

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AuthError, TokenError};

/// The only algorithm this codec signs with or accepts
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Longest lifetime a token may be issued with or carry
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 366 * 24 * 60 * 60;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub user_id: i64,
    /// Email at the time of issue
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique per issue, so two tokens never share a revocation key
    pub jti: String,
}

impl Claims {
    /// Build a claim set valid for `ttl` from `issued_at`
    pub fn new(
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let lifetime = ttl.num_seconds().max(1);
        if ttl <= Duration::zero() || lifetime > MAX_TOKEN_LIFETIME_SECS {
            return Err(TokenError::InvalidLifetime);
        }

        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(lifetime)
            .filter(|exp| DateTime::from_timestamp(*exp, 0).is_some())
            .ok_or(TokenError::InvalidLifetime)?;

        Ok(Self {
            user_id,
            email: email.to_string(),
            exp,
            iat,
            jti: Uuid::new_v4().to_string(),
        })
    }

    /// Expiry as a timestamp; an unrepresentable `exp` reads as never
    /// expiring rather than already expired
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Whether the token's lifetime has elapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Lifetime left at `now`; zero or negative once expired
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at() - now
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: Option<String>,
}

/// Signs and verifies claim sets with a shared secret
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a new codec
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked by the caller against its own clock
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token valid for `ttl` from now
    pub fn issue(&self, user_id: i64, email: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(user_id, email, Utc::now(), ttl)
    }

    /// Issue a token with an explicit issue time
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, email, issued_at, ttl)?)
    }

    /// Sign a prepared claim set
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        debug!("Issuing token for user {}", claims.user_id);

        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify structure and signature and return the claims.
    ///
    /// Does not look at `exp` relative to the current time.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Malformed("empty token".to_string()));
        }

        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(TokenError::Malformed(
                "expected three dot-separated segments".to_string(),
            ));
        }

        check_declared_algorithm(segments[0])?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::UnsupportedAlgorithm(e.to_string())
                }
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed(
                "expiry is not after issue time".to_string(),
            ));
        }
        let lifetime = claims.exp.checked_sub(claims.iat);
        if lifetime.is_none_or(|secs| secs > MAX_TOKEN_LIFETIME_SECS)
            || DateTime::from_timestamp(claims.exp, 0).is_none()
        {
            return Err(TokenError::Malformed("expiry out of range".to_string()));
        }
        if claims.jti.is_empty() {
            return Err(TokenError::Malformed("empty token id".to_string()));
        }

        Ok(claims)
    }
}

/// Reject any header whose `alg` is not [`SIGNING_ALGORITHM`] before the
/// signature is looked at.
fn check_declared_algorithm(header_segment: &str) -> Result<(), TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(header_segment)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;
    let header: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;

    match header.alg.as_deref() {
        Some("HS256") => Ok(()),
        Some(other) => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
        None => Err(TokenError::UnsupportedAlgorithm("missing".to_string())),
    }
}

/// Extract the token from a `Bearer <token>` authorization value
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let header = header.trim();
    if header.is_empty() {
        return Err(AuthError::MissingAuthHeader);
    }

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;
    if scheme != "Bearer" {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}
