//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Token codec failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token lifetime must be positive")]
    InvalidLifetime,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing authorization header")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Invalid token: {0}")]
    Token(#[from] TokenError),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token revoked")]
    TokenRevoked,

    #[error("Token subject no longer exists")]
    UnknownSubject,

    #[error("Token email does not match the current account email")]
    IdentityMismatch,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Credential store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Revocation cache unavailable: {0}")]
    CacheUnavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

/// Caller-visible error classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    AlreadyExists,
    Unauthenticated,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::AlreadyExists => "ALREADY_EXISTS",
            ErrorCode::Unauthenticated => "UNAUTHENTICATED",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AuthError {
    /// Map to the caller-visible class.
    ///
    /// All token and credential failures collapse into
    /// [`ErrorCode::Unauthenticated`].
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::InvalidInput(_) => ErrorCode::InvalidInput,
            AuthError::NotFound(_) => ErrorCode::NotFound,
            AuthError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            // Issuing failures are ours, not the caller's
            AuthError::Token(TokenError::Encoding(_) | TokenError::InvalidLifetime) => {
                ErrorCode::Internal
            }
            AuthError::InvalidCredentials
            | AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::Token(_)
            | AuthError::TokenExpired
            | AuthError::TokenRevoked
            | AuthError::UnknownSubject
            | AuthError::IdentityMismatch
            | AuthError::Unauthenticated => ErrorCode::Unauthenticated,
            AuthError::StoreUnavailable(_)
            | AuthError::CacheUnavailable(_)
            | AuthError::PasswordHash(_) => ErrorCode::Internal,
        }
    }

    pub fn is_unauthenticated(&self) -> bool {
        self.code() == ErrorCode::Unauthenticated
    }

    /// Message safe to return to the caller
    fn public_message(&self) -> String {
        match self.code() {
            ErrorCode::Unauthenticated => "Unauthenticated".to_string(),
            ErrorCode::Internal => "Internal error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = self.code();

        let body = axum::Json(json!({
            "error": self.public_message(),
            "code": code.as_str(),
        }));

        (code.status(), body).into_response()
    }
}
