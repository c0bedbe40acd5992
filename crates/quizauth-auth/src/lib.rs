//! Quizauth Authentication
//!
//! Password hashing, JWT issuing and validation, token revocation and the
//! per-call authorization interceptor, with an Axum middleware on top.

pub mod error;
pub mod identity;
pub mod interceptor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod revocation;
pub mod service;
pub mod validation;

pub use error::{AuthError, ErrorCode, TokenError};
pub use identity::{AuthenticatedIdentity, LoginOutcome, UserProfile, UserUpdate};
pub use interceptor::{AuthInterceptor, CallMetadata, CallScope, DEFAULT_PUBLIC_OPERATIONS};
pub use jwt::{Claims, TokenCodec, extract_bearer_token};
pub use middleware::{RequireIdentity, authorize_request};
pub use password::PasswordHasher;
pub use revocation::{REVOCATION_KEY_PREFIX, Revocations, spawn_purge_task};
pub use service::{AuthConfig, AuthService};
