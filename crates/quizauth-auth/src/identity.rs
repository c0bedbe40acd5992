//! Caller-facing user types

use chrono::{DateTime, Utc};
use quizauth_db::Credential;
use serde::{Deserialize, Serialize};

/// Identity proven by a validated token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub user_id: i64,
    pub email: String,
    pub username: Option<String>,
}

impl From<&Credential> for AuthenticatedIdentity {
    fn from(credential: &Credential) -> Self {
        Self {
            user_id: credential.id,
            email: credential.email.clone(),
            username: credential.username.clone(),
        }
    }
}

/// Public view of a stored user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Credential> for UserProfile {
    fn from(credential: &Credential) -> Self {
        Self {
            id: credential.id,
            email: credential.email.clone(),
            username: credential.username.clone(),
            created_at: credential.created_at,
        }
    }
}

/// Requested profile changes; `None` keeps the stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserProfile,
}
