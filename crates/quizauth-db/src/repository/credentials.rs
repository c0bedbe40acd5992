//! Credential operations

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::error::{DbError, DbResult};
use crate::models::{Credential, CredentialUpdate, NewCredential};
use crate::repository::Database;
use crate::store::CredentialStore;

const CREDENTIAL_COLUMNS: &str = "id, email, username, password_hash, created_at, updated_at";

#[async_trait]
impl CredentialStore for Database {
    async fn save_user(&self, user: NewCredential) -> DbResult<i64> {
        let now = Utc::now().to_rfc3339();

        // The unique indexes decide duplicates; no check-then-insert race
        let row = sqlx::query(
            r#"
            INSERT INTO users (email, username, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::classify(e, "User"))?;

        Ok(row.get("id"))
    }

    async fn find_by_id(&self, id: i64) -> DbResult<Option<Credential>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = ?",
            CREDENTIAL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<Credential>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = ?",
            CREDENTIAL_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    async fn find_by_username(&self, username: &str) -> DbResult<Option<Credential>> {
        let result = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            CREDENTIAL_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    async fn update_user(
        &self,
        id: i64,
        update: CredentialUpdate,
    ) -> DbResult<Option<Credential>> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(&format!(
            r#"
            UPDATE users
            SET email = COALESCE(?, email),
                username = COALESCE(?, username),
                password_hash = COALESCE(?, password_hash),
                updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            CREDENTIAL_COLUMNS
        ))
        .bind(&update.email)
        .bind(&update.username)
        .bind(&update.password_hash)
        .bind(&now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DbError::classify(e, "User"))?;

        result
            .map(|row| Credential::try_from(&row).map_err(DbError::from))
            .transpose()
    }
}
