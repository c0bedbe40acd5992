//! Revocation cache operations
//!
//! Deadlines are stored as unix milliseconds and compared against the
//! wall clock on every read, so an entry stops being visible at its
//! deadline even before [`RevocationCache::purge_expired`] deletes it.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::time::Duration;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::Database;
use crate::store::RevocationCache;

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[async_trait]
impl RevocationCache for Database {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> DbResult<()> {
        if ttl.is_zero() {
            return Err(DbError::InvalidArgument(
                "revocation entries require a positive TTL".to_string(),
            ));
        }
        let ttl_millis = i64::try_from(ttl.as_millis())
            .map_err(|_| DbError::InvalidArgument("TTL out of range".to_string()))?;
        let expires_at = now_millis().saturating_add(ttl_millis.max(1));

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (key, value, expires_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn exists(&self, key: &str) -> DbResult<bool> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS count FROM revoked_tokens WHERE key = ? AND expires_at > ?",
        )
        .bind(key)
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn get(&self, key: &str) -> DbResult<String> {
        let row = sqlx::query("SELECT value FROM revoked_tokens WHERE key = ? AND expires_at > ?")
            .bind(key)
            .bind(now_millis())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.get("value"))
            .ok_or_else(|| DbError::NotFound(format!("revocation entry '{}'", key)))
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= ?")
            .bind(now_millis())
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected();
        if removed > 0 {
            debug!("Purged {} expired revocation entries", removed);
        }
        Ok(removed)
    }
}
