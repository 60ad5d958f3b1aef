use chrono::{DateTime, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

pub struct RefreshTokenRepository;

impl RefreshTokenRepository {
    /// Generate a secure random token (32 bytes = 64 hex chars)
    pub fn generate_token() -> String {
        let mut rng = rand::thread_rng();
        let bytes: [u8; 32] = rng.gen();
        hex::encode(bytes)
    }

    /// Hash a token using SHA256. Only the hash is stored.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<RefreshTokenRecord> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, expires_at, revoked, created_at
            "#,
        )
        .bind(user_id)
        .bind(Self::hash_token(token))
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(record)
    }

    /// Find a token that is neither revoked nor expired.
    pub async fn find_active(pool: &PgPool, token: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT id, user_id, expires_at, revoked, created_at
            FROM refresh_tokens
            WHERE token_hash = $1
              AND revoked = false
              AND expires_at > NOW()
            "#,
        )
        .bind(Self::hash_token(token))
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Revoke a single token. Revoking an unknown or already revoked token is not an error.
    pub async fn revoke(pool: &PgPool, token: &str) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true
            WHERE token_hash = $1 AND revoked = false
            "#,
        )
        .bind(Self::hash_token(token))
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Revoke every outstanding token of a user.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = true
            WHERE user_id = $1 AND revoked = false
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Same as [`Self::revoke_all_for_user`], for the account linked to an employee.
    pub async fn revoke_all_for_employee(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens rt
            SET revoked = true
            FROM users u
            WHERE rt.user_id = u.id
              AND u.employee_id = $1
              AND rt.revoked = false
            "#,
        )
        .bind(employee_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete tokens whose expiry has passed.
    pub async fn delete_expired(pool: &PgPool) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
