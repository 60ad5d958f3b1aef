use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    auth::{decode_token, encode_token, Claims, CurrentUser},
    config::Config,
    error::{AppError, AppResult},
    repositories::{RefreshTokenRepository, UserRepository},
    services::PermissionService,
};

/// A freshly minted refresh token. `token` is only ever seen here; the
/// database keeps its hash.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService;

impl TokenService {
    pub fn issue_access_token(user_id: Uuid, config: &Config) -> AppResult<String> {
        let claims = Claims::new(user_id, config.jwt_expiration_seconds);
        encode_token(&claims, &config.jwt_secret)
    }

    pub async fn issue_refresh_token(
        pool: &PgPool,
        config: &Config,
        user_id: Uuid,
    ) -> AppResult<IssuedRefreshToken> {
        let token = RefreshTokenRepository::generate_token();
        let expires_at = Utc::now() + Duration::days(config.refresh_token_ttl_days);

        RefreshTokenRepository::create(pool, user_id, &token, expires_at).await?;

        Ok(IssuedRefreshToken { token, expires_at })
    }

    /// Check signature and expiry; returns the user id.
    pub fn verify_access_token(token: &str, config: &Config) -> AppResult<Uuid> {
        decode_token(token, &config.jwt_secret)
            .map(|claims| claims.sub)
            .map_err(|_| AppError::invalid_token())
    }

    /// Verify the access token, load the account, and resolve its current
    /// roles and permissions.
    pub async fn verify_token(pool: &PgPool, config: &Config, token: &str) -> AppResult<CurrentUser> {
        let user_id = Self::verify_access_token(token, config)?;

        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("USER_NOT_FOUND", "User not found"))?;

        if !user.is_active {
            return Err(AppError::unauthorized(
                "USER_INACTIVE",
                "User account is deactivated",
            ));
        }

        let roles = PermissionService::resolve_roles(pool, user_id).await?;
        let permissions = PermissionService::resolve_permissions(pool, user_id).await?;

        Ok(CurrentUser {
            user_id,
            user,
            roles,
            permissions,
        })
    }

    /// Exchange a refresh token for a new access token. The refresh token is
    /// not rotated and stays usable until it expires or is revoked.
    pub async fn refresh(pool: &PgPool, config: &Config, refresh_token: &str) -> AppResult<String> {
        let record = RefreshTokenRepository::find_active(pool, refresh_token)
            .await?
            .ok_or_else(AppError::invalid_refresh_token)?;

        let user = UserRepository::find_by_id(pool, record.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(AppError::invalid_refresh_token)?;

        Self::issue_access_token(user.id, config)
    }

    pub async fn revoke(pool: &PgPool, refresh_token: &str) -> AppResult<()> {
        RefreshTokenRepository::revoke(pool, refresh_token).await?;
        Ok(())
    }

    pub async fn revoke_all(pool: &PgPool, user_id: Uuid) -> AppResult<u64> {
        RefreshTokenRepository::revoke_all_for_user(pool, user_id).await
    }

    pub async fn sweep_expired(pool: &PgPool) -> AppResult<u64> {
        RefreshTokenRepository::delete_expired(pool).await
    }

    /// Run [`Self::sweep_expired`] forever at the given interval.
    pub async fn run_sweeper(pool: PgPool, interval: std::time::Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match Self::sweep_expired(&pool).await {
                Ok(0) => {}
                Ok(deleted) => tracing::info!(deleted, "Swept expired refresh tokens"),
                Err(e) => tracing::warn!(error = %e, "Refresh token sweep failed"),
            }
        }
    }
}
