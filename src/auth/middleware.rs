use std::convert::Infallible;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{PermissionSet, RoleSet},
    error::{AppError, AppResult},
    models::User,
    services::TokenService,
    AppState,
};

/// Identity attached to a request after successful authentication.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub user: User,
    pub roles: RoleSet,
    pub permissions: PermissionSet,
}

impl CurrentUser {
    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions.contains(name)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.contains(name)
    }
}

/// Extract Bearer token from Authorization header.
fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(AppError::access_token_required)?
        .to_str()
        .map_err(|_| AppError::access_token_required())?;

    // RFC 7235: Authorization scheme is case-insensitive
    if header.len() >= 7 && header[..7].eq_ignore_ascii_case("bearer ") {
        let token = header[7..].trim();
        if token.is_empty() {
            return Err(AppError::access_token_required());
        }
        Ok(token)
    } else {
        Err(AppError::access_token_required())
    }
}

async fn authenticate(state: &AppState, token: &str) -> AppResult<CurrentUser> {
    TokenService::verify_token(&state.pool, &state.config, token)
        .await
        .map_err(|e| {
            if e.is_authentication_failure() {
                tracing::debug!(reason = %e, "Rejected access token");
                AppError::invalid_token()
            } else {
                e
            }
        })
}

/// Middleware that verifies the access token, resolves the caller's current
/// roles and permissions, and stores them in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&request)?.to_owned();
    let current = authenticate(&state, &token).await?;

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

/// Like [`auth_middleware`], but any failure lets the request through anonymously.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(&request).ok().map(str::to_owned);
    if let Some(token) = token {
        match authenticate(&state, &token).await {
            Ok(current) => {
                request.extensions_mut().insert(current);
            }
            Err(e) => tracing::debug!(reason = %e, "Proceeding without authentication"),
        }
    }

    next.run(request).await
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::authentication_required)
    }
}

/// Extractor for handlers behind [`optional_auth_middleware`].
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
