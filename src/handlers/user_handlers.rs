use axum::{extract::State, routing::get, Router};
use uuid::Uuid;

use crate::{
    auth::{guarded, perms, require_ownership_or_permission},
    error::{AppResult, ErrorResponse},
    extract::Path,
    models::{ApiResponse, User},
    services::AuthService,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    tag = "users",
    operation_id = "getUser",
    summary = "Get a user account",
    description = "Users can read their own account; reading others requires `admin:manage_users`.",
    security(("bearer_auth" = [])),
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User account", body = User),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<ApiResponse<User>> {
    let user = AuthService::find_user(&state.pool, user_id).await?;
    Ok(ApiResponse::ok(user))
}

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/:user_id",
        guarded(
            get(get_user),
            require_ownership_or_permission("user_id", perms::ADMIN_MANAGE_USERS),
        ),
    )
}
