use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{guarded, optional_auth_middleware, perms, require_permission, CurrentUser, MaybeUser},
    error::{AppError, AppResult, ErrorResponse},
    extract::Json,
    models::{
        ApiResponse, ChangePassword, CreateUser, MessageResponse, RoleAssignment,
        RolesAndPermissions, UpdateProfile, UserProfile,
    },
    services::{
        AccessTokenResponse, AuthResponse, AuthService, CheckPermissionRequest,
        CheckPermissionResponse, LoginRequest, LogoutRequest, RefreshTokenRequest, SeedSummary,
        TokenIntrospection, VerifyTokenRequest,
    },
    AppState,
};

/// Outcome of a role assignment or removal
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleChangeResponse {
    #[schema(example = "Role assigned")]
    pub message: String,
    /// False when the request did not change anything
    pub changed: bool,
}

/// Number of rows touched by a maintenance operation
#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 12)]
    pub count: u64,
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    operation_id = "registerUser",
    summary = "Register a new user",
    description = "Creates an account, grants it the default `employee` role and signs it in. \
                   Password must be at least 8 characters. An `employee_id` links the account \
                   to an existing employee record.",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email or password too short", body = ErrorResponse),
        (status = 404, description = "Linked employee does not exist", body = ErrorResponse),
        (status = 409, description = "Email already registered or employee already linked", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<(StatusCode, ApiResponse<AuthResponse>)> {
    let response = AuthService::register(&state.pool, &state.config, input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    operation_id = "loginUser",
    summary = "Authenticate user",
    description = "Validates credentials and returns an access token plus a refresh token. \
                   Each login creates an independent session.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials or account deactivated", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let response = AuthService::login(&state.pool, &state.config, input).await?;
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "auth",
    operation_id = "refreshToken",
    summary = "Exchange a refresh token for a new access token",
    description = "The refresh token is not rotated; it stays valid until it expires or is revoked.",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token issued", body = AccessTokenResponse),
        (status = 401, description = "Refresh token unknown, expired or revoked", body = ErrorResponse)
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    Json(input): Json<RefreshTokenRequest>,
) -> AppResult<ApiResponse<AccessTokenResponse>> {
    let response = AuthService::refresh(&state.pool, &state.config, input).await?;
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    operation_id = "logout",
    summary = "Revoke a refresh token",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Refresh token revoked", body = MessageResponse)
    )
)]
async fn logout(
    State(state): State<AppState>,
    Json(input): Json<LogoutRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    AuthService::logout(&state.pool, input).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Logged out successfully")))
}

#[utoipa::path(
    post,
    path = "/api/auth/verify-token",
    tag = "auth",
    operation_id = "verifyToken",
    summary = "Introspect an access token",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Introspection result; `valid` is false for bad tokens", body = TokenIntrospection)
    )
)]
async fn verify_token(
    State(state): State<AppState>,
    Json(input): Json<VerifyTokenRequest>,
) -> AppResult<ApiResponse<TokenIntrospection>> {
    let response = AuthService::verify_token(&state.pool, &state.config, input).await?;
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/check-permission",
    tag = "auth",
    operation_id = "checkPermission",
    summary = "Check whether a token's owner holds a permission",
    description = "Checks the token in the body, or the caller's bearer token when the body has none.",
    request_body = CheckPermissionRequest,
    responses(
        (status = 200, description = "Permission check result", body = CheckPermissionResponse),
        (status = 401, description = "No token supplied, or the token is invalid or expired", body = ErrorResponse)
    )
)]
async fn check_permission(
    State(state): State<AppState>,
    MaybeUser(caller): MaybeUser,
    Json(input): Json<CheckPermissionRequest>,
) -> AppResult<ApiResponse<CheckPermissionResponse>> {
    let response = match (input.token, caller) {
        (Some(token), _) => {
            AuthService::check_permission(&state.pool, &state.config, &token, input.permission)
                .await?
        }
        (None, Some(current)) => AuthService::permission_check(&current, input.permission),
        (None, None) => return Err(AppError::access_token_required()),
    };
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout-all",
    tag = "auth",
    operation_id = "logoutAll",
    summary = "Revoke every refresh token of the caller",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All sessions revoked", body = MessageResponse),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    )
)]
async fn logout_all(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<MessageResponse>> {
    AuthService::logout_all(&state.pool, current.user_id).await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Logged out from all sessions",
    )))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    operation_id = "getProfile",
    summary = "Get current user profile",
    description = "Returns the caller's account together with the roles and permissions resolved for this request.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    )
)]
async fn get_profile(current: CurrentUser) -> ApiResponse<UserProfile> {
    ApiResponse::ok(AuthService::profile(&current))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    tag = "auth",
    operation_id = "updateProfile",
    summary = "Update current user profile",
    description = "Changing the email marks it unverified.",
    security(("bearer_auth" = [])),
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<UpdateProfile>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = AuthService::update_profile(&state.pool, &current, input).await?;
    Ok(ApiResponse::ok(profile))
}

#[utoipa::path(
    get,
    path = "/api/auth/roles-permissions",
    tag = "auth",
    operation_id = "getRolesAndPermissions",
    summary = "List the caller's roles and effective permissions",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Roles and permissions", body = RolesAndPermissions),
        (status = 401, description = "Missing or invalid access token", body = ErrorResponse)
    )
)]
async fn roles_permissions(current: CurrentUser) -> ApiResponse<RolesAndPermissions> {
    ApiResponse::ok(AuthService::roles_and_permissions(&current))
}

#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    tag = "auth",
    operation_id = "changePassword",
    summary = "Change the caller's password",
    description = "All refresh tokens of the caller are revoked afterwards.",
    security(("bearer_auth" = [])),
    request_body = ChangePassword,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password too short", body = ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse)
    )
)]
async fn change_password(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<ChangePassword>,
) -> AppResult<ApiResponse<MessageResponse>> {
    AuthService::change_password(&state.pool, &current, input).await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Password changed. Please log in again.",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/assign-role",
    tag = "auth",
    operation_id = "assignRole",
    summary = "Assign a role to a user",
    description = "Requires `admin:manage_users`. Assigning a role the user already holds is a no-op.",
    security(("bearer_auth" = [])),
    request_body = RoleAssignment,
    responses(
        (status = 200, description = "Role assigned", body = RoleChangeResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    )
)]
async fn assign_role(
    State(state): State<AppState>,
    Json(input): Json<RoleAssignment>,
) -> AppResult<ApiResponse<RoleChangeResponse>> {
    let changed = AuthService::assign_role(&state.pool, input.user_id, &input.role_name).await?;
    let message = if changed {
        "Role assigned"
    } else {
        "User already has this role"
    };
    Ok(ApiResponse::ok(RoleChangeResponse {
        message: message.to_string(),
        changed,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/remove-role",
    tag = "auth",
    operation_id = "removeRole",
    summary = "Remove a role from a user",
    description = "Requires `admin:manage_users`. Takes effect on the user's next request.",
    security(("bearer_auth" = [])),
    request_body = RoleAssignment,
    responses(
        (status = 200, description = "Role removed", body = RoleChangeResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    )
)]
async fn remove_role(
    State(state): State<AppState>,
    Json(input): Json<RoleAssignment>,
) -> AppResult<ApiResponse<RoleChangeResponse>> {
    let changed = AuthService::remove_role(&state.pool, input.user_id, &input.role_name).await?;
    let message = if changed {
        "Role removed"
    } else {
        "User does not have this role"
    };
    Ok(ApiResponse::ok(RoleChangeResponse {
        message: message.to_string(),
        changed,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/create-default-roles",
    tag = "auth",
    operation_id = "createDefaultRoles",
    summary = "Seed the default roles and permission catalog",
    description = "Requires `admin:manage_system`. Idempotent.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Seed summary", body = SeedSummary),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
async fn create_default_roles(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SeedSummary>> {
    let summary = AuthService::create_default_roles(&state.pool).await?;
    Ok(ApiResponse::ok(summary))
}

#[utoipa::path(
    post,
    path = "/api/auth/clean-expired-tokens",
    tag = "auth",
    operation_id = "cleanExpiredTokens",
    summary = "Delete expired refresh tokens",
    description = "Requires `admin:manage_system`.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of deleted tokens", body = CountResponse),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
async fn clean_expired_tokens(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = AuthService::clean_expired_tokens(&state.pool).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}

/// Create auth routes - split into public and protected
pub fn auth_routes(state: &AppState) -> (Router<AppState>, Router<AppState>) {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/verify-token", post(verify_token))
        .route(
            "/check-permission",
            post(check_permission).route_layer(middleware::from_fn_with_state(
                state.clone(),
                optional_auth_middleware,
            )),
        );

    let protected = Router::new()
        .route("/logout-all", post(logout_all))
        .route("/profile", get(get_profile).put(update_profile))
        .route("/roles-permissions", get(roles_permissions))
        .route("/change-password", post(change_password))
        .route(
            "/assign-role",
            guarded(post(assign_role), require_permission(perms::ADMIN_MANAGE_USERS)),
        )
        .route(
            "/remove-role",
            guarded(post(remove_role), require_permission(perms::ADMIN_MANAGE_USERS)),
        )
        .route(
            "/create-default-roles",
            guarded(
                post(create_default_roles),
                require_permission(perms::ADMIN_MANAGE_SYSTEM),
            ),
        )
        .route(
            "/clean-expired-tokens",
            guarded(
                post(clean_expired_tokens),
                require_permission(perms::ADMIN_MANAGE_SYSTEM),
            ),
        );

    (public, protected)
}
