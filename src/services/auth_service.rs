use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{
        hash_password, validate_password, verify_password, CurrentUser, DEFAULT_SIGNUP_ROLE,
    },
    config::Config,
    error::{AppError, AppResult},
    models::{
        ChangePassword, CreateUser, RolesAndPermissions, UpdateProfile, User, UserProfile,
    },
    repositories::{EmployeeRepository, RoleRepository, UserRepository},
    services::{PermissionService, SeedSummary, TokenService},
};

/// Tokens issued on registration and login
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: User,
    /// JWT access token. Send as `Authorization: Bearer <token>`.
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGciOiJIUzI1NiJ9.eyJzdWIiOiI1NTBlODQwMC1lMjliLTQxZDQtYTcxNi00NDY2NTU0NDAwMDAifQ.signature")]
    pub access_token: String,
    /// Opaque refresh token. Exchange at `/api/auth/refresh-token`.
    #[schema(example = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08")]
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token validity in seconds
    #[schema(example = 900, minimum = 1)]
    pub expires_in: i64,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// User login credentials
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane.doe@example.com", format = "email")]
    pub email: String,
    #[schema(example = "securepassword123")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// A new access token minted from a refresh token
#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    #[schema(example = 900)]
    pub expires_in: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Result of access token introspection
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenIntrospection {
    pub valid: bool,
    pub user_id: Option<Uuid>,
    #[schema(example = json!(["employee"]))]
    pub roles: Vec<String>,
    #[schema(example = json!(["attendance:self", "leave:self"]))]
    pub permissions: Vec<String>,
}

impl TokenIntrospection {
    fn invalid() -> Self {
        Self {
            valid: false,
            user_id: None,
            roles: Vec::new(),
            permissions: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckPermissionRequest {
    /// Token to check. When omitted, the caller's own bearer token is used.
    pub token: Option<String>,
    #[schema(example = "employee:read")]
    pub permission: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckPermissionResponse {
    #[schema(example = "employee:read")]
    pub permission: String,
    pub granted: bool,
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("INVALID_EMAIL", "Invalid email format")),
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthorized("INVALID_CREDENTIALS", "Invalid email or password")
}

fn user_not_found() -> AppError {
    AppError::not_found("USER_NOT_FOUND", "User not found")
}

pub struct AuthService;

impl AuthService {
    /// Register a new account, grant it the default role and sign it in.
    pub async fn register(pool: &PgPool, config: &Config, input: CreateUser) -> AppResult<AuthResponse> {
        let email = normalize_email(&input.email)?;
        validate_password(&input.password)?;

        if UserRepository::find_by_email(pool, &email).await?.is_some() {
            return Err(AppError::conflict("EMAIL_TAKEN", "Email already registered"));
        }

        if let Some(employee_id) = input.employee_id {
            EmployeeRepository::find_by_id(pool, employee_id)
                .await?
                .ok_or_else(AppError::employee_not_found)?;
            if UserRepository::find_by_employee_id(pool, employee_id)
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "EMPLOYEE_ALREADY_LINKED",
                    "Employee already has a user account",
                ));
            }
        }

        let password_hash = hash_password(&input.password)?;
        let user = UserRepository::create(pool, &email, &password_hash, input.employee_id).await?;

        match RoleRepository::find_by_name(pool, DEFAULT_SIGNUP_ROLE).await? {
            Some(role) => {
                UserRepository::assign_role(pool, user.id, role.id).await?;
            }
            None => tracing::warn!(
                role = DEFAULT_SIGNUP_ROLE,
                "Default role missing; seed roles with /api/auth/create-default-roles"
            ),
        }

        tracing::info!(user_id = %user.id, "User registered");

        Self::issue_session(pool, config, user).await
    }

    pub async fn login(pool: &PgPool, config: &Config, input: LoginRequest) -> AppResult<AuthResponse> {
        let email = input.email.trim().to_lowercase();
        let user = UserRepository::find_by_email(pool, &email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        if !user.is_active {
            return Err(AppError::unauthorized(
                "USER_INACTIVE",
                "User account is deactivated",
            ));
        }

        tracing::debug!(user_id = %user.id, "User logged in");

        Self::issue_session(pool, config, user).await
    }

    async fn issue_session(pool: &PgPool, config: &Config, user: User) -> AppResult<AuthResponse> {
        let access_token = TokenService::issue_access_token(user.id, config)?;
        let refresh = TokenService::issue_refresh_token(pool, config, user.id).await?;

        Ok(AuthResponse {
            user,
            access_token,
            refresh_token: refresh.token,
            token_type: "Bearer".to_string(),
            expires_in: config.jwt_expiration_seconds,
            refresh_token_expires_at: refresh.expires_at,
        })
    }

    pub async fn refresh(
        pool: &PgPool,
        config: &Config,
        input: RefreshTokenRequest,
    ) -> AppResult<AccessTokenResponse> {
        let access_token = TokenService::refresh(pool, config, &input.refresh_token).await?;

        Ok(AccessTokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: config.jwt_expiration_seconds,
        })
    }

    /// Revoke one refresh token. Unknown tokens are ignored.
    pub async fn logout(pool: &PgPool, input: LogoutRequest) -> AppResult<()> {
        TokenService::revoke(pool, &input.refresh_token).await
    }

    pub async fn logout_all(pool: &PgPool, user_id: Uuid) -> AppResult<u64> {
        let revoked = TokenService::revoke_all(pool, user_id).await?;
        tracing::info!(%user_id, revoked, "All sessions revoked");
        Ok(revoked)
    }

    pub fn profile(current: &CurrentUser) -> UserProfile {
        let user = &current.user;
        UserProfile {
            id: user.id,
            email: user.email.clone(),
            is_active: user.is_active,
            email_verified: user.email_verified,
            employee_id: user.employee_id,
            roles: current.roles.iter().cloned().collect(),
            permissions: current.permissions.names(),
            created_at: user.created_at,
        }
    }

    /// Changing the email resets `email_verified`.
    pub async fn update_profile(
        pool: &PgPool,
        current: &CurrentUser,
        input: UpdateProfile,
    ) -> AppResult<UserProfile> {
        let Some(email) = input.email else {
            return Ok(Self::profile(current));
        };

        let email = normalize_email(&email)?;
        if email == current.user.email {
            return Ok(Self::profile(current));
        }

        if UserRepository::find_by_email(pool, &email).await?.is_some() {
            return Err(AppError::conflict("EMAIL_TAKEN", "Email already registered"));
        }

        let user = UserRepository::update_email(pool, current.user_id, &email)
            .await?
            .ok_or_else(user_not_found)?;

        let updated = CurrentUser {
            user,
            ..current.clone()
        };
        Ok(Self::profile(&updated))
    }

    /// Change the caller's password and revoke every refresh token they hold.
    pub async fn change_password(
        pool: &PgPool,
        current: &CurrentUser,
        input: ChangePassword,
    ) -> AppResult<()> {
        if !verify_password(&input.current_password, &current.user.password_hash)? {
            return Err(AppError::unauthorized(
                "INVALID_CREDENTIALS",
                "Current password is incorrect",
            ));
        }
        validate_password(&input.new_password)?;

        let password_hash = hash_password(&input.new_password)?;
        UserRepository::update_password(pool, current.user_id, &password_hash).await?;
        let revoked = TokenService::revoke_all(pool, current.user_id).await?;

        tracing::info!(user_id = %current.user_id, revoked, "Password changed");
        Ok(())
    }

    pub fn roles_and_permissions(current: &CurrentUser) -> RolesAndPermissions {
        RolesAndPermissions {
            user_id: current.user_id,
            roles: current.roles.iter().cloned().collect(),
            permissions: current.permissions.names(),
        }
    }

    /// Introspect an access token. Invalid tokens yield `valid: false`
    /// rather than an error; database failures still propagate.
    pub async fn verify_token(
        pool: &PgPool,
        config: &Config,
        input: VerifyTokenRequest,
    ) -> AppResult<TokenIntrospection> {
        match TokenService::verify_token(pool, config, &input.token).await {
            Ok(current) => Ok(TokenIntrospection {
                valid: true,
                user_id: Some(current.user_id),
                roles: current.roles.into_iter().collect(),
                permissions: current.permissions.names(),
            }),
            Err(e) if e.is_authentication_failure() => Ok(TokenIntrospection::invalid()),
            Err(e) => Err(e),
        }
    }

    pub async fn check_permission(
        pool: &PgPool,
        config: &Config,
        token: &str,
        permission: String,
    ) -> AppResult<CheckPermissionResponse> {
        let current = TokenService::verify_token(pool, config, token)
            .await
            .map_err(|e| {
                if e.is_authentication_failure() {
                    AppError::invalid_token()
                } else {
                    e
                }
            })?;

        Ok(Self::permission_check(&current, permission))
    }

    pub fn permission_check(current: &CurrentUser, permission: String) -> CheckPermissionResponse {
        CheckPermissionResponse {
            granted: current.has_permission(&permission),
            permission,
        }
    }

    /// Returns `false` when the user already held the role.
    pub async fn assign_role(pool: &PgPool, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        let (user, role_id) = Self::resolve_assignment(pool, user_id, role_name).await?;
        let assigned = UserRepository::assign_role(pool, user.id, role_id).await?;
        tracing::info!(%user_id, role = role_name, assigned, "Role assigned");
        Ok(assigned)
    }

    /// Returns `false` when the user did not hold the role.
    pub async fn remove_role(pool: &PgPool, user_id: Uuid, role_name: &str) -> AppResult<bool> {
        let (user, role_id) = Self::resolve_assignment(pool, user_id, role_name).await?;
        let removed = UserRepository::remove_role(pool, user.id, role_id).await?;
        tracing::info!(%user_id, role = role_name, removed, "Role removed");
        Ok(removed)
    }

    async fn resolve_assignment(
        pool: &PgPool,
        user_id: Uuid,
        role_name: &str,
    ) -> AppResult<(User, Uuid)> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(user_not_found)?;
        let role = RoleRepository::find_by_name(pool, role_name)
            .await?
            .ok_or_else(|| AppError::not_found("ROLE_NOT_FOUND", "Role not found"))?;
        Ok((user, role.id))
    }

    pub async fn create_default_roles(pool: &PgPool) -> AppResult<SeedSummary> {
        PermissionService::seed_defaults(pool).await
    }

    pub async fn clean_expired_tokens(pool: &PgPool) -> AppResult<u64> {
        TokenService::sweep_expired(pool).await
    }

    pub async fn find_user(pool: &PgPool, user_id: Uuid) -> AppResult<User> {
        UserRepository::find_by_id(pool, user_id)
            .await?
            .ok_or_else(user_not_found)
    }
}
