use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User account information
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct User {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// User's email address (unique)
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: String,
    /// Whether the user account is active. Inactive users cannot authenticate.
    #[schema(example = true)]
    pub is_active: bool,
    #[schema(example = false)]
    pub email_verified: bool,
    /// Employee record linked to this account, if any
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User registration request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUser {
    /// Email address for the new account. Must be unique.
    #[schema(example = "jane.doe@example.com", format = "email")]
    pub email: String,
    /// Account password. Must be at least 8 characters.
    #[schema(example = "securepassword123", min_length = 8)]
    pub password: String,
    /// Optional employee record to link the account to
    pub employee_id: Option<Uuid>,
}

/// Profile of the authenticated user with resolved roles and permissions
#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    pub is_active: bool,
    pub email_verified: bool,
    pub employee_id: Option<Uuid>,
    #[schema(example = json!(["employee"]))]
    pub roles: Vec<String>,
    #[schema(example = json!(["attendance:self", "leave:self"]))]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for updating the caller's own profile
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfile {
    #[schema(example = "new.address@example.com")]
    pub email: Option<String>,
}

/// Request body for changing the caller's password
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePassword {
    pub current_password: String,
    #[schema(min_length = 8)]
    pub new_password: String,
}
