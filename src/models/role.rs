use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Role {
    pub id: Uuid,
    #[schema(example = "hr_manager")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request body for assigning or removing a role
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleAssignment {
    pub user_id: Uuid,
    #[schema(example = "hr_manager")]
    pub role_name: String,
}

/// Roles and effective permissions of a user
#[derive(Debug, Serialize, ToSchema)]
pub struct RolesAndPermissions {
    pub user_id: Uuid,
    #[schema(example = json!(["hr_manager"]))]
    pub roles: Vec<String>,
    #[schema(example = json!(["employee:read", "leave:approve"]))]
    pub permissions: Vec<String>,
}
