use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::{split_permission_name, PermissionSet, RoleSet, DEFAULT_ROLES, PERMISSION_CATALOG},
    error::AppResult,
    repositories::{PermissionRepository, RoleRepository, UserRepository},
};

/// Outcome of seeding the default roles and permissions
#[derive(Debug, Serialize, ToSchema)]
pub struct SeedSummary {
    /// Permissions that did not exist before
    #[schema(example = 22)]
    pub permissions_created: usize,
    /// Role-permission links that did not exist before
    #[schema(example = 48)]
    pub grants_created: usize,
    #[schema(example = json!(["admin", "hr_manager", "manager", "employee"]))]
    pub roles: Vec<String>,
}

pub struct PermissionService;

impl PermissionService {
    /// Union of permissions across every role the user holds.
    ///
    /// Reads the current database state on every call; there is no cache, so
    /// role changes are visible to the next request after they commit.
    pub async fn resolve_permissions(pool: &PgPool, user_id: Uuid) -> AppResult<PermissionSet> {
        let rows = PermissionRepository::find_granted_to_user(pool, user_id).await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn resolve_roles(pool: &PgPool, user_id: Uuid) -> AppResult<RoleSet> {
        let roles = UserRepository::get_user_roles(pool, user_id).await?;
        Ok(roles.into_iter().collect())
    }

    /// Insert the built-in permission catalog and default roles.
    /// Idempotent: existing rows are left untouched.
    pub async fn seed_defaults(pool: &PgPool) -> AppResult<SeedSummary> {
        let mut permissions_created = 0;
        for (name, description) in PERMISSION_CATALOG {
            let (resource, action) = split_permission_name(name);
            if PermissionRepository::insert_if_absent(pool, name, resource, action, Some(*description))
                .await?
            {
                permissions_created += 1;
            }
        }

        let mut grants_created = 0;
        let mut roles = Vec::with_capacity(DEFAULT_ROLES.len());
        for default in DEFAULT_ROLES {
            let role =
                RoleRepository::insert_if_absent(pool, default.name, Some(default.description))
                    .await?;
            for permission in default.permission_names() {
                if PermissionRepository::grant_to_role(pool, role.id, permission).await? {
                    grants_created += 1;
                }
            }
            roles.push(role.name);
        }

        tracing::info!(
            permissions_created,
            grants_created,
            "Default roles and permissions seeded"
        );

        Ok(SeedSummary {
            permissions_created,
            grants_created,
            roles,
        })
    }
}
