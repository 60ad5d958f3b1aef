use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

pub struct PermissionRepository;

impl PermissionRepository {
    /// `(name, resource)` of every permission reachable through the user's roles.
    pub async fn find_granted_to_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> AppResult<Vec<(String, String)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT DISTINCT p.name, p.resource
            FROM permissions p
            JOIN role_permissions rp ON p.id = rp.permission_id
            JOIN user_roles ur ON rp.role_id = ur.role_id
            WHERE ur.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Insert a permission unless one with the same name exists.
    pub async fn insert_if_absent(
        pool: &PgPool,
        name: &str,
        resource: &str,
        action: &str,
        description: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO permissions (name, resource, action, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(resource)
        .bind(action)
        .bind(description)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Grant a permission (by name) to a role; no-op if already granted.
    pub async fn grant_to_role(pool: &PgPool, role_id: Uuid, permission_name: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, p.id FROM permissions p WHERE p.name = $2
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_name)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
