use sqlx::PgPool;

use crate::{error::AppResult, models::Role};

pub struct RoleRepository;

impl RoleRepository {
    /// Find a role by name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Role>> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Insert a role unless one with the same name exists; returns the stored row.
    pub async fn insert_if_absent(
        pool: &PgPool,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Role> {
        sqlx::query(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(description)
        .execute(pool)
        .await?;

        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT id, name, description, created_at
            FROM roles
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(role)
    }
}
