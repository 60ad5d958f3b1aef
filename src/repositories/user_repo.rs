use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::User};

const USER_COLUMNS: &str =
    "id, email, password_hash, is_active, email_verified, employee_id, created_at, updated_at";

pub struct UserRepository;

impl UserRepository {
    /// Find a user by email (for login).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_employee_id(pool: &PgPool, employee_id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE employee_id = $1"
        ))
        .bind(employee_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Create a new user.
    pub async fn create(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        employee_id: Option<Uuid>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, employee_id)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(email)
        .bind(password_hash)
        .bind(employee_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_email(pool: &PgPool, id: Uuid, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = $2, email_verified = false, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_password(pool: &PgPool, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn set_active(pool: &PgPool, id: Uuid, is_active: bool) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(is_active)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Get all role names for a user.
    pub async fn get_user_roles(pool: &PgPool, user_id: Uuid) -> AppResult<Vec<String>> {
        let roles = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM roles r
            JOIN user_roles ur ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(roles)
    }

    /// Assign a role to a user. Returns false if the user already held it.
    pub async fn assign_role(pool: &PgPool, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a role from a user. Returns false if the user did not hold it.
    pub async fn remove_role(pool: &PgPool, user_id: Uuid, role_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1 AND role_id = $2
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
