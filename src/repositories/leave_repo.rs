use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CreateLeaveRequest, LeaveRequest, LeaveStatus},
};

const LEAVE_COLUMNS: &str = "id, employee_id, leave_type, start_date, end_date, reason, status, \
                             approved_by_id, approved_at, created_at, updated_at";

pub struct LeaveRepository;

impl LeaveRepository {
    pub async fn create(pool: &PgPool, input: &CreateLeaveRequest) -> AppResult<LeaveRequest> {
        let leave = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            INSERT INTO leave_requests (employee_id, leave_type, start_date, end_date, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(input.employee_id)
        .bind(input.leave_type)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(&input.reason)
        .fetch_one(pool)
        .await?;

        Ok(leave)
    }

    /// Set the status. `approved_at` is stamped only for approvals.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: LeaveStatus,
        approved_by_id: Option<Uuid>,
    ) -> AppResult<Option<LeaveRequest>> {
        let leave = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            UPDATE leave_requests
            SET
                status = $2,
                approved_by_id = $3,
                approved_at = CASE WHEN $2 = 'APPROVED'::leave_status THEN NOW() ELSE NULL END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LEAVE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(approved_by_id)
        .fetch_optional(pool)
        .await?;

        Ok(leave)
    }

    pub async fn find_for_employee(
        pool: &PgPool,
        employee_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<LeaveRequest>> {
        let rows = sqlx::query_as::<_, LeaveRequest>(&format!(
            r#"
            SELECT {LEAVE_COLUMNS}
            FROM leave_requests
            WHERE employee_id = $1
            ORDER BY start_date DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(employee_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_for_employee(pool: &PgPool, employee_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM leave_requests WHERE employee_id = $1",
        )
        .bind(employee_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
