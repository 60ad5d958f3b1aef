use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Attendance, AttendanceStatus, RecordAttendance},
};

const ATTENDANCE_COLUMNS: &str =
    "id, employee_id, date, check_in, check_out, status, notes, created_at";

pub struct AttendanceRepository;

impl AttendanceRepository {
    /// Insert or overwrite the entry for `(employee_id, date)`.
    pub async fn upsert(pool: &PgPool, input: &RecordAttendance) -> AppResult<Attendance> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, check_out, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (employee_id, date) DO UPDATE SET
                check_in = EXCLUDED.check_in,
                check_out = EXCLUDED.check_out,
                status = EXCLUDED.status,
                notes = EXCLUDED.notes
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(input.employee_id)
        .bind(input.date)
        .bind(input.check_in)
        .bind(input.check_out)
        .bind(input.status.unwrap_or(AttendanceStatus::Present))
        .bind(&input.notes)
        .fetch_one(pool)
        .await?;

        Ok(attendance)
    }

    /// Record a check-in. A second check-in on the same day keeps the first time.
    pub async fn check_in(
        pool: &PgPool,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Attendance> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            INSERT INTO attendance (employee_id, date, check_in, status, notes)
            VALUES ($1, $2, $3, 'PRESENT', $4)
            ON CONFLICT (employee_id, date) DO UPDATE SET
                check_in = COALESCE(attendance.check_in, EXCLUDED.check_in),
                notes = COALESCE(EXCLUDED.notes, attendance.notes)
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(employee_id)
        .bind(at.date_naive())
        .bind(at)
        .bind(notes)
        .fetch_one(pool)
        .await?;

        Ok(attendance)
    }

    /// Record a check-out on the day's existing entry.
    pub async fn check_out(
        pool: &PgPool,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Attendance>> {
        let attendance = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            UPDATE attendance
            SET check_out = $3, notes = COALESCE($4, notes)
            WHERE employee_id = $1 AND date = $2 AND check_in IS NOT NULL
            RETURNING {ATTENDANCE_COLUMNS}
            "#
        ))
        .bind(employee_id)
        .bind(at.date_naive())
        .bind(at)
        .bind(notes)
        .fetch_optional(pool)
        .await?;

        Ok(attendance)
    }

    pub async fn find_for_employee(
        pool: &PgPool,
        employee_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(&format!(
            r#"
            SELECT {ATTENDANCE_COLUMNS}
            FROM attendance
            WHERE employee_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            ORDER BY date DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    pub async fn count_for_employee(
        pool: &PgPool,
        employee_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM attendance
            WHERE employee_id = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}
