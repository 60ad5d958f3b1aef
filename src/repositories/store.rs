//! Store traits consumed by the HR guard services, and their Postgres
//! implementation. The services only see these traits, so the guards can be
//! exercised against in-memory stores.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    AttendanceRepository, CareerRepository, EmployeeRepository, LeaveRepository,
    RefreshTokenRepository,
};
use crate::{
    error::AppResult,
    models::{
        Attendance, CreateLeaveRequest, Employee, EmployeeStatus, LeaveRequest, LeaveStatus,
        OffboardEmployee, OffboardingRecord, ProbationEvaluation, ProbationReview,
        RecordAttendance,
    },
};

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>>;
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn record_attendance(&self, input: &RecordAttendance) -> AppResult<Attendance>;

    async fn check_in(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Attendance>;

    /// `None` when there is no entry for that day to close.
    async fn check_out(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Attendance>>;
}

#[async_trait]
pub trait LeaveStore: Send + Sync {
    async fn create_leave_request(&self, input: &CreateLeaveRequest) -> AppResult<LeaveRequest>;

    /// `None` when the leave request does not exist.
    async fn update_leave_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        approved_by_id: Option<Uuid>,
    ) -> AppResult<Option<LeaveRequest>>;
}

/// Multi-row career transitions. Each call is atomic.
#[async_trait]
pub trait CareerStore: Send + Sync {
    async fn complete_probation(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        review: &ProbationReview,
    ) -> AppResult<ProbationEvaluation>;

    async fn offboard(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        input: &OffboardEmployee,
    ) -> AppResult<OffboardingRecord>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>> {
        EmployeeRepository::find_by_id(&self.pool, id).await
    }
}

#[async_trait]
impl AttendanceStore for PgStore {
    async fn record_attendance(&self, input: &RecordAttendance) -> AppResult<Attendance> {
        AttendanceRepository::upsert(&self.pool, input).await
    }

    async fn check_in(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Attendance> {
        AttendanceRepository::check_in(&self.pool, employee_id, at, notes).await
    }

    async fn check_out(
        &self,
        employee_id: Uuid,
        at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> AppResult<Option<Attendance>> {
        AttendanceRepository::check_out(&self.pool, employee_id, at, notes).await
    }
}

#[async_trait]
impl LeaveStore for PgStore {
    async fn create_leave_request(&self, input: &CreateLeaveRequest) -> AppResult<LeaveRequest> {
        LeaveRepository::create(&self.pool, input).await
    }

    async fn update_leave_status(
        &self,
        id: Uuid,
        status: LeaveStatus,
        approved_by_id: Option<Uuid>,
    ) -> AppResult<Option<LeaveRequest>> {
        LeaveRepository::update_status(&self.pool, id, status, approved_by_id).await
    }
}

#[async_trait]
impl CareerStore for PgStore {
    async fn complete_probation(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        review: &ProbationReview,
    ) -> AppResult<ProbationEvaluation> {
        let mut tx = self.pool.begin().await?;

        EmployeeRepository::set_status(&mut tx, employee_id, new_status).await?;
        let evaluation =
            CareerRepository::insert_probation_evaluation(&mut tx, employee_id, review).await?;

        tx.commit().await?;
        Ok(evaluation)
    }

    async fn offboard(
        &self,
        employee_id: Uuid,
        new_status: EmployeeStatus,
        input: &OffboardEmployee,
    ) -> AppResult<OffboardingRecord> {
        let mut tx = self.pool.begin().await?;

        EmployeeRepository::set_status(&mut tx, employee_id, new_status).await?;
        let record = CareerRepository::insert_offboarding_record(&mut tx, employee_id, input).await?;
        EmployeeRepository::deactivate_linked_user(&mut tx, employee_id).await?;
        let revoked = RefreshTokenRepository::revoke_all_for_employee(&mut tx, employee_id).await?;

        tx.commit().await?;

        tracing::info!(%employee_id, revoked_tokens = revoked, "Employee offboarded");
        Ok(record)
    }
}
