//! Attendance writes behind domain preconditions. Every check runs before the
//! store is written to.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Attendance, ClockRequest, Employee, RecordAttendance},
    repositories::{AttendanceStore, EmployeeStore},
};

/// Load the employee and refuse terminated or inactive ones.
async fn active_employee<S: EmployeeStore + ?Sized>(store: &S, id: Uuid) -> AppResult<Employee> {
    let employee = store
        .find_employee(id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;

    if employee.status.blocks_attendance() {
        return Err(AppError::illegal_state(
            "EMPLOYEE_INACTIVE",
            "Employee is not active",
        ));
    }

    Ok(employee)
}

pub async fn record_attendance_with_guards<S>(
    store: &S,
    input: &RecordAttendance,
) -> AppResult<Attendance>
where
    S: EmployeeStore + AttendanceStore,
{
    active_employee(store, input.employee_id).await?;

    if let (Some(check_in), Some(check_out)) = (input.check_in, input.check_out) {
        if check_out < check_in {
            return Err(AppError::validation(
                "INVALID_TIME_RANGE",
                "Check-out cannot be earlier than check-in",
            ));
        }
    }

    store.record_attendance(input).await
}

pub async fn check_in_with_guards<S>(store: &S, input: &ClockRequest) -> AppResult<Attendance>
where
    S: EmployeeStore + AttendanceStore,
{
    active_employee(store, input.employee_id).await?;

    let attendance = store
        .check_in(input.employee_id, Utc::now(), input.notes.as_deref())
        .await?;

    tracing::debug!(employee_id = %input.employee_id, "Checked in");
    Ok(attendance)
}

/// Closes today's entry. Only existence is checked, so an employee
/// terminated mid-shift can still clock out.
pub async fn check_out_with_guards<S>(store: &S, input: &ClockRequest) -> AppResult<Attendance>
where
    S: EmployeeStore + AttendanceStore,
{
    store
        .find_employee(input.employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;

    let attendance = store
        .check_out(input.employee_id, Utc::now(), input.notes.as_deref())
        .await?
        .ok_or_else(|| {
            AppError::not_found("ATTENDANCE_NOT_FOUND", "No check-in recorded for today")
        })?;

    tracing::debug!(employee_id = %input.employee_id, "Checked out");
    Ok(attendance)
}
