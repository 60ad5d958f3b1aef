use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{CreateLeaveRequest, LeaveRequest, LeaveStatus, UpdateLeaveStatus},
    repositories::{EmployeeStore, LeaveStore},
};

pub async fn create_leave_request_with_guards<S>(
    store: &S,
    input: &CreateLeaveRequest,
) -> AppResult<LeaveRequest>
where
    S: EmployeeStore + LeaveStore,
{
    store
        .find_employee(input.employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;

    if input.start_date > input.end_date {
        return Err(AppError::validation(
            "INVALID_DATE_RANGE",
            "Start date must not be after end date",
        ));
    }

    store.create_leave_request(input).await
}

/// Approvals must name an existing employee as approver; other transitions
/// may omit it.
pub async fn update_leave_status_with_guards<S>(
    store: &S,
    leave_id: Uuid,
    input: &UpdateLeaveStatus,
) -> AppResult<LeaveRequest>
where
    S: EmployeeStore + LeaveStore,
{
    if input.status == LeaveStatus::Approved && input.approved_by_id.is_none() {
        return Err(AppError::validation(
            "APPROVER_REQUIRED",
            "Approver is required to approve a leave request",
        ));
    }

    if let Some(approver_id) = input.approved_by_id {
        store
            .find_employee(approver_id)
            .await?
            .ok_or_else(|| AppError::not_found("APPROVER_NOT_FOUND", "Approver not found"))?;
    }

    let leave = store
        .update_leave_status(leave_id, input.status, input.approved_by_id)
        .await?
        .ok_or_else(|| AppError::not_found("LEAVE_NOT_FOUND", "Leave request not found"))?;

    tracing::info!(%leave_id, status = ?leave.status, "Leave request status updated");
    Ok(leave)
}
