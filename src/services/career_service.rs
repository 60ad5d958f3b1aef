//! Probation completion and offboarding.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        EmployeeStatus, OffboardEmployee, OffboardingRecord, ProbationEvaluation,
        ProbationOutcome, ProbationReview,
    },
    repositories::{CareerStore, EmployeeStore},
};

pub async fn complete_probation_with_guards<S>(
    store: &S,
    employee_id: Uuid,
    review: &ProbationReview,
) -> AppResult<ProbationEvaluation>
where
    S: EmployeeStore + CareerStore,
{
    let employee = store
        .find_employee(employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;

    if employee.status != EmployeeStatus::Probation {
        return Err(AppError::illegal_state(
            "EMPLOYEE_NOT_ON_PROBATION",
            "Employee is not on probation",
        ));
    }

    if review.outcome == ProbationOutcome::Extended {
        let today = Utc::now().date_naive();
        match review.extended_until {
            Some(until) if until > today => {}
            _ => {
                return Err(AppError::validation(
                    "INVALID_DATE_RANGE",
                    "Extended probation must end after today",
                ))
            }
        }
    }

    let evaluation = store
        .complete_probation(employee_id, review.outcome.resulting_status(), review)
        .await?;

    tracing::info!(%employee_id, outcome = ?review.outcome, "Probation evaluated");
    Ok(evaluation)
}

pub async fn offboard_with_guards<S>(
    store: &S,
    employee_id: Uuid,
    input: &OffboardEmployee,
) -> AppResult<OffboardingRecord>
where
    S: EmployeeStore + CareerStore,
{
    let employee = store
        .find_employee(employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;

    if employee.status.is_offboarded() {
        return Err(AppError::illegal_state(
            "EMPLOYEE_ALREADY_OFFBOARDED",
            "Employee has already been offboarded",
        ));
    }

    store
        .offboard(employee_id, input.reason.resulting_status(), input)
        .await
}
