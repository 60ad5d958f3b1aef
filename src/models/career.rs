use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::EmployeeStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "probation_outcome", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbationOutcome {
    Passed,
    Failed,
    Extended,
}

impl ProbationOutcome {
    /// Employee status after the evaluation is applied.
    pub fn resulting_status(self) -> EmployeeStatus {
        match self {
            ProbationOutcome::Passed => EmployeeStatus::Active,
            ProbationOutcome::Failed => EmployeeStatus::Terminated,
            ProbationOutcome::Extended => EmployeeStatus::Probation,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ProbationEvaluation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub outcome: ProbationOutcome,
    pub evaluator_id: Option<Uuid>,
    pub comments: Option<String>,
    pub extended_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ProbationReview {
    pub outcome: ProbationOutcome,
    pub evaluator_id: Option<Uuid>,
    pub comments: Option<String>,
    /// Required when `outcome` is `EXTENDED`
    pub extended_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "offboarding_reason", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OffboardingReason {
    Resignation,
    Termination,
}

impl OffboardingReason {
    pub fn resulting_status(self) -> EmployeeStatus {
        match self {
            OffboardingReason::Resignation => EmployeeStatus::Resigned,
            OffboardingReason::Termination => EmployeeStatus::Terminated,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OffboardingRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub reason: OffboardingReason,
    pub last_working_day: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OffboardEmployee {
    pub reason: OffboardingReason,
    pub last_working_day: NaiveDate,
    pub notes: Option<String>,
}
