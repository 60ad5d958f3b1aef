use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "employee_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    Active,
    Inactive,
    Probation,
    Terminated,
    Resigned,
}

impl EmployeeStatus {
    /// Statuses that block new attendance entries.
    pub fn blocks_attendance(self) -> bool {
        matches!(self, EmployeeStatus::Terminated | EmployeeStatus::Inactive)
    }

    /// Statuses that mean the employee has already left.
    pub fn is_offboarded(self) -> bool {
        matches!(self, EmployeeStatus::Terminated | EmployeeStatus::Resigned)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    pub phone: Option<String>,
    #[schema(example = "Payroll Specialist")]
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: EmployeeStatus,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    /// Defaults to `PROBATION`
    pub status: Option<EmployeeStatus>,
    pub hire_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department_id: Option<Uuid>,
    pub manager_id: Option<Uuid>,
    pub status: Option<EmployeeStatus>,
}

/// Query parameters for the employee list
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeListParams {
    #[param(minimum = 1, default = 1, example = 1)]
    #[serde(default = "super::pagination::default_page")]
    pub page: i64,
    #[param(minimum = 1, maximum = 100, default = 20, example = 20)]
    #[serde(default = "super::pagination::default_per_page")]
    pub per_page: i64,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub department_id: Option<Uuid>,
}

impl EmployeeListParams {
    pub fn pagination(&self) -> super::PaginationParams {
        super::PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Department {
    pub id: Uuid,
    #[schema(example = "Finance")]
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Finance")]
    pub name: String,
    pub description: Option<String>,
}
