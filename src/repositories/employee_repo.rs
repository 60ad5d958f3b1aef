use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{CreateEmployee, CreateDepartment, Department, Employee, EmployeeStatus, UpdateEmployee},
};

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, phone, position, department_id, \
                                manager_id, status, hire_date, created_at, updated_at";

pub struct EmployeeRepository;

impl EmployeeRepository {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, Postgres>,
        search: Option<&str>,
        status: Option<EmployeeStatus>,
        department_id: Option<Uuid>,
    ) {
        builder.push(" WHERE TRUE");

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            builder
                .push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }

        if let Some(department_id) = department_id {
            builder.push(" AND department_id = ").push_bind(department_id);
        }
    }

    /// Page through employees with optional search and filters.
    pub async fn find_all(
        pool: &PgPool,
        limit: i64,
        offset: i64,
        search: Option<&str>,
        status: Option<EmployeeStatus>,
        department_id: Option<Uuid>,
    ) -> AppResult<Vec<Employee>> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees"
        ));
        Self::push_filters(&mut builder, search, status, department_id);
        builder
            .push(" ORDER BY last_name, first_name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let employees = builder
            .build_query_as::<Employee>()
            .fetch_all(pool)
            .await?;

        Ok(employees)
    }

    pub async fn count(
        pool: &PgPool,
        search: Option<&str>,
        status: Option<EmployeeStatus>,
        department_id: Option<Uuid>,
    ) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM employees");
        Self::push_filters(&mut builder, search, status, department_id);

        let (count,) = builder
            .build_query_as::<(i64,)>()
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    pub async fn create(pool: &PgPool, input: &CreateEmployee) -> AppResult<Employee> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            INSERT INTO employees
                (first_name, last_name, email, phone, position, department_id, manager_id, status, hire_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.position)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(input.status.unwrap_or(EmployeeStatus::Probation))
        .bind(input.hire_date)
        .fetch_one(pool)
        .await?;

        Ok(employee)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateEmployee,
    ) -> AppResult<Option<Employee>> {
        let employee = sqlx::query_as::<_, Employee>(&format!(
            r#"
            UPDATE employees
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                position = COALESCE($5, position),
                department_id = COALESCE($6, department_id),
                manager_id = COALESCE($7, manager_id),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EMPLOYEE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.position)
        .bind(input.department_id)
        .bind(input.manager_id)
        .bind(input.status)
        .fetch_optional(pool)
        .await?;

        Ok(employee)
    }

    /// Set the employment status inside a larger transaction.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: EmployeeStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deactivate the user account linked to an employee, if there is one.
    pub async fn deactivate_linked_user(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: Uuid,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = false, updated_at = NOW()
            WHERE employee_id = $1 AND is_active = true
            "#,
        )
        .bind(employee_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub struct DepartmentRepository;

impl DepartmentRepository {
    pub async fn find_all(pool: &PgPool) -> AppResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, description, created_at
            FROM departments
            ORDER BY name
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(departments)
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            SELECT id, name, description, created_at
            FROM departments
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(department)
    }

    pub async fn create(pool: &PgPool, input: &CreateDepartment) -> AppResult<Department> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .fetch_one(pool)
        .await?;

        Ok(department)
    }
}
