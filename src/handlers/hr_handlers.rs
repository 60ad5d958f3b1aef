use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth::{
        guarded, perms, require_all_permissions, require_any_permission,
        require_employee_access, require_permission, CurrentUser,
    },
    error::{AppError, AppResult, ErrorResponse},
    extract::{Json, Path, Query},
    models::{
        ApiResponse, Attendance, ClockRequest, CreateDepartment, CreateEmployee,
        CreateLeaveRequest, Department, Employee, EmployeeListParams, LeaveRequest,
        OffboardEmployee, OffboardingRecord, PaginationMeta, PaginationParams,
        ProbationEvaluation, ProbationReview, RecordAttendance, UpdateEmployee, UpdateLeaveStatus,
    },
    repositories::{AttendanceRepository, DepartmentRepository, EmployeeRepository, LeaveRepository},
    services::{
        check_in_with_guards, check_out_with_guards, complete_probation_with_guards,
        create_leave_request_with_guards, ensure_self_or_permission, offboard_with_guards,
        record_attendance_with_guards, update_leave_status_with_guards,
    },
    AppState,
};

/// Query parameters for an employee's attendance history
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceListParams {
    #[param(minimum = 1, default = 1, example = 1)]
    #[serde(default = "crate::models::default_page")]
    pub page: i64,
    #[param(minimum = 1, maximum = 100, default = 20, example = 20)]
    #[serde(default = "crate::models::default_per_page")]
    pub per_page: i64,
    /// Earliest date, inclusive
    #[param(example = "2024-01-01")]
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    #[param(example = "2024-01-31")]
    pub to: Option<NaiveDate>,
}

impl AttendanceListParams {
    fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

async fn existing_employee(state: &AppState, id: Uuid) -> AppResult<Employee> {
    EmployeeRepository::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(AppError::employee_not_found)
}

// ============================================================================
// Departments
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/hr/departments",
    tag = "departments",
    operation_id = "listDepartments",
    summary = "List departments",
    description = "Requires `department:read`.",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All departments ordered by name", body = [Department]),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
async fn list_departments(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<Department>>> {
    let departments = DepartmentRepository::find_all(&state.pool).await?;
    Ok(ApiResponse::ok(departments))
}

#[utoipa::path(
    post,
    path = "/api/hr/departments",
    tag = "departments",
    operation_id = "createDepartment",
    summary = "Create a department",
    description = "Requires `department:create`. Department names are unique.",
    security(("bearer_auth" = [])),
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 409, description = "Name already in use", body = ErrorResponse)
    )
)]
async fn create_department(
    State(state): State<AppState>,
    Json(input): Json<CreateDepartment>,
) -> AppResult<(StatusCode, ApiResponse<Department>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::validation(
            "INVALID_DEPARTMENT_NAME",
            "Department name cannot be empty",
        ));
    }

    if DepartmentRepository::find_by_name(&state.pool, &input.name)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "DEPARTMENT_EXISTS",
            "A department with this name already exists",
        ));
    }

    let department = DepartmentRepository::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(department)))
}

// ============================================================================
// Employees
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/hr/employees",
    tag = "employees",
    operation_id = "listEmployees",
    summary = "List employees",
    description = "Requires `employee:read`. Supports search by name or email and filters by status and department.",
    security(("bearer_auth" = [])),
    params(EmployeeListParams),
    responses(
        (status = 200, description = "Page of employees with `meta` pagination", body = [Employee]),
        (status = 403, description = "Missing permission", body = ErrorResponse)
    )
)]
async fn list_employees(
    State(state): State<AppState>,
    Query(params): Query<EmployeeListParams>,
) -> AppResult<ApiResponse<Vec<Employee>>> {
    let search = params.search.as_deref().filter(|s| !s.trim().is_empty());
    let page = params.pagination();

    let employees = EmployeeRepository::find_all(
        &state.pool,
        page.limit(),
        page.offset(),
        search,
        params.status,
        params.department_id,
    )
    .await?;
    let total = EmployeeRepository::count(&state.pool, search, params.status, params.department_id)
        .await?;

    Ok(ApiResponse::paginated(
        employees,
        PaginationMeta::new(page.page(), page.limit(), total),
    ))
}

#[utoipa::path(
    post,
    path = "/api/hr/employees",
    tag = "employees",
    operation_id = "createEmployee",
    summary = "Create an employee",
    description = "Requires `employee:create`. New employees start on probation unless a status is given.",
    security(("bearer_auth" = [])),
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Missing name or email", body = ErrorResponse),
        (status = 409, description = "Email already used by another employee", body = ErrorResponse)
    )
)]
async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<CreateEmployee>,
) -> AppResult<(StatusCode, ApiResponse<Employee>)> {
    if input.first_name.trim().is_empty()
        || input.last_name.trim().is_empty()
        || !input.email.contains('@')
    {
        return Err(AppError::validation(
            "INVALID_EMPLOYEE",
            "First name, last name and a valid email are required",
        ));
    }

    if EmployeeRepository::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(AppError::conflict(
            "EMPLOYEE_EMAIL_TAKEN",
            "An employee with this email already exists",
        ));
    }

    let employee = EmployeeRepository::create(&state.pool, &input).await?;
    tracing::info!(employee_id = %employee.id, "Employee created");

    Ok((StatusCode::CREATED, ApiResponse::ok(employee)))
}

#[utoipa::path(
    get,
    path = "/api/hr/employees/{employee_id}",
    tag = "employees",
    operation_id = "getEmployee",
    summary = "Get an employee",
    description = "Callers holding any `employee` or `hr` permission may read any record; \
                   everyone else only the record linked to their account.",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = Employee),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<ApiResponse<Employee>> {
    let employee = existing_employee(&state, employee_id).await?;
    Ok(ApiResponse::ok(employee))
}

#[utoipa::path(
    put,
    path = "/api/hr/employees/{employee_id}",
    tag = "employees",
    operation_id = "updateEmployee",
    summary = "Update an employee",
    description = "Requires `employee:update`. Omitted fields are left unchanged.",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Updated employee", body = Employee),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<UpdateEmployee>,
) -> AppResult<ApiResponse<Employee>> {
    let employee = EmployeeRepository::update(&state.pool, employee_id, &input)
        .await?
        .ok_or_else(AppError::employee_not_found)?;
    Ok(ApiResponse::ok(employee))
}

#[utoipa::path(
    get,
    path = "/api/hr/employees/{employee_id}/attendance",
    tag = "attendance",
    operation_id = "listEmployeeAttendance",
    summary = "Attendance history of an employee",
    security(("bearer_auth" = [])),
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        AttendanceListParams
    ),
    responses(
        (status = 200, description = "Page of attendance entries, newest first", body = [Attendance]),
        (status = 400, description = "`from` is after `to`", body = ErrorResponse),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn employee_attendance(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(params): Query<AttendanceListParams>,
) -> AppResult<ApiResponse<Vec<Attendance>>> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if from > to {
            return Err(AppError::validation(
                "INVALID_DATE_RANGE",
                "`from` must not be after `to`",
            ));
        }
    }
    existing_employee(&state, employee_id).await?;

    let page = params.pagination();
    let rows = AttendanceRepository::find_for_employee(
        &state.pool,
        employee_id,
        params.from,
        params.to,
        page.limit(),
        page.offset(),
    )
    .await?;
    let total =
        AttendanceRepository::count_for_employee(&state.pool, employee_id, params.from, params.to)
            .await?;

    Ok(ApiResponse::paginated(
        rows,
        PaginationMeta::new(page.page(), page.limit(), total),
    ))
}

#[utoipa::path(
    get,
    path = "/api/hr/employees/{employee_id}/leave-requests",
    tag = "leave",
    operation_id = "listEmployeeLeaveRequests",
    summary = "Leave requests of an employee",
    security(("bearer_auth" = [])),
    params(
        ("employee_id" = Uuid, Path, description = "Employee ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Page of leave requests", body = [LeaveRequest]),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn employee_leave_requests(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Query(page): Query<PaginationParams>,
) -> AppResult<ApiResponse<Vec<LeaveRequest>>> {
    existing_employee(&state, employee_id).await?;

    let rows =
        LeaveRepository::find_for_employee(&state.pool, employee_id, page.limit(), page.offset())
            .await?;
    let total = LeaveRepository::count_for_employee(&state.pool, employee_id).await?;

    Ok(ApiResponse::paginated(
        rows,
        PaginationMeta::new(page.page(), page.limit(), total),
    ))
}

// ============================================================================
// Attendance
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/hr/attendance",
    tag = "attendance",
    operation_id = "recordAttendance",
    summary = "Record an attendance entry",
    description = "Requires `attendance:create`. Overwrites any entry for the same employee and date.",
    security(("bearer_auth" = [])),
    request_body = RecordAttendance,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 400, description = "Employee inactive or check-out before check-in", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn record_attendance(
    State(state): State<AppState>,
    Json(input): Json<RecordAttendance>,
) -> AppResult<(StatusCode, ApiResponse<Attendance>)> {
    let attendance = record_attendance_with_guards(&state.store(), &input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(attendance)))
}

#[utoipa::path(
    post,
    path = "/api/hr/attendance/check-in",
    tag = "attendance",
    operation_id = "checkIn",
    summary = "Check in for today",
    description = "Requires `attendance:create`, or `attendance:self` for the caller's own employee record.",
    security(("bearer_auth" = [])),
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Today's attendance entry", body = Attendance),
        (status = 400, description = "Employee inactive", body = ErrorResponse),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn check_in(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<ClockRequest>,
) -> AppResult<ApiResponse<Attendance>> {
    ensure_self_or_permission(&current, input.employee_id, perms::ATTENDANCE_CREATE)?;
    let attendance = check_in_with_guards(&state.store(), &input).await?;
    Ok(ApiResponse::ok(attendance))
}

#[utoipa::path(
    post,
    path = "/api/hr/attendance/check-out",
    tag = "attendance",
    operation_id = "checkOut",
    summary = "Check out for today",
    description = "Requires `attendance:create`, or `attendance:self` for the caller's own employee record.",
    security(("bearer_auth" = [])),
    request_body = ClockRequest,
    responses(
        (status = 200, description = "Today's attendance entry", body = Attendance),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found or no check-in today", body = ErrorResponse)
    )
)]
async fn check_out(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<ClockRequest>,
) -> AppResult<ApiResponse<Attendance>> {
    ensure_self_or_permission(&current, input.employee_id, perms::ATTENDANCE_CREATE)?;
    let attendance = check_out_with_guards(&state.store(), &input).await?;
    Ok(ApiResponse::ok(attendance))
}

// ============================================================================
// Leave
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/hr/leave-requests",
    tag = "leave",
    operation_id = "createLeaveRequest",
    summary = "Submit a leave request",
    description = "Requires `leave:create`, or `leave:self` for the caller's own employee record.",
    security(("bearer_auth" = [])),
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Leave request created as PENDING", body = LeaveRequest),
        (status = 400, description = "Start date after end date", body = ErrorResponse),
        (status = 403, description = "Not your record", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn create_leave_request(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(input): Json<CreateLeaveRequest>,
) -> AppResult<(StatusCode, ApiResponse<LeaveRequest>)> {
    ensure_self_or_permission(&current, input.employee_id, perms::LEAVE_CREATE)?;
    let leave = create_leave_request_with_guards(&state.store(), &input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(leave)))
}

#[utoipa::path(
    put,
    path = "/api/hr/leave-requests/{leave_id}/status",
    tag = "leave",
    operation_id = "updateLeaveStatus",
    summary = "Approve, reject or cancel a leave request",
    description = "Requires `leave:approve`. Approvals must name the approving employee.",
    security(("bearer_auth" = [])),
    params(("leave_id" = Uuid, Path, description = "Leave request ID")),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Updated leave request", body = LeaveRequest),
        (status = 400, description = "Approver missing", body = ErrorResponse),
        (status = 404, description = "Approver or leave request not found", body = ErrorResponse)
    )
)]
async fn update_leave_status(
    State(state): State<AppState>,
    Path(leave_id): Path<Uuid>,
    Json(input): Json<UpdateLeaveStatus>,
) -> AppResult<ApiResponse<LeaveRequest>> {
    let leave = update_leave_status_with_guards(&state.store(), leave_id, &input).await?;
    Ok(ApiResponse::ok(leave))
}

// ============================================================================
// Career
// ============================================================================

#[utoipa::path(
    post,
    path = "/api/hr/employees/{employee_id}/probation",
    tag = "career",
    operation_id = "completeProbation",
    summary = "Record the outcome of an employee's probation",
    description = "Requires `career:update` and `employee:update`. PASSED activates the employee, \
                   FAILED terminates them, EXTENDED keeps them on probation until `extended_until`.",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    request_body = ProbationReview,
    responses(
        (status = 201, description = "Evaluation recorded", body = ProbationEvaluation),
        (status = 400, description = "Employee not on probation or invalid extension date", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn complete_probation(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(review): Json<ProbationReview>,
) -> AppResult<(StatusCode, ApiResponse<ProbationEvaluation>)> {
    let evaluation = complete_probation_with_guards(&state.store(), employee_id, &review).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(evaluation)))
}

#[utoipa::path(
    post,
    path = "/api/hr/employees/{employee_id}/offboarding",
    tag = "career",
    operation_id = "offboardEmployee",
    summary = "Offboard an employee",
    description = "Requires `career:update` and `employee:update`. Also deactivates the linked \
                   user account and revokes its refresh tokens.",
    security(("bearer_auth" = [])),
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    request_body = OffboardEmployee,
    responses(
        (status = 201, description = "Offboarding recorded", body = OffboardingRecord),
        (status = 400, description = "Employee already offboarded", body = ErrorResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse)
    )
)]
async fn offboard_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(input): Json<OffboardEmployee>,
) -> AppResult<(StatusCode, ApiResponse<OffboardingRecord>)> {
    let record = offboard_with_guards(&state.store(), employee_id, &input).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(record)))
}

/// Create HR routes. All of them expect an authenticated caller.
pub fn hr_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/departments",
            guarded(get(list_departments), require_permission(perms::DEPARTMENT_READ)).merge(
                guarded(post(create_department), require_permission(perms::DEPARTMENT_CREATE)),
            ),
        )
        .route(
            "/employees",
            guarded(get(list_employees), require_permission(perms::EMPLOYEE_READ)).merge(
                guarded(post(create_employee), require_permission(perms::EMPLOYEE_CREATE)),
            ),
        )
        .route(
            "/employees/:employee_id",
            guarded(get(get_employee), require_employee_access("employee_id")).merge(guarded(
                put(update_employee),
                require_permission(perms::EMPLOYEE_UPDATE),
            )),
        )
        .route(
            "/employees/:employee_id/attendance",
            guarded(get(employee_attendance), require_employee_access("employee_id")),
        )
        .route(
            "/employees/:employee_id/leave-requests",
            guarded(get(employee_leave_requests), require_employee_access("employee_id")),
        )
        .route(
            "/employees/:employee_id/probation",
            guarded(
                post(complete_probation),
                require_all_permissions(&[perms::CAREER_UPDATE, perms::EMPLOYEE_UPDATE]),
            ),
        )
        .route(
            "/employees/:employee_id/offboarding",
            guarded(
                post(offboard_employee),
                require_all_permissions(&[perms::CAREER_UPDATE, perms::EMPLOYEE_UPDATE]),
            ),
        )
        .route(
            "/attendance",
            guarded(post(record_attendance), require_permission(perms::ATTENDANCE_CREATE)),
        )
        .route(
            "/attendance/check-in",
            guarded(
                post(check_in),
                require_any_permission(&[perms::ATTENDANCE_CREATE, perms::ATTENDANCE_SELF]),
            ),
        )
        .route(
            "/attendance/check-out",
            guarded(
                post(check_out),
                require_any_permission(&[perms::ATTENDANCE_CREATE, perms::ATTENDANCE_SELF]),
            ),
        )
        .route(
            "/leave-requests",
            guarded(
                post(create_leave_request),
                require_any_permission(&[perms::LEAVE_CREATE, perms::LEAVE_SELF]),
            ),
        )
        .route(
            "/leave-requests/:leave_id/status",
            guarded(put(update_leave_status), require_permission(perms::LEAVE_APPROVE)),
        )
}
