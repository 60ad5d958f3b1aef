use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::{
    error::{ErrorBody, ErrorResponse},
    handlers::{
        auth_handlers::{
            __path_assign_role, __path_change_password, __path_check_permission,
            __path_clean_expired_tokens, __path_create_default_roles, __path_get_profile,
            __path_login, __path_logout, __path_logout_all, __path_refresh_token,
            __path_register, __path_remove_role, __path_roles_permissions,
            __path_update_profile, __path_verify_token, CountResponse, RoleChangeResponse,
        },
        hr_handlers::{
            __path_check_in, __path_check_out, __path_complete_probation,
            __path_create_department, __path_create_employee, __path_create_leave_request,
            __path_employee_attendance, __path_employee_leave_requests, __path_get_employee,
            __path_list_departments, __path_list_employees, __path_offboard_employee,
            __path_record_attendance, __path_update_employee, __path_update_leave_status,
        },
        user_handlers::__path_get_user,
    },
    models::{
        Attendance, AttendanceStatus, ChangePassword, ClockRequest, CreateDepartment,
        CreateEmployee, CreateLeaveRequest, CreateUser, Department, Employee, EmployeeStatus,
        LeaveRequest, LeaveStatus, LeaveType, MessageResponse, OffboardEmployee,
        OffboardingReason, OffboardingRecord, PaginationMeta, ProbationEvaluation,
        ProbationOutcome, ProbationReview, RecordAttendance, Role, RoleAssignment,
        RolesAndPermissions, UpdateEmployee, UpdateLeaveStatus, UpdateProfile, User, UserProfile,
    },
    services::{
        AccessTokenResponse, AuthResponse, CheckPermissionRequest, CheckPermissionResponse,
        LoginRequest, LogoutRequest, RefreshTokenRequest, SeedSummary, TokenIntrospection,
        VerifyTokenRequest,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        description = "Human resources backend with token-based authentication and role-based access control. \
                       Protected endpoints require an access token in the Authorization header (Bearer scheme). \
                       Permissions are resolved from the database on every request, so role changes apply immediately. \
                       Responses use the envelope `{\"success\": true, \"data\": ...}`; failures use \
                       `{\"success\": false, \"error\": {\"message\", \"code\", \"details\"?}}`.",
        version = "0.1.0",
        license(name = "Proprietary"),
    ),
    tags(
        (name = "auth", description = "Registration, login, refresh tokens, profile and role administration. \
                                        Access tokens expire after 15 minutes by default; refresh tokens after 7 days."),
        (name = "users", description = "User account lookup. Users can read their own account."),
        (name = "departments", description = "Department catalog."),
        (name = "employees", description = "Employee records. Accounts linked to an employee can read their own record."),
        (name = "attendance", description = "Attendance entries, check-in and check-out."),
        (name = "leave", description = "Leave requests and approvals."),
        (name = "career", description = "Probation outcomes and offboarding.")
    ),
    paths(
        // Auth
        register,
        login,
        refresh_token,
        logout,
        verify_token,
        check_permission,
        logout_all,
        get_profile,
        update_profile,
        roles_permissions,
        change_password,
        assign_role,
        remove_role,
        create_default_roles,
        clean_expired_tokens,
        // Users
        get_user,
        // HR
        list_departments,
        create_department,
        list_employees,
        create_employee,
        get_employee,
        update_employee,
        employee_attendance,
        employee_leave_requests,
        record_attendance,
        check_in,
        check_out,
        create_leave_request,
        update_leave_status,
        complete_probation,
        offboard_employee,
    ),
    components(
        schemas(
            // Auth
            CreateUser,
            LoginRequest,
            AuthResponse,
            RefreshTokenRequest,
            AccessTokenResponse,
            LogoutRequest,
            VerifyTokenRequest,
            TokenIntrospection,
            CheckPermissionRequest,
            CheckPermissionResponse,
            UserProfile,
            UpdateProfile,
            ChangePassword,
            RoleAssignment,
            RoleChangeResponse,
            RolesAndPermissions,
            SeedSummary,
            CountResponse,
            MessageResponse,
            User,
            Role,
            // HR
            Department,
            CreateDepartment,
            Employee,
            EmployeeStatus,
            CreateEmployee,
            UpdateEmployee,
            Attendance,
            AttendanceStatus,
            RecordAttendance,
            ClockRequest,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            CreateLeaveRequest,
            UpdateLeaveStatus,
            ProbationEvaluation,
            ProbationOutcome,
            ProbationReview,
            OffboardingRecord,
            OffboardingReason,
            OffboardEmployee,
            // Pagination
            PaginationMeta,
            // Errors
            ErrorResponse,
            ErrorBody,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
