mod attendance;
mod career;
mod employee;
mod leave;
mod pagination;
mod response;
mod role;
mod user;

pub use attendance::{Attendance, AttendanceStatus, ClockRequest, RecordAttendance};
pub use career::{
    OffboardEmployee, OffboardingReason, OffboardingRecord, ProbationEvaluation, ProbationOutcome,
    ProbationReview,
};
pub use employee::{
    CreateDepartment, CreateEmployee, Department, Employee, EmployeeListParams, EmployeeStatus,
    UpdateEmployee,
};
pub use leave::{CreateLeaveRequest, LeaveRequest, LeaveStatus, LeaveType, UpdateLeaveStatus};
pub(crate) use pagination::{default_page, default_per_page};
pub use pagination::{PaginationMeta, PaginationParams};
pub use response::{ApiResponse, MessageResponse};
pub use role::{Role, RoleAssignment, RolesAndPermissions};
pub use user::{ChangePassword, CreateUser, UpdateProfile, User, UserProfile};
