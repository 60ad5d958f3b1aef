mod attendance_repo;
mod career_repo;
mod employee_repo;
mod leave_repo;
mod permission_repo;
mod refresh_token_repo;
mod role_repo;
mod store;
mod user_repo;

pub use attendance_repo::AttendanceRepository;
pub use career_repo::CareerRepository;
pub use employee_repo::{DepartmentRepository, EmployeeRepository};
pub use leave_repo::LeaveRepository;
pub use permission_repo::PermissionRepository;
pub use refresh_token_repo::{RefreshTokenRecord, RefreshTokenRepository};
pub use role_repo::RoleRepository;
pub use store::{AttendanceStore, CareerStore, EmployeeStore, LeaveStore, PgStore};
pub use user_repo::UserRepository;
