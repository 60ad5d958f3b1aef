mod access;
mod attendance_service;
mod auth_service;
mod career_service;
mod leave_service;
mod permission_service;
mod token_service;

pub use access::ensure_self_or_permission;
pub use attendance_service::{
    check_in_with_guards, check_out_with_guards, record_attendance_with_guards,
};
pub use auth_service::{
    AccessTokenResponse, AuthResponse, AuthService, CheckPermissionRequest,
    CheckPermissionResponse, LoginRequest, LogoutRequest, RefreshTokenRequest,
    TokenIntrospection, VerifyTokenRequest,
};
pub use career_service::{complete_probation_with_guards, offboard_with_guards};
pub use leave_service::{create_leave_request_with_guards, update_leave_status_with_guards};
pub use permission_service::{PermissionService, SeedSummary};
pub use token_service::{IssuedRefreshToken, TokenService};
