mod guards;
mod jwt;
mod middleware;
mod password;
mod permissions;

pub use guards::{
    enforce, guarded, require_all_permissions, require_any_permission, require_any_role,
    require_employee_access, require_ownership_or_permission, require_permission, require_role,
    Guard,
};
pub use jwt::{decode_token, encode_token, Claims};
pub use middleware::{auth_middleware, optional_auth_middleware, CurrentUser, MaybeUser};
pub use password::{hash_password, validate_password, verify_password};
pub use permissions::{
    split_permission_name, DefaultRole, PermissionSet, RoleSet, DEFAULT_ROLES,
    DEFAULT_SIGNUP_ROLE, PERMISSION_CATALOG,
};

pub mod perms {
    pub use super::permissions::{
        ADMIN_MANAGE_SYSTEM, ADMIN_MANAGE_USERS, ATTENDANCE_CREATE, ATTENDANCE_READ,
        ATTENDANCE_SELF, ATTENDANCE_UPDATE, CAREER_READ, CAREER_UPDATE, DEPARTMENT_CREATE,
        DEPARTMENT_READ, EMPLOYEE_CREATE, EMPLOYEE_DELETE, EMPLOYEE_READ, EMPLOYEE_UPDATE,
        HR_MANAGE, LEAVE_APPROVE, LEAVE_CREATE, LEAVE_READ, LEAVE_SELF, RECRUITMENT_CREATE,
        RECRUITMENT_READ, RECRUITMENT_UPDATE,
    };
}
