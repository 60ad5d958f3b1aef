use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{AppError, AppResult},
};

/// Callers holding `permission` may act for any employee; everyone else only
/// for the employee record linked to their own account.
pub fn ensure_self_or_permission(
    current: &CurrentUser,
    employee_id: Uuid,
    permission: &'static str,
) -> AppResult<()> {
    if current.has_permission(permission) || current.user.employee_id == Some(employee_id) {
        return Ok(());
    }

    Err(AppError::forbidden(
        "INSUFFICIENT_PERMISSION",
        "You can only act on your own employee record",
        Some(serde_json::json!({ "required": [permission] })),
    ))
}
