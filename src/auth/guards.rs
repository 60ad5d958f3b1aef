//! Route-level authorization guards.
//!
//! A [`Guard`] is attached to a route with [`guarded`]. It runs after
//! [`auth_middleware`](super::auth_middleware) and reads the [`CurrentUser`]
//! that middleware stored in the request extensions. Guards fail closed.

use std::collections::HashMap;

use axum::{
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use serde_json::json;
use uuid::Uuid;

use super::CurrentUser;
use crate::error::{AppError, AppResult};

/// Resource tags that grant access to any employee record.
const EMPLOYEE_ACCESS_RESOURCES: &[&str] = &["employee", "hr"];

#[derive(Debug, Clone)]
pub enum Guard {
    Permission(&'static str),
    AnyPermission(Vec<&'static str>),
    AllPermissions(Vec<&'static str>),
    Role(&'static str),
    AnyRole(Vec<&'static str>),
    /// The path parameter must equal the caller's *user* id, unless the
    /// caller holds the permission. Only meaningful on routes whose id is a
    /// user id; it does not look up owners of other entity types.
    OwnershipOrPermission {
        param: &'static str,
        permission: &'static str,
    },
    /// The path parameter must equal the caller's linked employee id, unless
    /// the caller holds any employee- or hr-tagged permission.
    EmployeeAccess { param: &'static str },
}

pub fn require_permission(name: &'static str) -> Guard {
    Guard::Permission(name)
}

pub fn require_any_permission(names: &[&'static str]) -> Guard {
    Guard::AnyPermission(names.to_vec())
}

pub fn require_all_permissions(names: &[&'static str]) -> Guard {
    Guard::AllPermissions(names.to_vec())
}

pub fn require_role(name: &'static str) -> Guard {
    Guard::Role(name)
}

pub fn require_any_role(names: &[&'static str]) -> Guard {
    Guard::AnyRole(names.to_vec())
}

pub fn require_ownership_or_permission(param: &'static str, permission: &'static str) -> Guard {
    Guard::OwnershipOrPermission { param, permission }
}

pub fn require_employee_access(param: &'static str) -> Guard {
    Guard::EmployeeAccess { param }
}

fn insufficient_permission(required: &[&str]) -> AppError {
    AppError::forbidden(
        "INSUFFICIENT_PERMISSION",
        "Insufficient permissions",
        Some(json!({ "required": required })),
    )
}

fn insufficient_role(required: &[&str]) -> AppError {
    AppError::forbidden(
        "INSUFFICIENT_ROLE",
        "Insufficient role",
        Some(json!({ "required": required })),
    )
}

fn path_uuid(params: &HashMap<String, String>, name: &str) -> Option<Uuid> {
    params.get(name).and_then(|v| Uuid::parse_str(v).ok())
}

impl Guard {
    /// Evaluate the guard. `params` are the matched path parameters.
    pub fn check(
        &self,
        user: Option<&CurrentUser>,
        params: &HashMap<String, String>,
    ) -> AppResult<()> {
        let user = user.ok_or_else(AppError::authentication_required)?;

        match self {
            Guard::Permission(name) => {
                if user.permissions.contains(name) {
                    return Ok(());
                }
                Err(insufficient_permission(&[*name]))
            }
            Guard::AnyPermission(names) => {
                if user.permissions.contains_any(names.as_slice()) {
                    return Ok(());
                }
                Err(insufficient_permission(names))
            }
            Guard::AllPermissions(names) => {
                if user.permissions.contains_all(names.as_slice()) {
                    return Ok(());
                }
                Err(insufficient_permission(names))
            }
            Guard::Role(name) => {
                if user.has_role(name) {
                    return Ok(());
                }
                Err(insufficient_role(&[*name]))
            }
            Guard::AnyRole(names) => {
                if names.iter().any(|n| user.has_role(n)) {
                    return Ok(());
                }
                Err(insufficient_role(names))
            }
            Guard::OwnershipOrPermission { param, permission } => {
                if path_uuid(params, param) == Some(user.user_id)
                    || user.permissions.contains(permission)
                {
                    return Ok(());
                }
                Err(AppError::forbidden(
                    "INSUFFICIENT_PERMISSION",
                    "You can only access your own resources",
                    Some(json!({ "required": [permission] })),
                ))
            }
            Guard::EmployeeAccess { param } => {
                let privileged = EMPLOYEE_ACCESS_RESOURCES
                    .iter()
                    .any(|r| user.permissions.has_resource(r));
                let own_record = match (path_uuid(params, param), user.user.employee_id) {
                    (Some(requested), Some(own)) => requested == own,
                    _ => false,
                };
                if privileged || own_record {
                    return Ok(());
                }
                Err(AppError::forbidden(
                    "INSUFFICIENT_PERMISSION",
                    "You can only access your own employee record",
                    None,
                ))
            }
        }
    }
}

/// Middleware evaluating the guard held in its state.
pub async fn enforce(
    State(guard): State<Guard>,
    params: Option<Path<HashMap<String, String>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = params.map(|Path(p)| p).unwrap_or_default();

    {
        let user = request.extensions().get::<CurrentUser>();
        if let Err(e) = guard.check(user, &params) {
            tracing::debug!(
                guard = ?guard,
                user_id = ?user.map(|u| u.user_id),
                code = e.code(),
                "Guard rejected request"
            );
            return Err(e);
        }
    }

    Ok(next.run(request).await)
}

/// Attach a guard to a method router.
pub fn guarded<S>(route: MethodRouter<S>, guard: Guard) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(guard, enforce))
}
