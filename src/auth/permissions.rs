use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Serializer};

/// Effective permissions of a user: the union over all held roles, keyed by
/// permission name. Each entry keeps the permission's resource tag so that
/// resource-wide checks compare tags instead of parsing names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    grants: BTreeMap<String, String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, resource: impl Into<String>) {
        self.grants.insert(name.into(), resource.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.grants.contains_key(name)
    }

    pub fn contains_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|n| self.contains(n.as_ref()))
    }

    pub fn contains_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|n| self.contains(n.as_ref()))
    }

    /// True if any held permission is tagged with `resource`.
    pub fn has_resource(&self, resource: &str) -> bool {
        self.grants.values().any(|r| r == resource)
    }

    pub fn names(&self) -> Vec<String> {
        self.grants.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

impl<N: Into<String>, R: Into<String>> FromIterator<(N, R)> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = (N, R)>>(iter: I) -> Self {
        let mut set = PermissionSet::new();
        for (name, resource) in iter {
            set.insert(name, resource);
        }
        set
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.grants.keys())
    }
}

/// Role names held by a user.
pub type RoleSet = BTreeSet<String>;

pub const EMPLOYEE_READ: &str = "employee:read";
pub const EMPLOYEE_CREATE: &str = "employee:create";
pub const EMPLOYEE_UPDATE: &str = "employee:update";
pub const EMPLOYEE_DELETE: &str = "employee:delete";
pub const DEPARTMENT_READ: &str = "department:read";
pub const DEPARTMENT_CREATE: &str = "department:create";
pub const ATTENDANCE_READ: &str = "attendance:read";
pub const ATTENDANCE_CREATE: &str = "attendance:create";
pub const ATTENDANCE_UPDATE: &str = "attendance:update";
pub const ATTENDANCE_SELF: &str = "attendance:self";
pub const LEAVE_READ: &str = "leave:read";
pub const LEAVE_CREATE: &str = "leave:create";
pub const LEAVE_APPROVE: &str = "leave:approve";
pub const LEAVE_SELF: &str = "leave:self";
pub const CAREER_READ: &str = "career:read";
pub const CAREER_UPDATE: &str = "career:update";
pub const RECRUITMENT_READ: &str = "recruitment:read";
pub const RECRUITMENT_CREATE: &str = "recruitment:create";
pub const RECRUITMENT_UPDATE: &str = "recruitment:update";
pub const HR_MANAGE: &str = "hr:manage";
pub const ADMIN_MANAGE_USERS: &str = "admin:manage_users";
pub const ADMIN_MANAGE_SYSTEM: &str = "admin:manage_system";

/// Every permission the system knows about, with a description.
pub const PERMISSION_CATALOG: &[(&str, &str)] = &[
    (EMPLOYEE_READ, "View employee records"),
    (EMPLOYEE_CREATE, "Create employee records"),
    (EMPLOYEE_UPDATE, "Update employee records"),
    (EMPLOYEE_DELETE, "Delete employee records"),
    (DEPARTMENT_READ, "View departments"),
    (DEPARTMENT_CREATE, "Create departments"),
    (ATTENDANCE_READ, "View attendance of any employee"),
    (ATTENDANCE_CREATE, "Record attendance for any employee"),
    (ATTENDANCE_UPDATE, "Correct attendance entries"),
    (ATTENDANCE_SELF, "Check in and out for oneself"),
    (LEAVE_READ, "View leave requests of any employee"),
    (LEAVE_CREATE, "File leave requests for any employee"),
    (LEAVE_APPROVE, "Approve or reject leave requests"),
    (LEAVE_SELF, "File leave requests for oneself"),
    (CAREER_READ, "View probation and offboarding history"),
    (CAREER_UPDATE, "Run probation reviews and offboarding"),
    (RECRUITMENT_READ, "View job postings and candidates"),
    (RECRUITMENT_CREATE, "Create job postings and candidates"),
    (RECRUITMENT_UPDATE, "Update job postings and candidates"),
    (HR_MANAGE, "Full HR back-office access"),
    (ADMIN_MANAGE_USERS, "Assign and remove user roles"),
    (ADMIN_MANAGE_SYSTEM, "Seed reference data and run maintenance"),
];

pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    /// `None` grants the whole catalog.
    pub permissions: Option<&'static [&'static str]>,
}

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: "admin",
        description: "System administrator",
        permissions: None,
    },
    DefaultRole {
        name: "hr_manager",
        description: "HR department staff",
        permissions: Some(&[
            EMPLOYEE_READ,
            EMPLOYEE_CREATE,
            EMPLOYEE_UPDATE,
            EMPLOYEE_DELETE,
            DEPARTMENT_READ,
            DEPARTMENT_CREATE,
            ATTENDANCE_READ,
            ATTENDANCE_CREATE,
            ATTENDANCE_UPDATE,
            LEAVE_READ,
            LEAVE_CREATE,
            LEAVE_APPROVE,
            CAREER_READ,
            CAREER_UPDATE,
            RECRUITMENT_READ,
            RECRUITMENT_CREATE,
            RECRUITMENT_UPDATE,
            HR_MANAGE,
        ]),
    },
    DefaultRole {
        name: "manager",
        description: "Line manager",
        permissions: Some(&[
            EMPLOYEE_READ,
            DEPARTMENT_READ,
            ATTENDANCE_READ,
            LEAVE_READ,
            LEAVE_APPROVE,
            CAREER_READ,
        ]),
    },
    DefaultRole {
        name: "employee",
        description: "Regular employee (self-service)",
        permissions: Some(&[ATTENDANCE_SELF, LEAVE_SELF]),
    },
];

/// Role given to newly registered accounts.
pub const DEFAULT_SIGNUP_ROLE: &str = "employee";

impl DefaultRole {
    pub fn permission_names(&self) -> Vec<&'static str> {
        match self.permissions {
            Some(names) => names.to_vec(),
            None => PERMISSION_CATALOG.iter().map(|(name, _)| *name).collect(),
        }
    }
}

/// Split `resource:action`. Names without a separator are all resource.
pub fn split_permission_name(name: &str) -> (&str, &str) {
    name.split_once(':').unwrap_or((name, ""))
}
