//! Permission and role checks over an optional identity.
//!
//! Administrators pass every permission check regardless of their explicit
//! permission set. Role checks compare the role tag directly.

use crate::identity::{Identity, Role};

/// Role `admin` or the server's `is_admin` flag.
pub fn is_admin(identity: &Identity) -> bool {
    identity.role == Role::Admin || identity.is_admin
}

pub fn has_permission(identity: Option<&Identity>, permission: &str) -> bool {
    match identity {
        None => false,
        Some(id) if is_admin(id) => true,
        Some(id) => id.permissions.contains(permission),
    }
}

pub fn has_any_permission<S: AsRef<str>>(identity: Option<&Identity>, permissions: &[S]) -> bool {
    match identity {
        None => false,
        Some(id) if is_admin(id) => true,
        Some(id) => permissions
            .iter()
            .any(|p| id.permissions.contains(p.as_ref())),
    }
}

/// An empty list is vacuously satisfied by any present identity.
pub fn has_all_permissions<S: AsRef<str>>(identity: Option<&Identity>, permissions: &[S]) -> bool {
    match identity {
        None => false,
        Some(id) if is_admin(id) => true,
        Some(id) => permissions
            .iter()
            .all(|p| id.permissions.contains(p.as_ref())),
    }
}

pub fn has_role(identity: Option<&Identity>, role: Role) -> bool {
    identity.is_some_and(|id| id.role == role)
}

pub fn has_any_role(identity: Option<&Identity>, roles: &[Role]) -> bool {
    identity.is_some_and(|id| roles.contains(&id.role))
}

/// Employee or manager, by role tag only.
pub fn is_employee_like(identity: Option<&Identity>) -> bool {
    identity.is_some_and(|id| id.role.is_employee_like())
}

pub fn is_customer(identity: Option<&Identity>) -> bool {
    has_role(identity, Role::Customer)
}
