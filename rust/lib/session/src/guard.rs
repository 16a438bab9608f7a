//! Route guard: decide whether a view renders, waits, or redirects.

use crate::identity::{Identity, Role};
use crate::permission;
use crate::state::Session;

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const ADMIN_HOME: &str = "/admin";
pub const EMPLOYEE_HOME: &str = "/employee";
pub const CUSTOMER_HOME: &str = "/shop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Startup verification still running; show a loading indicator.
    Loading,
    Render,
    Redirect(String),
}

/// Evaluate a protected view against one session snapshot.
///
/// Checks run in order: settling, authentication, required role, allowed
/// roles. While the session is settling the answer is always `Loading`,
/// never content and never a redirect.
pub fn decide(
    session: &Session,
    required_role: Option<Role>,
    allowed_roles: Option<&[Role]>,
) -> GuardDecision {
    if session.is_settling() {
        return GuardDecision::Loading;
    }
    let identity = match session.identity() {
        Some(identity) if session.is_authenticated() => identity,
        _ => return GuardDecision::Redirect(LOGIN_PATH.to_string()),
    };
    if required_role.is_some_and(|role| identity.role != role) {
        return GuardDecision::Redirect(UNAUTHORIZED_PATH.to_string());
    }
    if allowed_roles.is_some_and(|roles| !permission::has_any_role(Some(identity), roles)) {
        return GuardDecision::Redirect(UNAUTHORIZED_PATH.to_string());
    }
    GuardDecision::Render
}

/// Landing page for a signed-in identity.
pub fn home_for(identity: &Identity) -> &'static str {
    if identity.role == Role::Admin {
        ADMIN_HOME
    } else if permission::is_employee_like(Some(identity)) {
        EMPLOYEE_HOME
    } else {
        CUSTOMER_HOME
    }
}

/// The login screen itself: authenticated users are sent home.
pub fn decide_login(session: &Session) -> GuardDecision {
    if session.is_settling() {
        return GuardDecision::Loading;
    }
    match session.identity() {
        Some(identity) if session.is_authenticated() => {
            GuardDecision::Redirect(home_for(identity).to_string())
        }
        _ => GuardDecision::Render,
    }
}
