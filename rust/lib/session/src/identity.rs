//! Authenticated principal as returned by `/auth/me/` and `/auth/login/`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role tag carried by an identity.
///
/// Routing compares these tags directly; permission checks only look at
/// whether the identity is an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Employee,
    Customer,
    /// Any role string the server sends that this client doesn't know.
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
            Role::Customer => "customer",
            Role::Unknown => "unknown",
        }
    }

    /// Staff roles that land on the employee home.
    pub fn is_employee_like(&self) -> bool {
        matches!(self, Role::Employee | Role::Manager)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user identity.
///
/// `role` is fixed for the lifetime of a session. `permissions` is only
/// ever replaced as a whole, when a fresh identity arrives from the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,

    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    pub role: Role,

    /// Coarse account type from the server (`admin`, `staff`, `customer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    #[serde(default)]
    pub is_admin: bool,

    #[serde(default)]
    pub is_employee: bool,

    #[serde(default)]
    pub is_customer: bool,

    /// Granted permission strings, e.g. `orders.view`.
    #[serde(default)]
    pub permissions: BTreeSet<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// ISO date (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,

    /// Avatar URL or storage reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification_number: Option<String>,

    /// RFC 3339 creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Identity {
    /// Minimal identity with no flags, permissions or profile fields.
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            user_type: None,
            is_admin: false,
            is_employee: false,
            is_customer: false,
            permissions: BTreeSet::new(),
            phone: None,
            address: None,
            date_of_birth: None,
            avatar: None,
            identification_number: None,
            created_at: None,
        }
    }

    #[must_use]
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// "First Last", falling back to the email when both are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
