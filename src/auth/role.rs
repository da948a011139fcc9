//! Account roles and the method-level permission table.

use axum::http::Method;
use serde::{Deserialize, Serialize};

/// Account role. Adding a variant forces [`Role::allows`] to be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Site owner, full access
    SuperAdmin,
    /// Can create and edit, cannot delete
    Admin,
    /// Read-only
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
        }
    }

    /// Whether this role may use `method` against API routes.
    ///
    /// SUPER_ADMIN: GET POST PUT DELETE. ADMIN: GET POST PUT. STAFF: GET.
    /// Any other method is denied for every role.
    pub fn allows(&self, method: &Method) -> bool {
        let read = *method == Method::GET;
        let write = *method == Method::POST || *method == Method::PUT;
        let delete = *method == Method::DELETE;

        match self {
            Role::SuperAdmin => read || write || delete,
            Role::Admin => read || write,
            Role::Staff => read,
        }
    }

    /// Whether this role may read and triage contact messages
    pub fn can_manage_messages(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Exact, case-sensitive match on the stored form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "STAFF" => Ok(Role::Staff),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Permission check on a raw role string. Unknown roles are denied.
pub fn is_allowed(role: &str, method: &Method) -> bool {
    role.parse::<Role>()
        .map(|r| r.allows(method))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_table() {
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            assert!(Role::SuperAdmin.allows(&method), "SUPER_ADMIN {}", method);
        }

        assert!(Role::Admin.allows(&Method::GET));
        assert!(Role::Admin.allows(&Method::POST));
        assert!(Role::Admin.allows(&Method::PUT));
        assert!(!Role::Admin.allows(&Method::DELETE));

        assert!(Role::Staff.allows(&Method::GET));
        assert!(!Role::Staff.allows(&Method::POST));
        assert!(!Role::Staff.allows(&Method::PUT));
        assert!(!Role::Staff.allows(&Method::DELETE));
    }

    #[test]
    fn test_methods_outside_table_denied() {
        for role in Role::ALL {
            assert!(!role.allows(&Method::PATCH));
            assert!(!role.allows(&Method::OPTIONS));
            assert!(!role.allows(&Method::HEAD));
        }
    }

    #[test]
    fn test_unknown_role_fails_closed() {
        assert!(!is_allowed("ROOT", &Method::GET));
        assert!(!is_allowed("", &Method::GET));
        assert!(!is_allowed("super_admin", &Method::GET));
        assert!(is_allowed("STAFF", &Method::GET));
    }

    #[test]
    fn test_role_string_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
            assert_eq!(
                serde_json::to_string(&role).unwrap(),
                format!("\"{}\"", role.as_str())
            );
        }
    }
}
