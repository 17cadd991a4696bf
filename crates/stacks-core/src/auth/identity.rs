use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account classification used for route access and UI affordances.
///
/// The set is closed: the API only ever issues these two values, and any
/// other value is rejected rather than mapped to a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Librarian,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0:?}")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 2] = [Role::Student, Role::Librarian];

    /// Wire value, as carried in tokens and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Librarian => "librarian",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Librarian => "Librarian",
        }
    }

    /// The other role (used by the role toggle on the new-user form)
    pub fn toggled(&self) -> Self {
        match self {
            Role::Student => Role::Librarian,
            Role::Librarian => Role::Student,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "librarian" => Ok(Role::Librarian),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// The signed-in principal, decoded from the credential token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(first: &str, last: &str) -> Identity {
        Identity {
            id: 1,
            username: "alice".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Student,
        }
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("student".parse::<Role>(), Ok(Role::Student));
        assert_eq!("librarian".parse::<Role>(), Ok(Role::Librarian));
    }

    #[test]
    fn test_role_from_str_rejects_unknown() {
        assert_eq!("admin".parse::<Role>(), Err(UnknownRole("admin".to_string())));
        assert!("".parse::<Role>().is_err());
        // Wire values are lowercase only
        assert!("Student".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_uses_wire_value() {
        assert_eq!(serde_json::to_string(&Role::Librarian).unwrap(), "\"librarian\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
        assert!(serde_json::from_str::<Role>("\"staff\"").is_err());
    }

    #[test]
    fn test_role_toggled() {
        assert_eq!(Role::Student.toggled(), Role::Librarian);
        assert_eq!(Role::Librarian.toggled(), Role::Student);
    }

    #[test]
    fn test_full_name_falls_back_to_username() {
        assert_eq!(identity("Alice", "Liddell").full_name(), "Alice Liddell");
        assert_eq!(identity("Alice", "").full_name(), "Alice");
        assert_eq!(identity("", "").full_name(), "alice");
    }
}
