use serde::{Deserialize, Serialize};

use crate::auth::Role;

use super::{require, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: Role,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Payload for creating an account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: Role,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("username", &self.username)?;
        require("password", &self.password)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require("email", &self.email)?;

        let email = self.email.trim();
        let valid_email = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
            None => false,
        };
        if !valid_email {
            return Err(ValidationError::new("email", "Enter a valid email address."));
        }
        Ok(())
    }

    /// Summary safe to log (no password)
    pub fn redacted(&self) -> String {
        format!("{} <{}> ({})", self.username, self.email, self.user_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            username: "bob".to_string(),
            password: "hunter22".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Builder".to_string(),
            email: "bob@example.com".to_string(),
            user_type: Role::Student,
        }
    }

    #[test]
    fn test_parse_user() {
        let json = r#"{"id": 2, "username": "marian", "first_name": "Marian", "last_name": "Paroo", "email": "marian@river.city", "user_type": "librarian"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_type, Role::Librarian);
        assert_eq!(user.full_name(), "Marian Paroo");
    }

    #[test]
    fn test_parse_user_rejects_unknown_role() {
        let json = r#"{"id": 2, "username": "x", "first_name": "", "last_name": "", "email": "", "user_type": "admin"}"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn test_new_user_defaults_to_student() {
        assert_eq!(NewUser::default().user_type, Role::Student);
    }

    #[test]
    fn test_new_user_serializes_role_as_wire_value() {
        let mut user = new_user();
        user.user_type = Role::Librarian;
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["user_type"], "librarian");
        assert_eq!(json["password"], "hunter22");
    }

    #[test]
    fn test_validate() {
        assert_eq!(new_user().validate(), Ok(()));

        let mut user = new_user();
        user.password.clear();
        assert_eq!(user.validate().unwrap_err().field, "password");

        for email in ["bob", "@example.com", "bob@localhost", "bob@.com"] {
            let mut user = new_user();
            user.email = email.to_string();
            assert_eq!(user.validate().unwrap_err().field, "email", "{}", email);
        }
    }

    #[test]
    fn test_redacted_omits_password() {
        let redacted = new_user().redacted();
        assert!(!redacted.contains("hunter22"));
        assert_eq!(redacted, "bob <bob@example.com> (student)");
    }
}
