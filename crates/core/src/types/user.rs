//! Shop account records.

use serde::{Deserialize, Serialize};

use crate::types::{Role, UserId};

/// The signed-in account as the client knows it.
///
/// Built optimistically from the login response (username, role, full name)
/// and then replaced by the `GET /users/me` profile, so every field except
/// the username is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl User {
    /// Name to greet the user with.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// Whether the account has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// Full replacement payload for `PUT /users/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileUpdate {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
}

impl UserProfileUpdate {
    /// Start an edit from the current profile, blank where unknown.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            full_name: user.full_name.clone().unwrap_or_default(),
            email: user.email.clone().unwrap_or_default(),
            phone_number: user.phone_number.clone().unwrap_or_default(),
            address: user.address.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_deserializes_camel_case() {
        let user: User = serde_json::from_str(
            r#"{"id":3,"username":"linh","role":"CUSTOMER","fullName":"Trần Linh","phoneNumber":"0901234567"}"#,
        )
        .unwrap();
        assert_eq!(user.id, Some(UserId::new(3)));
        assert_eq!(user.role, Some(Role::Customer));
        assert_eq!(user.display_name(), "Trần Linh");
        assert_eq!(user.phone_number.as_deref(), Some("0901234567"));
        assert!(user.address.is_none());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let user: User = serde_json::from_str(r#"{"username":"linh","fullName":"  "}"#).unwrap();
        assert_eq!(user.display_name(), "linh");
        assert!(!user.is_admin());
    }
}
