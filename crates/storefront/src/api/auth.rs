//! `/auth` endpoints.

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cue_shop_core::{Role, User};

use super::{ApiClient, ApiError};

/// Body of a successful `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl LoginResponse {
    /// The optimistic user built from the login payload.
    ///
    /// `full_name` falls back to the username when the backend omits it.
    #[must_use]
    pub fn user(&self) -> User {
        User {
            id: None,
            username: self.username.clone(),
            role: self.role,
            full_name: Some(
                self.full_name
                    .clone()
                    .unwrap_or_else(|| self.username.clone()),
            ),
            email: None,
            phone_number: None,
            address: None,
        }
    }
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub phone_number: String,
    pub address: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

fn expose<S: serde::Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] when the backend rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint("/auth/login")?;
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        self.execute_json(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] (usually 400 with a message) when the
    /// backend refuses the registration.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let url = self.endpoint("/auth/register")?;
        self.execute_empty(self.request(Method::POST, url, None).json(request))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_user_falls_back_to_username() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"token":"t","username":"minh","role":"ADMIN"}"#).unwrap();
        let user = response.user();
        assert_eq!(user.full_name.as_deref(), Some("minh"));
        assert_eq!(user.role, Some(Role::Admin));
    }

    #[test]
    fn test_register_request_serializes_password() {
        let request = RegisterRequest {
            full_name: "Lê Minh".to_string(),
            email: "minh@cueshop.vn".to_string(),
            username: "minh".to_string(),
            password: SecretString::from("secret1"),
            phone_number: "0901234567".to_string(),
            address: "Hà Nội".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["password"], "secret1");
        assert_eq!(json["phoneNumber"], "0901234567");
        assert_eq!(json["fullName"], "Lê Minh");
    }
}
