//! `POST /contact`.

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use super::{ApiClient, ApiError};

/// A message from the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ApiClient {
    /// Send a contact message; returns the backend's confirmation text
    /// (empty when the backend sends none).
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the message.
    #[instrument(skip_all, fields(subject = %message.subject))]
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<String, ApiError> {
        let url = self.endpoint("/contact")?;
        let response = self
            .execute(self.request(Method::POST, url, None).json(message))
            .await?;
        let body = response.text().await?;
        Ok(super::extract_message(&body, true).unwrap_or_default())
    }
}
