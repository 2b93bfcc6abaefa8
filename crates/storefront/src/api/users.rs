//! `/users/me` endpoints.

use reqwest::Method;
use secrecy::SecretString;
use tracing::instrument;

use cue_shop_core::{User, UserProfileUpdate};

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Fetch the profile of the account owning `token`.
    ///
    /// # Errors
    ///
    /// Returns error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn current_user(&self, token: &SecretString) -> Result<User, ApiError> {
        self.get_json("/users/me", Some(token)).await
    }

    /// Replace the profile of the account owning `token`.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the update.
    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        update: &UserProfileUpdate,
    ) -> Result<User, ApiError> {
        let url = self.endpoint("/users/me")?;
        self.execute_json(self.request(Method::PUT, url, Some(token)).json(update))
            .await
    }
}
