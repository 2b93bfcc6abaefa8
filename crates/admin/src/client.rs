//! Authenticated client for the admin endpoints.
//!
//! Operations live in sibling modules as further `impl AdminClient` blocks:
//! [`crate::dashboard`], [`crate::products`], [`crate::suppliers`] and
//! [`crate::orders`].

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use url::Url;

use cue_shop_core::Role;
use cue_shop_storefront::api::ApiClient;
use cue_shop_storefront::session::SessionStore;

use crate::error::{AdminError, Result};

/// Admin API client bound to one administrator's token.
///
/// Cheaply cloneable. The token is captured at construction, so a client
/// outliving a logout keeps failing with 401 rather than acting anonymously.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    api: ApiClient,
    token: SecretString,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.inner.api.base_url().as_str())
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a client from an explicit token.
    #[must_use]
    pub fn new(api: ApiClient, token: SecretString) -> Self {
        Self {
            inner: Arc::new(AdminClientInner { api, token }),
        }
    }

    /// Create a client for the administrator signed into `session`.
    ///
    /// A session whose profile has not loaded yet is accepted; the backend
    /// still checks the role on every call.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotAuthenticated`] without a token and
    /// [`AdminError::Forbidden`] when the known role is not `ADMIN`.
    pub fn from_session(session: &SessionStore) -> Result<Self> {
        let token = session.token().ok_or(AdminError::NotAuthenticated)?;
        if let Some(role) = session.snapshot().role()
            && role != Role::Admin
        {
            return Err(AdminError::Forbidden(format!("role {role}")));
        }
        Ok(Self::new(session.api().clone(), token))
    }

    /// Underlying storefront client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.inner.api.endpoint(path)?)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner.api.request(method, url, Some(&self.inner.token))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(self
            .inner
            .api
            .get_json(path, Some(&self.inner.token))
            .await?)
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<()> {
        Ok(self.inner.api.execute_empty(request).await?)
    }
}
