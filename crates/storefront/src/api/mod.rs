//! HTTP client for the shop REST API.
//!
//! A thin wrapper over `reqwest` that resolves paths against the configured
//! base URL, attaches the bearer token when one is given and turns
//! non-success responses into [`ApiError::Status`] carrying the backend's
//! `{message|error}` text. There is no retry or backoff.
//!
//! Endpoint groups live in their own files as further `impl ApiClient`
//! blocks. Product lists are cached with `moka`.

mod auth;
mod contact;
mod orders;
mod products;
mod users;

pub use auth::{LoginResponse, RegisterRequest};
pub use contact::ContactMessage;
pub use orders::{NewOrder, NewOrderLine};
pub use products::{HomeSections, ProductSection};

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use cue_shop_core::Product;

use crate::config::StorefrontConfig;

/// Longest backend body kept in logs and error messages.
const MAX_LOGGED_BODY: usize = 500;

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status}{}", message.as_deref().map(|m| format!(" - {m}")).unwrap_or_default())]
    Status {
        status: u16,
        message: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the backend put in its error body, if any.
    #[must_use]
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the shop REST API.
///
/// Cheap to clone; every clone shares one connection pool and one catalog
/// cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog: Option<Cache<String, Arc<Vec<Product>>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("catalog_cache", &self.inner.catalog.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client from the storefront configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::from_parts(
            builder.build()?,
            config.api_base_url.clone(),
            config.catalog_cache_ttl,
        ))
    }

    /// Create a client for `base_url` with no timeout and no catalog cache.
    #[must_use]
    pub fn with_base_url(base_url: Url) -> Self {
        Self::from_parts(reqwest::Client::new(), base_url, None)
    }

    fn from_parts(client: reqwest::Client, base_url: Url, catalog_ttl: Option<Duration>) -> Self {
        let catalog = catalog_ttl.map(|ttl| Cache::builder().max_capacity(64).time_to_live(ttl).build());

        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                catalog,
            }),
        }
    }

    /// Base URL every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Resolve `path` under the base URL.
    ///
    /// Unlike [`Url::join`], the last segment of the base path is kept, so
    /// `http://host/api` + `/products` is `http://host/api/products`.
    ///
    /// # Errors
    ///
    /// Returns error if the result is not a valid URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Start a request, attaching `token` as a bearer credential when present.
    #[must_use]
    pub fn request(&self, method: Method, url: Url, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and fail on any non-success status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] on transport failure and
    /// [`ApiError::Status`] when the backend rejects the request.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            debug!(status = status.as_u16(), url = %response.url(), "API request succeeded");
            return Ok(response);
        }

        let url = response.url().to_string();
        let plain_text = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/plain"));
        let body = response.text().await.unwrap_or_default();
        warn!(
            status = status.as_u16(),
            url = %url,
            body = %truncate(&body, MAX_LOGGED_BODY),
            "API request rejected"
        );

        Err(ApiError::Status {
            status: status.as_u16(),
            message: extract_message(&body, plain_text),
        })
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not valid JSON for `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Send a request and discard the response body.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    pub async fn execute_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.execute(request).await.map(drop)
    }

    /// `GET path` decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body does not decode.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        self.execute_json(self.request(Method::GET, url, token)).await
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers either `{"message": ".."}`, `{"error": ".."}` or a
/// bare string. Unparsable bodies count only when sent as `text/plain`, so
/// an HTML error page never reaches the user.
fn extract_message(body: &str, plain_text: bool) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(map)) => ["message", "error"].iter().find_map(|key| {
            map.get(*key)
                .and_then(serde_json::Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_owned)
        }),
        Ok(serde_json::Value::String(message)) => Some(message),
        Ok(_) => None,
        Err(_) if plain_text => Some(truncate(trimmed, MAX_LOGGED_BODY).to_owned()),
        Err(_) => None,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_base_url(Url::parse(base).unwrap())
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("http://localhost:8080/api");
        assert_eq!(
            api.endpoint("/products").unwrap().as_str(),
            "http://localhost:8080/api/products"
        );
        assert_eq!(
            api.endpoint("orders/7/cancel").unwrap().as_str(),
            "http://localhost:8080/api/orders/7/cancel"
        );
    }

    #[test]
    fn test_endpoint_with_trailing_slash_base() {
        let api = client("https://shop.example/api/");
        assert_eq!(
            api.endpoint("/users/me").unwrap().as_str(),
            "https://shop.example/api/users/me"
        );
    }

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(
            extract_message(r#"{"message":"Email already exists"}"#, false).as_deref(),
            Some("Email already exists")
        );
        assert_eq!(
            extract_message(r#"{"error":"Bad Request","status":400}"#, false).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(
            extract_message(r#"{"message":"","error":"Forbidden"}"#, false).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(extract_message("Không tìm thấy", true).as_deref(), Some("Không tìm thấy"));
        assert_eq!(extract_message("  ", true), None);
        assert_eq!(extract_message("[1,2]", false), None);
    }

    #[test]
    fn test_extract_message_ignores_html_error_page() {
        let page = "<html><body><h1>400 Bad Request</h1></body></html>";
        assert_eq!(extract_message(page, false), None);
        assert_eq!(extract_message("Bad Request", false), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "đơn hàng";
        assert_eq!(truncate(s, 2), "đ");
        assert_eq!(truncate(s, 100), s);
    }

    #[test]
    fn test_status_error_accessors() {
        let err = ApiError::Status {
            status: 401,
            message: Some("Unauthorized".to_string()),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.backend_message(), Some("Unauthorized"));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "API error: 401 - Unauthorized");

        let err = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(err.to_string(), "API error: 500");
    }
}
