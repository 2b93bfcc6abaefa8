//! Unified error handling with Sentry integration.
//!
//! Store and page operations return `Result<T, AppError>`. Callers turn an
//! error into a notification with [`AppError::user_message`] and call
//! [`AppError::report`] so unexpected failures reach Sentry.

use thiserror::Error;

use crate::api::ApiError;
use crate::forms::FieldErrors;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// The backend rejected the login credentials.
    #[error("Authentication failed")]
    Authentication,

    /// The backend rejected a form with a message meant for the user.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A signed-in session is required.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Registration failed for a reason other than validation.
    #[error("Registration failed: {0}")]
    Registration(#[source] ApiError),

    /// The profile update was refused.
    #[error("Profile update failed: {0}")]
    ProfileUpdate(#[source] ApiError),

    /// Any other failed backend call.
    #[error("Request failed: {0}")]
    RequestFailed(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Client-side validation failed; nothing was sent.
    #[error("Invalid form: {0}")]
    InvalidForm(FieldErrors),

    /// The requested action is not allowed in the current state.
    #[error("Rejected: {0}")]
    Rejected(String),
}

impl AppError {
    /// Short localized message for a notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication => "Đăng nhập thất bại".to_string(),
            Self::Validation(message) | Self::Rejected(message) => message.clone(),
            Self::NotAuthenticated => "Vui lòng đăng nhập".to_string(),
            Self::Registration(_) => "Đăng ký thất bại".to_string(),
            Self::ProfileUpdate(err) => err
                .backend_message()
                .map_or_else(|| "Cập nhật thất bại".to_string(), str::to_owned),
            Self::RequestFailed(err) => match err {
                ApiError::Http(_) => "Không thể kết nối máy chủ".to_string(),
                _ => err
                    .backend_message()
                    .map_or_else(|| "Yêu cầu thất bại".to_string(), str::to_owned),
            },
            Self::NotFound(_) => "Không tìm thấy".to_string(),
            Self::Storage(_) => "Không thể lưu dữ liệu".to_string(),
            Self::InvalidForm(errors) => errors
                .first()
                .map_or_else(|| "Dữ liệu không hợp lệ".to_string(), |(_, m)| m.to_owned()),
        }
    }

    /// Whether the failure is unexpected and worth a Sentry event.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Storage(_) => true,
            Self::RequestFailed(err) | Self::Registration(err) | Self::ProfileUpdate(err) => {
                !matches!(err, ApiError::Status { status, .. } if *status < 500)
            }
            _ => false,
        }
    }

    /// Log the error, capturing unexpected ones to Sentry.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after a successful login to associate errors with the account.
pub fn set_sentry_user(username: &str, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "12")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
