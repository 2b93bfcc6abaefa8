//! Unified error handling for the admin panel.

use thiserror::Error;

use cue_shop_storefront::api::ApiError;

/// Error type for admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// No session to act with.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Signed in, but not as an administrator.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rejected before reaching the backend.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AdminError {
    /// Short localized message for the admin screens.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Phiên đăng nhập đã hết hạn".to_string(),
            Self::Forbidden(_) => "Bạn không có quyền truy cập".to_string(),
            Self::Api(e) if e.is_unauthorized() => "Bạn không có quyền truy cập".to_string(),
            Self::Api(e) => e
                .backend_message()
                .map_or_else(|| "Có lỗi xảy ra".to_string(), str::to_owned),
            Self::NotFound(what) => format!("Không tìm thấy {what}"),
            Self::BadRequest(reason) => reason.clone(),
        }
    }

    /// Log the error, capturing backend and transport failures in Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Api(e) if e.status().is_none_or(|s| s >= 500)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin operation error"
            );
        } else {
            tracing::warn!(error = %self, "Admin operation rejected");
        }
    }
}

/// Result type alias for admin operations.
pub type Result<T> = std::result::Result<T, AdminError>;
