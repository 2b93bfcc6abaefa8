//! Screen commands.
//!
//! Each command opens its page through the navigator first, so the same
//! guards as the web storefront decide whether it may render.

pub mod account;
pub mod admin;
pub mod orders;
pub mod shop;

use thiserror::Error;
use tracing::debug;

use cue_shop_admin::AdminError;
use cue_shop_storefront::error::AppError;
use cue_shop_storefront::guards::LOGIN_PATH;
use cue_shop_storefront::routes::Navigation;
use cue_shop_storefront::state::AppState;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    /// A guard sent the user elsewhere.
    #[error("Redirected to {0}")]
    Redirected(String),

    /// Command-line input that does not parse.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Message printed for the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            Self::Admin(e) => e.user_message(),
            Self::Redirected(to) if to.split('?').next() == Some(LOGIN_PATH) => {
                "Vui lòng đăng nhập để tiếp tục (cue-shop login)".to_string()
            }
            Self::Redirected(to) => format!("Trang này không dành cho bạn; chuyển tới {to}"),
            Self::InvalidArgument(reason) => reason.clone(),
        }
    }

    /// Log the error, capturing unexpected failures.
    pub fn report(&self) {
        match self {
            Self::App(e) => e.report(),
            Self::Admin(e) => e.report(),
            Self::Redirected(_) | Self::InvalidArgument(_) => debug!(error = %self, "Command stopped"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Navigate to `location` and fail unless the page renders there.
pub fn open(state: &AppState, location: &str) -> Result<Navigation> {
    let navigation = state.navigator().navigate(location);
    if navigation.was_redirected() {
        return Err(CliError::Redirected(navigation.location));
    }
    Ok(navigation)
}
