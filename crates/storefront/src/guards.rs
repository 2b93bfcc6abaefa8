//! Route guards.
//!
//! Pure functions of a [`SessionSnapshot`] and the requested location. Each
//! either lets the page render or names where to go instead.
//!
//! # Example
//!
//! ```rust
//! use cue_shop_storefront::guards::{self, GuardOutcome};
//! use cue_shop_storefront::session::SessionSnapshot;
//!
//! let anonymous = SessionSnapshot::default();
//! let outcome = guards::require_auth(&anonymous, "/account");
//! assert_eq!(outcome, GuardOutcome::redirect_to_login(Some("/account")));
//! ```

use cue_shop_core::Role;

use crate::session::SessionSnapshot;

/// Login page.
pub const LOGIN_PATH: &str = "/login";
/// Storefront home page.
pub const HOME_PATH: &str = "/";
/// Admin dashboard.
pub const ADMIN_PATH: &str = "/admin";

/// Result of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Show the requested page.
    Render,
    /// Go to `to` instead. `from` is the location to come back to after
    /// logging in, when the guard wants one remembered.
    Redirect { to: &'static str, from: Option<String> },
}

impl GuardOutcome {
    /// Redirect to the login page, optionally remembering `from`.
    #[must_use]
    pub fn redirect_to_login(from: Option<&str>) -> Self {
        Self::Redirect {
            to: LOGIN_PATH,
            from: from.map(str::to_owned),
        }
    }

    #[must_use]
    pub const fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Signed-in users only. Anonymous visitors go to login and come back to
/// `location` afterwards.
#[must_use]
pub fn require_auth(session: &SessionSnapshot, location: &str) -> GuardOutcome {
    if session.authenticated {
        GuardOutcome::Render
    } else {
        GuardOutcome::redirect_to_login(Some(location))
    }
}

/// Users whose role is in `allowed`. Without a known user the visitor goes
/// to login; with the wrong role, home.
#[must_use]
pub fn require_role(session: &SessionSnapshot, allowed: &[Role]) -> GuardOutcome {
    let Some(user) = &session.user else {
        return GuardOutcome::redirect_to_login(None);
    };

    match user.role {
        Some(role) if allowed.contains(&role) => GuardOutcome::Render,
        _ => GuardOutcome::Redirect {
            to: HOME_PATH,
            from: None,
        },
    }
}

/// Keep admins out of the customer pages.
#[must_use]
pub fn admin_redirect(session: &SessionSnapshot) -> GuardOutcome {
    if session.role() == Some(Role::Admin) {
        GuardOutcome::Redirect {
            to: ADMIN_PATH,
            from: None,
        }
    } else {
        GuardOutcome::Render
    }
}
