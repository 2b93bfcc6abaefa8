//! Route table and navigator.
//!
//! Every page is reached through [`Navigator::navigate`], which runs the
//! page's guards in order and follows redirects. A location the user was
//! bounced away from is persisted under [`keys::RETURN_TO`] so that
//! [`Navigator::after_login`] can send them back, even across restarts.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use cue_shop_core::{OrderId, ProductId, Role};

use crate::error::add_breadcrumb;
use crate::guards::{self, ADMIN_PATH, GuardOutcome, HOME_PATH};
use crate::session::{SessionSnapshot, SessionStore};
use crate::storage::{Storage, keys};

/// Redirect chains longer than this are cut off.
const MAX_REDIRECTS: usize = 5;

/// Roles allowed into the admin panel.
const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// Every page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Products,
    ProductDetail(ProductId),
    Cart,
    Checkout,
    Wishlist,
    MyOrders,
    Account,
    Profile,
    About,
    Contact,
    Login,
    Register,
    OrderDetail(OrderId),
    AdminDashboard,
    AdminOrders,
    AdminProducts,
    AdminSuppliers,
    NotFound,
}

/// A guard attached to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    RequireAuth,
    RequireRole(&'static [Role]),
    AdminRedirect,
}

impl Page {
    /// Match a path (query string and trailing slash ignored).
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["products"] => Self::Products,
            ["products", id] => id.parse().map_or(Self::NotFound, Self::ProductDetail),
            ["cart"] => Self::Cart,
            ["checkout"] => Self::Checkout,
            ["wishlist"] => Self::Wishlist,
            ["my-orders"] => Self::MyOrders,
            ["account"] => Self::Account,
            ["profile"] => Self::Profile,
            ["about"] => Self::About,
            ["contact"] => Self::Contact,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["orders", id] => id.parse().map_or(Self::NotFound, Self::OrderDetail),
            ["admin"] => Self::AdminDashboard,
            ["admin", "orders"] => Self::AdminOrders,
            ["admin", "products"] => Self::AdminProducts,
            ["admin", "suppliers"] => Self::AdminSuppliers,
            _ => Self::NotFound,
        }
    }

    /// Canonical path of the page.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductDetail(id) => format!("/products/{id}"),
            Self::Cart => "/cart".to_string(),
            Self::Checkout => "/checkout".to_string(),
            Self::Wishlist => "/wishlist".to_string(),
            Self::MyOrders => "/my-orders".to_string(),
            Self::Account => "/account".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::About => "/about".to_string(),
            Self::Contact => "/contact".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::OrderDetail(id) => format!("/orders/{id}"),
            Self::AdminDashboard => "/admin".to_string(),
            Self::AdminOrders => "/admin/orders".to_string(),
            Self::AdminProducts => "/admin/products".to_string(),
            Self::AdminSuppliers => "/admin/suppliers".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// Guards in evaluation order.
    #[must_use]
    pub const fn guards(&self) -> &'static [Guard] {
        match self {
            Self::Home
            | Self::Products
            | Self::ProductDetail(_)
            | Self::Cart
            | Self::Checkout
            | Self::Wishlist
            | Self::About
            | Self::Contact => &[Guard::AdminRedirect],
            Self::MyOrders | Self::Account | Self::Profile | Self::OrderDetail(_) => {
                &[Guard::RequireAuth, Guard::AdminRedirect]
            }
            Self::AdminDashboard | Self::AdminOrders | Self::AdminProducts | Self::AdminSuppliers => {
                &[Guard::RequireRole(ADMIN_ROLES)]
            }
            Self::Login | Self::Register | Self::NotFound => &[],
        }
    }

    /// Whether the page belongs to the admin panel.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::AdminDashboard | Self::AdminOrders | Self::AdminProducts | Self::AdminSuppliers
        )
    }

    /// First guard that refuses `location`, or [`GuardOutcome::Render`].
    #[must_use]
    pub fn check(&self, session: &SessionSnapshot, location: &str) -> GuardOutcome {
        for guard in self.guards() {
            let outcome = match guard {
                Guard::RequireAuth => guards::require_auth(session, location),
                Guard::RequireRole(roles) => guards::require_role(session, roles),
                Guard::AdminRedirect => guards::admin_redirect(session),
            };
            if !outcome.is_render() {
                return outcome;
            }
        }
        GuardOutcome::Render
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Page to render.
    pub page: Page,
    /// Location of that page, including any query string.
    pub location: String,
    /// Locations redirected away from, in order.
    pub redirects: Vec<String>,
}

impl Navigation {
    #[must_use]
    pub fn was_redirected(&self) -> bool {
        !self.redirects.is_empty()
    }
}

/// Moves between pages through the guards.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

struct NavigatorInner {
    session: SessionStore,
    storage: Arc<dyn Storage>,
    current: RwLock<String>,
}

impl Navigator {
    #[must_use]
    pub fn new(session: SessionStore, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(NavigatorInner {
                session,
                storage,
                current: RwLock::new(HOME_PATH.to_string()),
            }),
        }
    }

    /// Location of the page last navigated to.
    #[must_use]
    pub fn current(&self) -> String {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Location a guard remembered for after login.
    #[must_use]
    pub fn return_to(&self) -> Option<String> {
        self.inner.storage.get(keys::RETURN_TO).unwrap_or_else(|e| {
            warn!(error = %e, "Could not read return location");
            None
        })
    }

    /// Go to `location`, following guard redirects.
    pub fn navigate(&self, location: &str) -> Navigation {
        let session = self.inner.session.snapshot();
        let mut location = normalize(location);
        let mut redirects = Vec::new();

        loop {
            let page = Page::parse(&location);
            match page.check(&session, &location) {
                GuardOutcome::Render => {
                    return self.arrive(page, location, redirects);
                }
                GuardOutcome::Redirect { to, from } => {
                    debug!(from = %location, to, "Guard redirect");
                    if let Some(from) = from {
                        self.remember(&from);
                    }
                    redirects.push(std::mem::replace(&mut location, to.to_string()));

                    if redirects.len() >= MAX_REDIRECTS {
                        warn!(?redirects, "Too many redirects; stopping");
                        let page = Page::parse(&location);
                        return self.arrive(page, location, redirects);
                    }
                }
            }
        }
    }

    /// Where to go after a successful login: admins to the dashboard, everyone
    /// else back to the remembered location or home.
    pub fn after_login(&self) -> Navigation {
        let target = self.take_return_to();
        let session = self.inner.session.snapshot();

        if session.role() == Some(Role::Admin) {
            return self.navigate(ADMIN_PATH);
        }
        self.navigate(target.as_deref().unwrap_or(HOME_PATH))
    }

    fn arrive(&self, page: Page, location: String, redirects: Vec<String>) -> Navigation {
        add_breadcrumb("navigation", "Viewed page", Some(&[("path", location.as_str())]));
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = location.clone();
        Navigation {
            page,
            location,
            redirects,
        }
    }

    fn remember(&self, location: &str) {
        if let Err(e) = self.inner.storage.set(keys::RETURN_TO, location) {
            warn!(error = %e, "Could not remember return location");
        }
    }

    fn take_return_to(&self) -> Option<String> {
        let target = self.return_to()?;
        if let Err(e) = self.inner.storage.remove(keys::RETURN_TO) {
            warn!(error = %e, "Could not clear return location");
        }
        // Never bounce back to the auth pages themselves
        match Page::parse(&target) {
            Page::Login | Page::Register => None,
            _ => Some(target),
        }
    }
}

fn normalize(location: &str) -> String {
    let trimmed = location.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
