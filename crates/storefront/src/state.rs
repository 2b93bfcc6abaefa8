//! Application state shared across screens.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::routes::Navigator;
use crate::session::SessionStore;
use crate::storage::{FileStorage, Storage};
use crate::wishlist::WishlistStore;

/// Application state shared across all screens.
///
/// Cheaply cloneable via `Arc`. Every clone sees the same session, cart and
/// wishlist, all of them persisted to the same storage.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    session: SessionStore,
    cart: CartStore,
    wishlist: WishlistStore,
    navigator: Navigator,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("api_base_url", &self.inner.config.api_base_url.as_str())
            .field("data_dir", &self.inner.config.data_dir)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build the state on top of the configured data directory, restoring any
    /// persisted session, cart and wishlist.
    ///
    /// Must be called inside a Tokio runtime when a token is persisted, so
    /// the profile fetch can start.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built or the stored token
    /// cannot be read.
    pub fn new(config: StorefrontConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(config.data_dir.clone()));
        let api = ApiClient::new(&config)?;
        Self::with_parts(config, api, storage, notifier)
    }

    /// Build the state from an existing client and storage.
    ///
    /// # Errors
    ///
    /// Returns error if the stored token cannot be read.
    pub fn with_parts(
        config: StorefrontConfig,
        api: ApiClient,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = SessionStore::restore(api, Arc::clone(&storage))?;
        let cart = CartStore::load(Arc::clone(&storage), Arc::clone(&notifier));
        let wishlist = WishlistStore::load(Arc::clone(&storage));
        let navigator = Navigator::new(session.clone(), Arc::clone(&storage));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                notifier,
                session,
                cart,
                wishlist,
                navigator,
            }),
        })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the HTTP client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        self.inner.session.api()
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.inner.storage
    }

    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn wishlist(&self) -> &WishlistStore {
        &self.inner.wishlist
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.inner.navigator
    }
}
