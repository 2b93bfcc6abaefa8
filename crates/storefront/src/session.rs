//! Session store: the signed-in user and their bearer token.
//!
//! The token is the source of truth for "signed in". It is persisted under
//! [`keys::TOKEN`] while set and removed when cleared. Whenever a new token
//! is installed (login, or restore at startup) a background task fetches
//! `GET /users/me` and reconciles the user:
//!
//! - on success the profile replaces the user, but a role that was already
//!   known (from the login payload) wins over the role in the profile;
//! - on any failure the session is cleared (forced logout).
//!
//! Each token change bumps an epoch. A profile response is applied only if
//! the epoch is unchanged and a token is still present, so a fetch that
//! resolves after `logout()` or a newer login never resurrects a user. The
//! task holds a weak reference and is aborted when the store is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use cue_shop_core::{Role, User, UserProfileUpdate};

use crate::api::{ApiClient, ApiError, RegisterRequest};
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::storage::{Storage, keys};

/// What the route guards need to know about the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub user: Option<User>,
}

impl SessionSnapshot {
    /// Role of the current user, if known.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().and_then(|u| u.role)
    }
}

#[derive(Default)]
struct SessionState {
    user: Option<User>,
    token: Option<SecretString>,
}

/// Owner of the authentication state. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    storage: Arc<dyn Storage>,
    state: RwLock<SessionState>,
    epoch: AtomicU64,
    profile_task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        let task = self
            .profile_task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("SessionStore")
            .field("authenticated", &snapshot.authenticated)
            .field("username", &snapshot.user.as_ref().map(|u| u.username.as_str()))
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// An anonymous session. Nothing is read from storage.
    #[must_use]
    pub fn new(api: ApiClient, storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                api,
                storage,
                state: RwLock::new(SessionState::default()),
                epoch: AtomicU64::new(0),
                profile_task: Mutex::new(None),
            }),
        }
    }

    /// Build the session from the persisted token, if any.
    ///
    /// A restored token triggers the profile fetch, so this must run inside
    /// a Tokio runtime. The user stays unknown until the fetch settles.
    ///
    /// # Errors
    ///
    /// Returns error if the token cannot be read from storage.
    pub fn restore(api: ApiClient, storage: Arc<dyn Storage>) -> Result<Self> {
        let token = storage
            .get(keys::TOKEN)?
            .filter(|t| !t.trim().is_empty())
            .map(SecretString::from);
        let store = Self::new(api, storage);

        if let Some(token) = token {
            debug!("Restoring persisted session");
            let epoch = {
                let mut state = store.write_state();
                state.token = Some(token.clone());
                store.inner.bump_epoch()
            };
            store.spawn_profile_fetch(token, epoch);
        }

        Ok(store)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read_state().token.is_some()
    }

    /// The current user, if known.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read_state().user.clone()
    }

    /// The bearer token, if signed in.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read_state().token.clone()
    }

    /// Token or [`AppError::NotAuthenticated`].
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` when signed out.
    pub fn require_token(&self) -> Result<SecretString> {
        self.token().ok_or(AppError::NotAuthenticated)
    }

    /// Consistent view of user and authentication for the guards.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read_state();
        SessionSnapshot {
            authenticated: state.token.is_some(),
            user: state.user.clone(),
        }
    }

    /// Client this session talks through.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Sign in.
    ///
    /// Token and user (username, role, full name from the login payload) are
    /// set together before the profile fetch starts, so the role is right
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Authentication`] when the backend rejects the
    /// credentials and [`AppError::RequestFailed`] when it cannot be reached.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User> {
        let response = self
            .inner
            .api
            .login(username, password)
            .await
            .map_err(|e| match e {
                ApiError::Status { .. } => AppError::Authentication,
                other => AppError::RequestFailed(other),
            })?;

        let user = response.user();
        let token = SecretString::from(response.token);

        let epoch = {
            let mut state = self.write_state();
            state.token = Some(token.clone());
            state.user = Some(user.clone());
            self.inner.bump_epoch()
        };
        self.inner.persist_token(Some(&token));
        set_sentry_user(&user.username, None);
        add_breadcrumb("auth", "Logged in", None);
        info!(username = %user.username, role = ?user.role, "Logged in");

        self.spawn_profile_fetch(token, epoch);
        Ok(user)
    }

    /// Create an account. The session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] with the backend's message on a 400
    /// and [`AppError::Registration`] otherwise.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.inner.api.register(request).await.map_err(|e| {
            match (e.status(), e.backend_message()) {
                (Some(400), Some(message)) => AppError::Validation(message.to_owned()),
                _ => AppError::Registration(e),
            }
        })?;
        info!("Registered account");
        Ok(())
    }

    /// Sign out. Synchronous, no backend call; any profile fetch in flight is
    /// cancelled.
    pub fn logout(&self) {
        {
            let mut state = self.write_state();
            state.token = None;
            state.user = None;
            self.inner.bump_epoch();
        }
        self.inner.abort_profile_task();
        self.inner.persist_token(None);
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        info!("Logged out");
    }

    /// Replace the profile and adopt the server's answer as the user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotAuthenticated`] without a session and
    /// [`AppError::ProfileUpdate`] when the backend refuses.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &UserProfileUpdate) -> Result<User> {
        let (token, epoch) = {
            let state = self.read_state();
            let token = state.token.clone().ok_or(AppError::NotAuthenticated)?;
            (token, self.inner.epoch.load(Ordering::SeqCst))
        };

        let user = self
            .inner
            .api
            .update_profile(&token, update)
            .await
            .map_err(AppError::ProfileUpdate)?;

        let mut state = self.write_state();
        if self.inner.epoch.load(Ordering::SeqCst) == epoch && state.token.is_some() {
            state.user = Some(user.clone());
            info!("Profile updated");
        } else {
            debug!("Session changed during profile update; result not applied");
        }
        Ok(user)
    }

    /// Wait for the pending profile fetch, if any, to finish.
    pub async fn settled(&self) {
        let task = self
            .inner
            .profile_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            // An aborted task is as settled as a finished one
            let _ = task.await;
        }
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn spawn_profile_fetch(&self, token: SecretString, epoch: u64) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime; profile fetch skipped");
            return;
        };

        let api = self.inner.api.clone();
        let session: Weak<SessionInner> = Arc::downgrade(&self.inner);

        let task = runtime.spawn(async move {
            let result = api.current_user(&token).await;
            match session.upgrade() {
                Some(inner) => inner.apply_profile(epoch, result),
                None => debug!("Session dropped before profile arrived"),
            }
        });

        let previous = self
            .inner
            .profile_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.inner.write_state()
    }
}

impl SessionInner {
    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the epoch; call with the state lock held.
    fn bump_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn abort_profile_task(&self) {
        let task = self
            .profile_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(task) = task {
            task.abort();
        }
    }

    fn persist_token(&self, token: Option<&SecretString>) {
        use secrecy::ExposeSecret;

        let result = match token {
            Some(token) => self.storage.set(keys::TOKEN, token.expose_secret()),
            None => self.storage.remove(keys::TOKEN),
        };
        if let Err(e) = result {
            AppError::Storage(e).report();
        }
    }

    fn apply_profile(&self, epoch: u64, result: std::result::Result<User, ApiError>) {
        let mut state = self.write_state();

        if self.epoch.load(Ordering::SeqCst) != epoch || state.token.is_none() {
            debug!("Discarding stale profile response");
            return;
        }

        match result {
            Ok(fetched) => {
                let role = state.user.as_ref().and_then(|u| u.role).or(fetched.role);
                debug!(username = %fetched.username, ?role, "Profile loaded");
                set_sentry_user(&fetched.username, fetched.email.as_deref());
                state.user = Some(User { role, ..fetched });
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed; signing out");
                state.token = None;
                state.user = None;
                self.bump_epoch();
                drop(state);

                self.persist_token(None);
                clear_sentry_user();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> (SessionStore, Arc<dyn Storage>) {
        // Nothing listens here; these tests never reach the network.
        let api = ApiClient::with_base_url(Url::parse("http://127.0.0.1:9/api").unwrap());
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        (SessionStore::new(api, Arc::clone(&storage)), storage)
    }

    fn signed_in(store: &SessionStore, role: Option<Role>) -> u64 {
        let mut state = store.write_state();
        state.token = Some(SecretString::from("tok"));
        state.user = Some(User {
            id: None,
            username: "minh".to_string(),
            role,
            full_name: Some("minh".to_string()),
            email: None,
            phone_number: None,
            address: None,
        });
        store.inner.bump_epoch()
    }

    fn profile(role: Role) -> User {
        User {
            id: Some(cue_shop_core::UserId::new(7)),
            username: "minh".to_string(),
            role: Some(role),
            full_name: Some("Lê Minh".to_string()),
            email: Some("minh@cueshop.vn".to_string()),
            phone_number: None,
            address: None,
        }
    }

    #[test]
    fn test_new_store_is_anonymous() {
        let (store, _) = store();
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert!(matches!(store.require_token(), Err(AppError::NotAuthenticated)));
    }

    #[test]
    fn test_profile_keeps_known_role() {
        let (store, _) = store();
        let epoch = signed_in(&store, Some(Role::Admin));

        store.inner.apply_profile(epoch, Ok(profile(Role::Customer)));

        let user = store.user().unwrap();
        assert_eq!(user.role, Some(Role::Admin));
        assert_eq!(user.full_name.as_deref(), Some("Lê Minh"));
        assert_eq!(user.email.as_deref(), Some("minh@cueshop.vn"));
    }

    #[test]
    fn test_profile_role_used_when_none_known() {
        let (store, _) = store();
        let epoch = signed_in(&store, None);
        store.inner.apply_profile(epoch, Ok(profile(Role::Customer)));
        assert_eq!(store.user().unwrap().role, Some(Role::Customer));
    }

    #[test]
    fn test_stale_profile_is_discarded() {
        let (store, _) = store();
        let epoch = signed_in(&store, Some(Role::Customer));
        store.logout();

        store.inner.apply_profile(epoch, Ok(profile(Role::Customer)));
        assert!(store.user().is_none());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_stale_failure_does_not_log_out_newer_session() {
        let (store, _) = store();
        let old_epoch = signed_in(&store, Some(Role::Customer));
        let _new_epoch = signed_in(&store, Some(Role::Customer));

        store.inner.apply_profile(
            old_epoch,
            Err(ApiError::Status {
                status: 401,
                message: None,
            }),
        );
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_failed_profile_forces_logout() {
        let (store, storage) = store();
        storage.set(keys::TOKEN, "tok").unwrap();
        let epoch = signed_in(&store, Some(Role::Customer));

        store.inner.apply_profile(
            epoch,
            Err(ApiError::Status {
                status: 401,
                message: None,
            }),
        );

        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn test_logout_clears_state_and_storage() {
        let (store, storage) = store();
        storage.set(keys::TOKEN, "tok").unwrap();
        signed_in(&store, Some(Role::Customer));

        store.logout();

        let snapshot = store.snapshot();
        assert!(!snapshot.authenticated);
        assert!(snapshot.user.is_none());
        assert_eq!(storage.get(keys::TOKEN).unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let (store, _) = store();
        let result = store.update_profile(&UserProfileUpdate::default()).await;
        assert!(matches!(result, Err(AppError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_restore_without_token_stays_anonymous() {
        let api = ApiClient::with_base_url(Url::parse("http://127.0.0.1:9/api").unwrap());
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let store = SessionStore::restore(api, storage).unwrap();
        store.settled().await;
        assert!(!store.is_authenticated());
    }
}
