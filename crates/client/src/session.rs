//! Authentication session state.
//!
//! [`SessionStore`] owns the answer to "who is logged in". It drives the
//! [`ApiClient`] token slot, persists the token through a [`TokenStore`],
//! and broadcasts the authentication flag over a watch channel so that
//! dependent state (the cart store) can react to login and logout.
//!
//! Session operations are serialized: a login racing an initialize cannot
//! interleave their token writes.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::instrument;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::token::TokenStore;
use crate::types::{Credentials, Registration, UserProfile};

// =============================================================================
// SessionStore
// =============================================================================

/// Client-side session state.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
    /// Profile of the logged-in user, `None` when signed out.
    user: RwLock<Option<UserProfile>>,
    /// Broadcasts the authentication flag; `borrow` doubles as the
    /// synchronous `is_authenticated` read.
    auth_tx: watch::Sender<bool>,
    /// Serializes session transitions (initialize, login, register, logout).
    op_lock: Mutex<()>,
}

impl SessionStore {
    /// Create a session store in the signed-out state.
    ///
    /// Call [`initialize`](Self::initialize) to restore a persisted session.
    #[must_use]
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        let (auth_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(SessionInner {
                api,
                tokens,
                user: RwLock::new(None),
                auth_tx,
                op_lock: Mutex::new(()),
            }),
        }
    }

    /// Restore the session from the persisted token, if any.
    ///
    /// Loads the stored token, installs it, and validates it against the
    /// backend. An invalid or expired token is discarded (in memory and in
    /// the store) and the session ends up signed out. This never fails
    /// outward; startup proceeds signed out on any error.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let _guard = self.inner.op_lock.lock().await;

        let token = match self.inner.tokens.load() {
            Ok(Some(token)) => token,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load persisted token");
                return;
            }
        };

        self.inner.api.set_token(SecretString::from(token));

        match self.inner.api.current_user().await {
            Ok(user) => {
                tracing::info!(username = %user.username, "session restored");
                *self.inner.user.write().await = Some(user);
                self.inner.auth_tx.send_replace(true);
            }
            Err(e) => {
                tracing::info!(error = %e, "persisted token rejected, signing out");
                self.inner.api.clear_token();
                if let Err(e) = self.inner.tokens.clear() {
                    tracing::warn!(error = %e, "failed to clear persisted token");
                }
            }
        }
    }

    /// Log in with username and password.
    ///
    /// On success the token is installed and persisted, the profile cached,
    /// and the authentication flag raised. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, ApiError> {
        let _guard = self.inner.op_lock.lock().await;

        let auth = self.inner.api.login(credentials).await?;
        self.establish(auth.token, &auth.user);
        *self.inner.user.write().await = Some(auth.user.clone());
        self.inner.auth_tx.send_replace(true);
        Ok(auth.user)
    }

    /// Register a new account. A successful registration is also a login.
    ///
    /// # Errors
    ///
    /// Returns an error on field validation failures or if the request fails.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<UserProfile, ApiError> {
        let _guard = self.inner.op_lock.lock().await;

        let auth = self.inner.api.register(registration).await?;
        self.establish(auth.token, &auth.user);
        *self.inner.user.write().await = Some(auth.user.clone());
        self.inner.auth_tx.send_replace(true);
        Ok(auth.user)
    }

    /// Log out.
    ///
    /// Tells the backend to invalidate the token, then tears the session
    /// down locally regardless of whether that call succeeded - a dead
    /// backend must not trap the user in a logged-in state.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _guard = self.inner.op_lock.lock().await;

        if self.inner.api.has_token()
            && let Err(e) = self.inner.api.logout().await
        {
            tracing::warn!(error = %e, "server-side logout failed, clearing local session anyway");
        }

        self.inner.api.clear_token();
        if let Err(e) = self.inner.tokens.clear() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        *self.inner.user.write().await = None;
        self.inner.auth_tx.send_replace(false);
    }

    /// Whether a user is currently logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.inner.auth_tx.borrow()
    }

    /// Profile of the logged-in user, if any.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.user.read().await.clone()
    }

    /// Whether the logged-in user may use the admin surface.
    ///
    /// Navigation gating only; the backend re-checks on every admin call.
    pub async fn is_staff(&self) -> bool {
        self.inner
            .user
            .read()
            .await
            .as_ref()
            .is_some_and(|user| user.is_staff)
    }

    /// Subscribe to authentication flag changes.
    ///
    /// The receiver yields the current value immediately on first poll and
    /// every transition thereafter.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.auth_tx.subscribe()
    }

    /// Install and persist a freshly issued token.
    ///
    /// Persistence failure is logged, not propagated: the session works for
    /// this process lifetime either way, it just will not survive a restart.
    fn establish(&self, token: SecretString, user: &UserProfile) {
        use secrecy::ExposeSecret;

        if let Err(e) = self.inner.tokens.save(token.expose_secret()) {
            tracing::warn!(error = %e, "failed to persist auth token");
        }
        self.inner.api.set_token(token);
        tracing::info!(username = %user.username, "session established");
    }
}
