//! Server-cart mirror.
//!
//! [`CartStore`] holds the locally cached [`CartSnapshot`] and funnels all
//! cart mutations through a single policy:
//!
//! 1. Refuse the mutation with [`CartOutcome::RequiresLogin`] when the
//!    session is not authenticated (no network traffic at all).
//! 2. Perform the wire operation.
//! 3. Refetch the whole cart unconditionally and replace the snapshot.
//!
//! The refetch is not an optimization fallback, it is the only consistency
//! mechanism: the backend may merge lines, drop zero-quantity lines, or
//! recompute totals, and the mirror never tries to predict any of it.
//! Mutations are serialized so two concurrent writes cannot interleave
//! their refetches and leave a stale snapshot behind.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use haberdash_core::{CartLineId, ProductId};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::types::CartSnapshot;

// =============================================================================
// CartOutcome
// =============================================================================

/// Result of a cart mutation, shaped for direct display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOutcome {
    /// The mutation succeeded and the snapshot was refreshed.
    Updated,
    /// The session is not authenticated; nothing was sent.
    RequiresLogin,
    /// The backend rejected the mutation; the message is user-facing.
    Failed(String),
}

impl CartOutcome {
    /// Whether the mutation succeeded.
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated)
    }

    /// The user-facing failure message, if the mutation failed.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Updated | Self::RequiresLogin => None,
        }
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// Client-side mirror of the server cart.
///
/// Cheap to clone; all clones share the same snapshot.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartInner>,
}

struct CartInner {
    api: ApiClient,
    session: SessionStore,
    /// Latest fetched cart, `None` before the first fetch or after logout.
    snapshot: RwLock<Option<CartSnapshot>>,
    /// Serializes mutations (and their refetches) and explicit refreshes.
    write_lock: Mutex<()>,
}

impl CartStore {
    /// Create a cart store with an empty mirror.
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore) -> Self {
        Self {
            inner: Arc::new(CartInner {
                api,
                session,
                snapshot: RwLock::new(None),
                write_lock: Mutex::new(()),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The latest cart snapshot, if one has been fetched.
    pub async fn snapshot(&self) -> Option<CartSnapshot> {
        self.inner.snapshot.read().await.clone()
    }

    /// Total number of units in the cart (sum of line quantities).
    ///
    /// Zero when no snapshot is present.
    pub async fn item_count(&self) -> u32 {
        self.inner
            .snapshot
            .read()
            .await
            .as_ref()
            .map_or(0, |cart| cart.items.iter().map(|line| line.quantity).sum())
    }

    /// Server-computed cart total, zero when no snapshot is present.
    pub async fn total_price(&self) -> Decimal {
        self.inner
            .snapshot
            .read()
            .await
            .as_ref()
            .map_or(Decimal::ZERO, |cart| cart.total_price)
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Refetch the cart from the backend and replace the snapshot.
    ///
    /// Signed out, this clears the snapshot without touching the network.
    /// A failed fetch keeps the previous snapshot; a stale mirror beats an
    /// empty one mid-session.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let _guard = self.inner.write_lock.lock().await;
        self.refetch_locked().await;
    }

    /// Spawn a task that keeps the mirror aligned with the session:
    /// fetches on login, clears on logout.
    ///
    /// The task holds only a weak handle to the store, so it does not keep
    /// the store alive. It exits once every other handle is gone: either
    /// the auth channel closes, or the weak upgrade fails on the next
    /// transition.
    #[must_use]
    pub fn spawn_auth_watcher(&self) -> tokio::task::JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        let mut auth_rx = self.inner.session.subscribe();
        tokio::spawn(async move {
            loop {
                let authenticated = *auth_rx.borrow_and_update();
                {
                    let Some(inner) = weak.upgrade() else { break };
                    let store = Self { inner };
                    if authenticated {
                        store.refresh().await;
                    } else {
                        let _guard = store.inner.write_lock.lock().await;
                        *store.inner.snapshot.write().await = None;
                    }
                }
                if auth_rx.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart. Adding a product already in the cart
    /// increments that line's quantity.
    #[instrument(skip(self), fields(product_id = %product_id, quantity))]
    pub async fn add_item(&self, product_id: ProductId, quantity: u32) -> CartOutcome {
        self.mutate(|api| async move { api.add_cart_item(product_id, quantity).await })
            .await
    }

    /// Set a cart line's quantity. Zero removes the line.
    #[instrument(skip(self), fields(line_id = %line_id, quantity))]
    pub async fn update_item(&self, line_id: CartLineId, quantity: u32) -> CartOutcome {
        self.mutate(|api| async move { api.update_cart_item(line_id, quantity).await })
            .await
    }

    /// Remove a cart line.
    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn remove_item(&self, line_id: CartLineId) -> CartOutcome {
        self.mutate(|api| async move { api.remove_cart_item(line_id).await })
            .await
    }

    /// Remove every line from the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> CartOutcome {
        self.mutate(|api| async move { api.clear_cart().await }).await
    }

    /// Run one cart mutation under the store policy: auth guard, wire call,
    /// unconditional refetch.
    async fn mutate<F, Fut>(&self, operation: F) -> CartOutcome
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<(), ApiError>>,
    {
        if !self.inner.session.is_authenticated() {
            return CartOutcome::RequiresLogin;
        }

        let _guard = self.inner.write_lock.lock().await;

        match operation(self.inner.api.clone()).await {
            Ok(()) => {
                self.refetch_locked().await;
                CartOutcome::Updated
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart mutation rejected");
                // The backend may have partially applied the change before
                // rejecting; resync so the mirror shows what actually stuck.
                self.refetch_locked().await;
                CartOutcome::Failed(e.user_message())
            }
        }
    }

    /// Replace the snapshot from the backend. Caller must hold `write_lock`.
    async fn refetch_locked(&self) {
        if !self.inner.session.is_authenticated() {
            *self.inner.snapshot.write().await = None;
            return;
        }

        match self.inner.api.fetch_cart().await {
            Ok(cart) => {
                tracing::debug!(items = cart.items.len(), "cart snapshot refreshed");
                *self.inner.snapshot.write().await = Some(cart);
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart refetch failed, keeping previous snapshot");
            }
        }
    }
}
