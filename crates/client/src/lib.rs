//! Haberdash client library.
//!
//! A typed HTTP client plus two client-side state stores for a menswear
//! storefront backend. The backend owns all business logic (inventory,
//! pricing, order transitions); this crate mirrors server state into the
//! running client and keeps it in sync.
//!
//! # Architecture
//!
//! - [`ApiClient`] - thin `reqwest` wrapper for the backend's REST surface;
//!   decodes every non-success response into a typed [`ApiError`] once, at
//!   the network boundary
//! - [`SessionStore`] - who is logged in; persists the auth token through a
//!   [`TokenStore`] and broadcasts the authentication flag
//! - [`CartStore`] - mirror of the server-side cart; every mutation is
//!   followed by a full refetch (refetch-after-write is the only
//!   consistency mechanism, by policy)
//!
//! # Example
//!
//! ```rust,ignore
//! use haberdash_client::{ApiClient, CartStore, ClientConfig, FileTokenStore, SessionStore};
//!
//! let config = ClientConfig::from_env()?;
//! let api = ApiClient::new(&config)?;
//! let session = SessionStore::new(api.clone(), Arc::new(FileTokenStore::new(config.token_path.clone())));
//! session.initialize().await;
//!
//! let cart = CartStore::new(api.clone(), session.clone());
//! let _watcher = cart.spawn_auth_watcher();
//!
//! let outcome = cart.add_item(ProductId::new(7), 2).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod session;
pub mod token;
pub mod types;

pub use api::ApiClient;
pub use cart::{CartOutcome, CartStore};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Rejection, RejectionKind};
pub use session::SessionStore;
pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
