//! HTTP client for the Haberdash backend REST API.
//!
//! # Architecture
//!
//! - The backend is the source of truth - no local persistence beyond the
//!   auth token, direct API calls for everything
//! - One [`ApiClient`] per process, `Clone` via `Arc`
//! - Authenticated requests carry `Authorization: Token <key>`
//! - Every non-success response is decoded once into [`ApiError`]
//!   (see [`crate::error`]); callers never inspect raw bodies
//!
//! Endpoint wrappers are grouped by resource: [`auth`], [`catalog`],
//! [`cart`], [`orders`], [`admin`].

mod admin;
mod auth;
mod cart;
mod catalog;
mod orders;

pub use auth::AuthSession;

use std::sync::{Arc, RwLock};

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::{ApiError, decode_rejection};

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Haberdash backend API.
///
/// Holds the base URL, the shared `reqwest` client, and the current auth
/// token. The token slot is set by the session store after login and
/// cleared on logout; every request snapshot-reads it.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_url.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Install the auth token carried on subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(token);
    }

    /// Drop the auth token; subsequent requests go out unauthenticated.
    pub fn clear_token(&self) {
        *self
            .inner
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    /// Whether a token is currently installed.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Execute a request and decode the JSON response.
    ///
    /// `path` must start with `/` and keep the backend's trailing slash.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let mut request = self.inner.http.request(method, self.endpoint(path));

        if !query.is_empty() {
            request = request.query(query);
        }

        {
            let token = self
                .inner
                .token
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(token) = token.as_ref() {
                request = request.header(
                    reqwest::header::AUTHORIZATION,
                    format!("Token {}", token.expose_secret()),
                );
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let rejection = decode_rejection(status, &text);
            tracing::debug!(%status, path, message = %rejection.message, "backend rejected request");
            return Err(ApiError::Rejected(rejection));
        }

        // 204 No Content responses have an empty body; decode those as null
        // so callers expecting a bare `Value` still succeed.
        if text.is_empty() {
            return Ok(serde_json::from_str("null")?);
        }

        Ok(serde_json::from_str(&text)?)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, &[]).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request(Method::GET, path, None, query).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, Some(body), &[]).await
    }

    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        self.request(Method::PATCH, path, Some(body), &[]).await
    }

    /// DELETE with an optional JSON body.
    ///
    /// The cart endpoints identify the target line in the request body, not
    /// the path, so DELETE must be able to carry one.
    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, body, &[]).await
    }
}
