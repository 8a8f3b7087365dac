//! Authentication endpoint wrappers.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::types::{Credentials, Registration, UserProfile};

use super::ApiClient;

/// Token+user pair returned by login and registration.
#[derive(Debug)]
pub struct AuthSession {
    /// The issued auth token.
    pub token: SecretString,
    /// Profile of the authenticated user.
    pub user: UserProfile,
}

#[derive(Deserialize)]
struct AuthPayload {
    token: String,
    user: UserProfile,
}

impl ApiClient {
    /// Exchange credentials for a token and profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let body = serde_json::json!({
            "username": credentials.username,
            "password": credentials.password.expose_secret(),
        });

        let payload: AuthPayload = self.post("/auth/login/", &body).await?;
        Ok(AuthSession {
            token: SecretString::from(payload.token),
            user: payload.user,
        })
    }

    /// Create an account; the backend returns a token+user pair treated
    /// identically to login.
    ///
    /// # Errors
    ///
    /// Returns an error on field validation failures or if the request fails.
    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let body = serde_json::json!({
            "username": registration.username,
            "email": registration.email,
            "password": registration.password.expose_secret(),
            "first_name": registration.first_name,
            "last_name": registration.last_name,
        });

        let payload: AuthPayload = self.post("/auth/register/", &body).await?;
        Ok(AuthSession {
            token: SecretString::from(payload.token),
            user: payload.user,
        })
    }

    /// Invalidate the current token server-side.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; the session store treats that
    /// as best-effort and logs out locally regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self.post("/auth/logout/", &serde_json::json!({})).await?;
        Ok(())
    }

    /// Fetch the profile for the installed token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing/invalid or the request fails.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.get("/auth/user/").await
    }
}
