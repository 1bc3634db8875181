//! OAuth authorization-code flow and session lifecycle.
//!
//! ```text
//! Anonymous → Redirecting → AwaitingCallback → Exchanging → FetchingProfile → Authenticated
//!                                  │                │               │
//!                                  └────────────────┴───────────────┴──→ Error
//! ```
//!
//! Failures at the operation boundary are recorded as the client's last
//! error and reported through the return value instead of being propagated.

use std::fmt::Debug;

use gitquill_oauth::TokenResponse;
use gitquill_oauth::oauth::{build_authorization_url, generate_state};
use serde_json::json;

use crate::client::{EditClient, auth_headers};
use crate::error::Error;
use crate::session::AuthPhase;
use crate::storage::{STATE_KEY, TOKEN_KEY};
use crate::types::UserProfile;

/// Sends the user to the provider's authorization page.
pub trait Navigator: Send + Sync + Debug {
    /// Navigate to `url`.
    fn navigate(&self, url: &str) -> std::io::Result<()>;
}

impl EditClient {
    /// Hydrate the session from the store and load the profile for a
    /// persisted token.
    pub async fn init(&self) {
        let state = &self.inner().state;

        match self.inner().store.get(TOKEN_KEY) {
            Ok(Some(token)) => state.set_token(token),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to read persisted token"),
        }

        if state.token().is_some() && !state.has_user() {
            self.fetch_user().await;
        }
    }

    /// Start the authorization flow.
    ///
    /// Persists a fresh state nonce and hands the authorization URL to the
    /// navigator. Without a navigator there is nowhere to redirect, so this
    /// does nothing.
    pub fn login(&self) {
        let inner = self.inner();
        let Some(navigator) = inner.navigator.as_ref() else {
            tracing::debug!("No navigator configured, skipping login redirect");
            return;
        };

        inner.state.set_phase(AuthPhase::Redirecting);
        let nonce = generate_state();
        if let Err(e) = inner.store.set(STATE_KEY, &nonce) {
            tracing::warn!(error = %e, "Failed to persist OAuth state");
        }

        let url = build_authorization_url(&inner.oauth, &nonce);
        tracing::info!(authorize_url = %inner.oauth.authorize_url, "Redirecting to authorization page");

        // A failed open still leaves the URL usable by hand.
        if let Err(e) = navigator.navigate(&url) {
            tracing::warn!(error = %e, "Navigator could not open authorization page");
        }
        inner.state.set_phase(AuthPhase::AwaitingCallback);
    }

    /// Complete the flow with the `code` and `state` the provider sent back.
    ///
    /// Returns `true` once a token has been obtained and stored. The profile
    /// fetch that follows reports its own failure through
    /// [`last_error`](Self::last_error) and [`is_authenticated`](Self::is_authenticated).
    pub async fn handle_callback(&self, code: &str, state: &str) -> bool {
        let inner = self.inner();

        let saved = match inner.store.get(STATE_KEY) {
            Ok(saved) => saved,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted OAuth state");
                None
            }
        };
        if saved.as_deref() != Some(state) {
            tracing::warn!("OAuth state mismatch, rejecting callback");
            inner.state.record_error(Error::state_mismatch());
            inner.state.set_phase(AuthPhase::Error);
            return false;
        }

        if let Err(e) = inner.store.remove(STATE_KEY) {
            tracing::error!(error = %e, "Failed to discard OAuth state");
            inner.state.record_error(e);
            inner.state.set_phase(AuthPhase::Error);
            return false;
        }

        let _loading = inner.state.begin_loading();
        inner.state.clear_error();
        inner.state.set_phase(AuthPhase::Exchanging);

        let token = match self.exchange_code(code).await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Token exchange failed");
                inner.state.record_error(e);
                inner.state.set_phase(AuthPhase::Error);
                return false;
            }
        };

        inner.state.set_token(token.access_token.clone());
        if let Err(e) = inner.store.set(TOKEN_KEY, &token.access_token) {
            tracing::warn!(error = %e, "Failed to persist access token");
        }
        tracing::info!(scope = %token.scope, "OAuth token obtained");

        self.fetch_user().await;
        true
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        let inner = self.inner();
        let response = inner
            .http
            .post(inner.exchange_url.clone())
            .json(&json!({ "code": code }))
            .timeout(inner.timeout)
            .send()
            .await
            .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| json!({}));
            let message = detail
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("proxy returned {}", status.as_u16()));
            return Err(Error::TokenExchangeFailed(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::TokenExchangeFailed(format!("invalid proxy response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(Error::TokenExchangeFailed(
                "proxy returned an empty access token".to_string(),
            ));
        }
        Ok(token)
    }

    /// Load the authenticated user's profile.
    ///
    /// Does nothing without a token. Any failure ends the session. A result
    /// that arrives after the token was replaced or dropped is discarded.
    pub async fn fetch_user(&self) {
        let inner = self.inner();
        let Some(token) = inner.state.token() else {
            return;
        };

        let _loading = inner.state.begin_loading();
        inner.state.set_phase(AuthPhase::FetchingProfile);

        match self.request_profile(&token).await {
            Ok(user) => {
                let login = user.login.clone();
                if inner.state.set_user(&token, user) {
                    tracing::info!(%login, "Loaded GitHub profile");
                    inner.state.set_phase(AuthPhase::Authenticated);
                } else {
                    tracing::debug!(%login, "Token changed during profile fetch, discarding profile");
                }
            }
            Err(e) => {
                if !inner.state.clear_if_token(&token) {
                    tracing::debug!(error = %e, "Token changed during profile fetch, ignoring failure");
                    return;
                }
                tracing::warn!(error = %e, "Profile fetch failed, logging out");
                if let Err(store_err) = inner.store.remove(TOKEN_KEY) {
                    tracing::warn!(error = %store_err, "Failed to remove persisted token");
                }
                inner.state.record_error(e);
                inner.state.set_phase(AuthPhase::Error);
            }
        }
    }

    async fn request_profile(&self, token: &str) -> Result<UserProfile, Error> {
        let inner = self.inner();
        let url = self
            .url("user")
            .map_err(|e| Error::ProfileFetchFailed(e.to_string()))?;
        let headers = auth_headers(token).map_err(|e| Error::ProfileFetchFailed(e.to_string()))?;

        let response = inner
            .http
            .get(url)
            .headers(headers)
            .timeout(inner.timeout)
            .send()
            .await
            .map_err(|e| Error::ProfileFetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::ProfileFetchFailed(format!(
                "GitHub returned {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::ProfileFetchFailed(format!("invalid profile response: {}", e)))
    }

    /// Drop the token and profile, in memory and in the store.
    pub fn logout(&self) {
        let inner = self.inner();
        inner.state.clear();
        if let Err(e) = inner.store.remove(TOKEN_KEY) {
            tracing::warn!(error = %e, "Failed to remove persisted token");
        }
        inner.state.set_phase(AuthPhase::Anonymous);
        tracing::info!("Logged out");
    }
}
