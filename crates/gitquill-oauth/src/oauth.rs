//! OAuth 2.0 authorization-code flow for GitHub.

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};

/// GitHub authorization page.
pub const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";

/// GitHub token endpoint.
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// OAuth configuration for the browser-facing half of the flow.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub authorize_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthConfig {
    /// GitHub config with the fixed callback route and `public_repo` scope.
    pub fn github(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            authorize_url: GITHUB_AUTHORIZE_URL.to_string(),
            redirect_uri: "http://localhost:3333/admin/callback".to_string(),
            scope: "public_repo".to_string(),
        }
    }
}

/// Generate a random state string for CSRF protection.
pub fn generate_state() -> String {
    let mut state_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut state_bytes);
    URL_SAFE_NO_PAD.encode(state_bytes)
}

/// Build the authorization URL for the OAuth flow.
pub fn build_authorization_url(config: &OAuthConfig, state: &str) -> String {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", config.scope.as_str()),
        ("state", state),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", config.authorize_url, query)
}

/// Token tuple returned by the exchange proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
}

/// Outcome of a code exchange with the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderExchange {
    /// The provider issued a token.
    Token(TokenResponse),
    /// The provider answered with an OAuth error (bad code, expired code, ...).
    Rejected(String),
}

#[derive(Debug, Serialize)]
struct ProviderTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderTokenResponse {
    access_token: Option<String>,
    token_type: Option<String>,
    scope: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange an authorization code for an access token.
///
/// The provider reports OAuth errors with a `200` and an `error` field, so
/// those come back as [`ProviderExchange::Rejected`] rather than `Err`.
/// A provider that does not answer within `timeout` is a network error.
pub async fn exchange_code_with_provider(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    timeout: Duration,
) -> Result<ProviderExchange> {
    let request_body = ProviderTokenRequest {
        client_id,
        client_secret,
        code,
    };

    let response = http
        .post(token_url)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .json(&request_body)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| OAuthError::Transport(format!("Token exchange request failed: {}", e)))?;

    let data: ProviderTokenResponse = response
        .json()
        .await
        .map_err(|e| OAuthError::Provider(format!("Failed to parse token response: {}", e)))?;

    if let Some(error) = data.error {
        return Ok(ProviderExchange::Rejected(
            data.error_description.unwrap_or(error),
        ));
    }

    let access_token = data
        .access_token
        .ok_or_else(|| OAuthError::Provider("Token response has no access_token".to_string()))?;

    Ok(ProviderExchange::Token(TokenResponse {
        access_token,
        token_type: data.token_type.unwrap_or_default(),
        scope: data.scope.unwrap_or_default(),
    }))
}

/// Pull `code` and `state` out of the URL the provider redirected to.
pub fn parse_callback_url(input: &str) -> Result<(String, String)> {
    let url = url::Url::parse(input.trim())
        .map_err(|e| OAuthError::InvalidCallback(format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, state) {
        (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => Ok((code, state)),
        _ => Err(OAuthError::InvalidCallback(
            "Missing code or state".to_string(),
        )),
    }
}
