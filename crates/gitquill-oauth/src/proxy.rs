//! Token exchange proxy.
//!
//! Accepts `POST /api/github-oauth` with `{"code": "..."}`, trades the code for
//! an access token using the server-side client secret, and returns the token
//! tuple. Holds no state between requests.

use axum::{
    Json, Router as AxumRouter,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::error::OAuthError;
use crate::oauth::{GITHUB_TOKEN_URL, ProviderExchange, TokenResponse, exchange_code_with_provider};

/// Route the exchange handler is mounted on.
pub const EXCHANGE_PATH: &str = "/api/github-oauth";

/// Upper bound on a single provider token request.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the proxy server.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub enable_cors: bool,
    pub token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Per-request timeout for the provider token endpoint.
    pub timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            enable_cors: true,
            token_url: GITHUB_TOKEN_URL.to_string(),
            client_id: None,
            client_secret: None,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

impl ProxyConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = Some(client_id.into());
        self.client_secret = Some(client_secret.into());
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Shared state for the proxy server.
struct ProxyState {
    http: reqwest::Client,
    config: ProxyConfig,
}

/// The token exchange proxy server.
pub struct ProxyServer {
    config: ProxyConfig,
    state: Arc<ProxyState>,
}

impl ProxyServer {
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            state: Arc::new(ProxyState {
                http: reqwest::Client::new(),
                config: config.clone(),
            }),
            config,
        }
    }

    /// Build the axum router.
    pub fn router(&self) -> AxumRouter {
        let mut router = AxumRouter::new()
            .route(
                EXCHANGE_PATH,
                post(handle_exchange).fallback(handle_method_not_allowed),
            )
            .route("/health", get(handle_health))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Starting token exchange proxy");
        tokio::spawn(async move {
            axum::serve(listener, self.router())
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    code: Option<String>,
}

/// Handle POST /api/github-oauth
async fn handle_exchange(
    State(state): State<Arc<ProxyState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, ProxyError> {
    let code = serde_json::from_slice::<ExchangeRequest>(&body)
        .ok()
        .and_then(|req| req.code)
        .filter(|code| !code.is_empty())
        .ok_or(ProxyError::MissingCode)?;

    let config = &state.config;
    let (Some(client_id), Some(client_secret)) = (&config.client_id, &config.client_secret) else {
        tracing::error!("Token exchange requested but OAuth credentials are not configured");
        return Err(ProxyError::NotConfigured);
    };

    match exchange_code_with_provider(
        &state.http,
        &config.token_url,
        client_id,
        client_secret,
        &code,
        config.timeout,
    )
    .await
    {
        Ok(ProviderExchange::Token(token)) => {
            tracing::info!(scope = %token.scope, "Exchanged OAuth code for token");
            Ok(Json(token))
        }
        Ok(ProviderExchange::Rejected(message)) => {
            tracing::warn!(error = %message, "Provider rejected OAuth code");
            Err(ProxyError::Rejected(message))
        }
        Err(e) => {
            tracing::error!(error = %e, "OAuth token exchange failed");
            Err(ProxyError::Upstream(e))
        }
    }
}

async fn handle_method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// Handle GET /health
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "gitquill-oauth-proxy"
    }))
}

/// Error type for proxy responses.
#[derive(Debug)]
pub enum ProxyError {
    MethodNotAllowed,
    MissingCode,
    NotConfigured,
    Rejected(String),
    Upstream(OAuthError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ProxyError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            ProxyError::MissingCode => {
                (StatusCode::BAD_REQUEST, "Missing code parameter".to_string())
            }
            ProxyError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GitHub OAuth not configured".to_string(),
            ),
            ProxyError::Rejected(message) => (StatusCode::BAD_REQUEST, message),
            ProxyError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to exchange token".to_string(),
            ),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn send(router: AxumRouter, method: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(EXCHANGE_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn configured() -> ProxyConfig {
        ProxyConfig::default().with_credentials("id", "secret")
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = ProxyServer::new(ProxyConfig::default());
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let router = ProxyServer::new(configured()).router();
        let (status, body) = send(router, "GET", "").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["error"], "Method not allowed");
    }

    #[tokio::test]
    async fn test_missing_code_is_bad_request() {
        for payload in ["{}", "", "not json", r#"{"code":""}"#] {
            let router = ProxyServer::new(configured()).router();
            let (status, body) = send(router, "POST", payload).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
            assert_eq!(body["error"], "Missing code parameter");
        }
    }

    #[tokio::test]
    async fn test_unconfigured_credentials() {
        let router = ProxyServer::new(ProxyConfig::default()).router();
        let (status, body) = send(router, "POST", r#"{"code":"abc"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "GitHub OAuth not configured");
    }

    #[test]
    fn test_proxy_config_default() {
        let config = ProxyConfig::default();
        assert!(config.enable_cors);
        assert_eq!(config.token_url, GITHUB_TOKEN_URL);
        assert!(config.client_secret.is_none());
        assert_eq!(config.timeout, DEFAULT_PROVIDER_TIMEOUT);
    }
}
