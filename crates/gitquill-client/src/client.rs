//! Main client implementation.

use std::sync::Arc;
use std::time::Duration;

use gitquill_config::GitHubSection;
use gitquill_oauth::OAuthConfig;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{EditsApi, ReposApi};
use crate::auth::Navigator;
use crate::error::{Error, Result};
use crate::session::{AuthPhase, Session, SessionState};
use crate::storage::{NullStore, SharedStore};

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Media type requested from the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub REST API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Upstream repository that edits are proposed against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoCoordinates {
    pub owner: String,
    pub name: String,
}

/// GitHub editing client.
///
/// One client holds one session. Clones share it, so construct the client
/// once at startup and hand clones to whatever needs it.
///
/// # Example
///
/// ```no_run
/// use gitquill_client::EditClient;
///
/// # async fn example() -> gitquill_client::Result<()> {
/// let client = EditClient::builder()
///     .repository("aimerfeng", "AimerFeng_blog")
///     .build()?;
///
/// client.init().await;
/// if client.is_authenticated() {
///     let fork = client.repos().fork_repo().await?;
///     println!("Fork: {}", fork.full_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EditClient {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: Url,
    pub(crate) exchange_url: Url,
    pub(crate) oauth: OAuthConfig,
    pub(crate) repo: RepoCoordinates,
    pub(crate) timeout: Duration,
    pub(crate) store: SharedStore,
    pub(crate) navigator: Option<Arc<dyn Navigator>>,
    pub(crate) state: SessionState,
}

impl EditClient {
    pub(crate) fn inner(&self) -> &ClientInner {
        &self.inner
    }
}

impl std::fmt::Debug for EditClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditClient")
            .field("api_url", &self.inner.api_url.as_str())
            .field("repo", &self.inner.repo)
            .field("phase", &self.inner.state.phase())
            .finish_non_exhaustive()
    }
}

impl EditClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Upstream repository coordinates.
    pub fn repository(&self) -> &RepoCoordinates {
        &self.inner.repo
    }

    /// REST API base URL.
    pub fn api_url(&self) -> &Url {
        &self.inner.api_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Session accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.state.snapshot()
    }

    /// Token and profile are both loaded.
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.snapshot().is_authenticated()
    }

    /// The loaded user owns the upstream repository.
    pub fn is_owner(&self) -> bool {
        self.inner.state.snapshot().is_owner(&self.inner.repo.owner)
    }

    /// A token exchange or profile fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.state.is_loading()
    }

    /// Last error recorded by a session operation.
    pub fn last_error(&self) -> Option<Error> {
        self.inner.state.last_error()
    }

    /// Current authorization phase.
    pub fn phase(&self) -> AuthPhase {
        self.inner.state.phase()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the repository mutation API.
    pub fn repos(&self) -> ReposApi {
        ReposApi::new(self.clone())
    }

    /// Access the end-to-end edit workflow.
    pub fn edits(&self) -> EditsApi {
        EditsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authenticated fetch
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve an absolute URL or an API-relative path.
    pub(crate) fn url(&self, url: &str) -> Result<Url> {
        if let Ok(parsed) = Url::parse(url)
            && matches!(parsed.scheme(), "http" | "https")
        {
            return Ok(parsed);
        }

        self.inner
            .api_url
            .join(url.trim_start_matches('/'))
            .map_err(|e| Error::RequestFailed {
                status: None,
                message: format!("invalid URL '{}': {}", url, e),
            })
    }

    /// URL of a file in the contents API.
    ///
    /// Each `/`-separated part of `path` becomes its own percent-encoded
    /// segment, so `#`, `?` and `%` stay part of the file name.
    pub(crate) fn contents_url(&self, owner: &str, repo: &str, path: &str) -> Result<Url> {
        let mut url = self.inner.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::RequestFailed {
                status: None,
                message: format!("API URL '{}' cannot take a path", self.inner.api_url),
            })?
            .pop_if_empty()
            .extend(["repos", owner, repo, "contents"])
            .extend(path.split('/').filter(|part| !part.is_empty()));
        Ok(url)
    }

    /// Issue an authenticated request and return the parsed JSON body.
    ///
    /// Fails with [`Error::NotAuthenticated`] before touching the network when
    /// no token is held. Every call is a single attempt.
    pub async fn github_fetch(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<serde_json::Value> {
        let token = self.inner.state.token().ok_or_else(Error::not_authenticated)?;
        let url = self.url(url)?;

        let mut headers = auth_headers(&token)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);

        tracing::debug!(method = %options.method, url = %url, "GitHub request");

        let mut request = self
            .inner
            .http
            .request(options.method, url)
            .headers(headers)
            .timeout(self.inner.timeout);
        if let Some(body) = options.body {
            request = request.body(body.to_string());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_body: serde_json::Value = response
                .json()
                .await
                .unwrap_or_else(|_| serde_json::json!({}));
            let message = error_body
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("request failed: {}", status.as_u16()));
            tracing::debug!(status = status.as_u16(), %message, "GitHub request failed");
            return Err(Error::RequestFailed {
                status: Some(status.as_u16()),
                message,
            });
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| Error::RequestFailed {
            status: Some(status.as_u16()),
            message: format!("invalid JSON response: {}", e),
        })
    }

    /// [`github_fetch`](Self::github_fetch) deserialized into `T`.
    pub async fn github_fetch_as<T: DeserializeOwned>(
        &self,
        url: &str,
        options: FetchOptions,
    ) -> Result<T> {
        let value = self.github_fetch(url, options).await?;
        serde_json::from_value(value).map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("unexpected response shape: {}", e),
        })
    }
}

/// Bearer and accept headers shared by every GitHub request.
pub(crate) fn auth_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::NotAuthenticated("access token is not a valid header value".into()))?;
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
    Ok(headers)
}

/// Method, extra headers, and JSON body for [`EditClient::github_fetch`].
///
/// Headers set here override the defaults.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<serde_json::Value>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl FetchOptions {
    pub fn get() -> Self {
        Self::new(Method::GET, None)
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self::new(Method::POST, Some(body))
    }

    /// POST with no body.
    pub fn post_empty() -> Self {
        Self::new(Method::POST, None)
    }

    pub fn put(body: serde_json::Value) -> Self {
        Self::new(Method::PUT, Some(body))
    }

    pub fn new(method: Method, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Add or override a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Builder for creating an [`EditClient`].
pub struct ClientBuilder {
    api_url: String,
    exchange_url: String,
    oauth: OAuthConfig,
    repo: RepoCoordinates,
    timeout: Duration,
    user_agent: Option<String>,
    store: Option<SharedStore>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        let section = GitHubSection::default();
        Self {
            api_url: GITHUB_API_URL.to_string(),
            exchange_url: section.exchange_url,
            oauth: OAuthConfig::github(String::new()),
            repo: RepoCoordinates {
                owner: section.repo_owner,
                name: section.repo_name,
            },
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
            store: None,
            navigator: None,
        }
    }

    /// Builder seeded from a `[github]` config section.
    ///
    /// `client_id` is the already-resolved OAuth client ID.
    pub fn from_config(section: &GitHubSection, client_id: Option<String>) -> Self {
        Self::new()
            .api_url(&section.api_url)
            .exchange_url(&section.exchange_url)
            .oauth(OAuthConfig {
                client_id: client_id.unwrap_or_default(),
                authorize_url: section.authorize_url.clone(),
                redirect_uri: section.redirect_uri.clone(),
                scope: section.scope.clone(),
            })
            .repository(&section.repo_owner, &section.repo_name)
            .timeout(section.timeout())
    }

    /// Set the REST API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the token exchange proxy endpoint.
    pub fn exchange_url(mut self, url: impl Into<String>) -> Self {
        self.exchange_url = url.into();
        self
    }

    /// Set the OAuth app configuration.
    pub fn oauth(mut self, oauth: OAuthConfig) -> Self {
        self.oauth = oauth;
        self
    }

    /// Set the upstream repository.
    pub fn repository(mut self, owner: impl Into<String>, name: impl Into<String>) -> Self {
        self.repo = RepoCoordinates {
            owner: owner.into(),
            name: name.into(),
        };
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the persistence backend. Defaults to [`NullStore`].
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the navigator that performs the authorization redirect.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<EditClient> {
        let mut api_url = Url::parse(&self.api_url)
            .map_err(|e| Error::Config(format!("invalid api_url '{}': {}", self.api_url, e)))?;
        if !api_url.path().ends_with('/') {
            api_url.set_path(&format!("{}/", api_url.path()));
        }

        let exchange_url = Url::parse(&self.exchange_url).map_err(|e| {
            Error::Config(format!(
                "invalid exchange_url '{}': {}",
                self.exchange_url, e
            ))
        })?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("gitquill/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(EditClient {
            inner: Arc::new(ClientInner {
                http,
                api_url,
                exchange_url,
                oauth: self.oauth,
                repo: self.repo,
                timeout: self.timeout,
                store: self.store.unwrap_or_else(|| Arc::new(NullStore)),
                navigator: self.navigator,
                state: SessionState::default(),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
