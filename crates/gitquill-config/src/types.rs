//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default values shared by the config sections.
pub mod defaults {
    /// Owner of the upstream content repository.
    pub const REPO_OWNER: &str = "aimerfeng";
    /// Name of the upstream content repository.
    pub const REPO_NAME: &str = "AimerFeng_blog";
    /// GitHub REST API base URL.
    pub const API_URL: &str = "https://api.github.com";
    /// GitHub authorization page.
    pub const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
    /// GitHub token endpoint used by the exchange proxy.
    pub const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
    /// Where GitHub sends the user back after authorizing.
    pub const REDIRECT_URI: &str = "http://localhost:3333/admin/callback";
    /// Requested OAuth scope.
    pub const SCOPE: &str = "public_repo";
    /// Token exchange proxy endpoint.
    pub const EXCHANGE_URL: &str = "http://127.0.0.1:8787/api/github-oauth";
    /// Proxy bind address.
    pub const PROXY_BIND: &str = "127.0.0.1:8787";
    /// Per-request timeout in seconds.
    pub const TIMEOUT_SECS: u64 = 30;
}

// ─────────────────────────────────────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration.
///
/// Sections are optional so that layered files only replace what they declare.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitQuillConfig {
    /// OAuth app and upstream repository settings.
    pub github: Option<GitHubSection>,

    /// Token exchange proxy settings.
    pub proxy: Option<ProxySection>,

    /// Persisted client state settings.
    pub storage: Option<StorageSection>,
}

impl GitQuillConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every section present with its default values.
    pub fn with_defaults() -> Self {
        Self {
            github: Some(GitHubSection::default()),
            proxy: Some(ProxySection::default()),
            storage: Some(StorageSection::default()),
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> crate::Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: GitQuillConfig) {
        if other.github.is_some() {
            self.github = other.github;
        }

        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }

        if other.storage.is_some() {
            self.storage = other.storage;
        }
    }

    /// The `[github]` section, or its defaults.
    pub fn github(&self) -> GitHubSection {
        self.github.clone().unwrap_or_default()
    }

    /// The `[proxy]` section, or its defaults.
    pub fn proxy(&self) -> ProxySection {
        self.proxy.clone().unwrap_or_default()
    }

    /// The `[storage]` section, or its defaults.
    pub fn storage(&self) -> StorageSection {
        self.storage.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GitHub Section
// ─────────────────────────────────────────────────────────────────────────────

/// OAuth app and upstream repository configuration.
///
/// The redirect URI and scope are fixed per deployment; there is a single
/// redirect target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSection {
    /// OAuth app client ID. `GITHUB_CLIENT_ID` takes precedence.
    pub client_id: Option<String>,
    /// Owner of the upstream repository; this login is also the site owner.
    pub repo_owner: String,
    /// Name of the upstream repository.
    pub repo_name: String,
    /// REST API base URL.
    pub api_url: String,
    /// Authorization page URL.
    pub authorize_url: String,
    /// OAuth redirect URI.
    pub redirect_uri: String,
    /// OAuth scope.
    pub scope: String,
    /// Token exchange proxy endpoint.
    pub exchange_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            client_id: None,
            repo_owner: defaults::REPO_OWNER.to_string(),
            repo_name: defaults::REPO_NAME.to_string(),
            api_url: defaults::API_URL.to_string(),
            authorize_url: defaults::AUTHORIZE_URL.to_string(),
            redirect_uri: defaults::REDIRECT_URI.to_string(),
            scope: defaults::SCOPE.to_string(),
            exchange_url: defaults::EXCHANGE_URL.to_string(),
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

impl GitHubSection {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Proxy Section
// ─────────────────────────────────────────────────────────────────────────────

/// Token exchange proxy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySection {
    /// Address to bind to.
    pub bind: String,
    /// Provider token endpoint.
    pub token_url: String,
    /// OAuth app client ID. `GITHUB_CLIENT_ID` takes precedence.
    pub client_id: Option<String>,
    /// OAuth app client secret. `GITHUB_CLIENT_SECRET` takes precedence.
    pub client_secret: Option<String>,
    /// Allow cross-origin requests.
    pub enable_cors: bool,
    /// Seconds to wait for the provider token endpoint.
    pub timeout_secs: u64,
}

impl Default for ProxySection {
    fn default() -> Self {
        Self {
            bind: defaults::PROXY_BIND.to_string(),
            token_url: defaults::TOKEN_URL.to_string(),
            client_id: None,
            client_secret: None,
            enable_cors: true,
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

impl ProxySection {
    /// Provider request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Storage Section
// ─────────────────────────────────────────────────────────────────────────────

/// Where persisted client state lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Directory for the state file. Defaults to the config directory.
    pub dir: Option<PathBuf>,
}
