//! Client error types.

use thiserror::Error;

/// Client error type.
///
/// Every variant carries a message so the value can be stored as the
/// session's last error and shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The callback `state` did not match the persisted nonce.
    #[error("{0}")]
    StateMismatch(String),

    /// The token exchange proxy failed or refused the code.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The user profile could not be fetched; the session was dropped.
    #[error("Failed to fetch user profile: {0}")]
    ProfileFetchFailed(String),

    /// An authenticated request was attempted without a token.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// A GitHub API request failed.
    ///
    /// `message` is the provider's own message when the error body had one.
    #[error("{message}")]
    RequestFailed {
        /// HTTP status, absent for transport failures.
        status: Option<u16>,
        /// Provider message or a generic fallback.
        message: String,
    },

    /// Persisted client state could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn state_mismatch() -> Self {
        Error::StateMismatch("State verification failed, please try again".to_string())
    }

    pub(crate) fn not_authenticated() -> Self {
        Error::NotAuthenticated("no access token held".to_string())
    }

    /// HTTP status of a failed request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::NotAuthenticated(_)) || self.status() == Some(401)
    }

    /// Check if the provider reported that the resource already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::RequestFailed { message, .. } if message.contains("already exists"))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::RequestFailed {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<gitquill_config::ConfigError> for Error {
    fn from(e: gitquill_config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
