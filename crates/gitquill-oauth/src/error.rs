//! Failures of the provider exchange and callback parsing.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Why a token exchange or callback could not be completed.
///
/// A provider that answers with an OAuth `error` field is not an
/// `OAuthError`; see [`ProviderExchange::Rejected`](crate::oauth::ProviderExchange::Rejected).
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The provider could not be reached or did not answer in time.
    #[error("Network error: {0}")]
    Transport(String),

    /// The provider answered with a body that is not a token response.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The redirect URL lacks a usable `code` and `state`.
    #[error("Invalid callback: {0}")]
    InvalidCallback(String),
}
