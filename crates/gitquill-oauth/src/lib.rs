//! GitHub OAuth for gitquill.
//!
//! # Components
//!
//! - [`oauth`]: state nonce, authorization URL, provider token exchange, callback parsing
//! - [`proxy`]: Axum-based token exchange proxy that keeps the client secret server-side

pub mod error;
pub mod oauth;
pub mod proxy;

pub use error::{OAuthError, Result};
pub use oauth::{OAuthConfig, ProviderExchange, TokenResponse};
pub use proxy::{DEFAULT_PROVIDER_TIMEOUT, EXCHANGE_PATH, ProxyConfig, ProxyServer};
