//! Configuration system for gitquill.
//!
//! Provides TOML-based configuration with:
//! - A `[github]` section describing the OAuth app and the upstream content repository
//! - A `[proxy]` section for the token exchange proxy
//! - A `[storage]` section for persisted client state
//! - Config file layering (XDG user config + project-local overrides)
//! - Client credential resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, data_dir, load_config, load_config_file, load_config_with_options, save_config,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, resolve_client_id, resolve_client_secret};
pub use types::*;
