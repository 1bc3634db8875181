//! Errors raised while loading or writing `gitquill.toml` / `config.toml`.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// A config file could not be read, written, or understood.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the config layout.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}
