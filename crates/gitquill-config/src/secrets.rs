//! OAuth app credential resolution.
//!
//! Resolution order:
//! 1. Environment variable
//! 2. Config file (with warning at load time for the secret)

/// Environment variable for the OAuth app client ID.
pub const CLIENT_ID_ENV: &str = "GITHUB_CLIENT_ID";

/// Environment variable for the OAuth app client secret.
pub const CLIENT_SECRET_ENV: &str = "GITHUB_CLIENT_SECRET";

/// Result of secret resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the OAuth client ID.
pub fn resolve_client_id(config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve(CLIENT_ID_ENV, std::env::var(CLIENT_ID_ENV).ok(), config_value)
}

/// Resolve the OAuth client secret.
pub fn resolve_client_secret(config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve(
        CLIENT_SECRET_ENV,
        std::env::var(CLIENT_SECRET_ENV).ok(),
        config_value,
    )
}

fn resolve(
    env_var: &str,
    env_value: Option<String>,
    config_value: Option<&str>,
) -> Option<ResolvedSecret> {
    if let Some(value) = env_value
        && !value.is_empty()
    {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(env_var.to_string()),
        });
    }

    config_value
        .filter(|v| !v.is_empty())
        .map(|v| ResolvedSecret {
            value: v.to_string(),
            source: SecretSource::ConfigFile,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins_over_config() {
        let resolved = resolve("X", Some("from-env".into()), Some("from-file")).unwrap();
        assert_eq!(resolved.value, "from-env");
        assert_eq!(resolved.source, SecretSource::EnvVar("X".into()));
    }

    #[test]
    fn test_empty_env_falls_back_to_config() {
        let resolved = resolve("X", Some(String::new()), Some("from-file")).unwrap();
        assert_eq!(resolved.value, "from-file");
        assert_eq!(resolved.source, SecretSource::ConfigFile);
    }

    #[test]
    fn test_nothing_configured() {
        assert!(resolve("X", None, None).is_none());
        assert!(resolve("X", None, Some("")).is_none());
    }

    #[test]
    fn test_source_display() {
        assert_eq!(
            SecretSource::EnvVar("GITHUB_CLIENT_SECRET".into()).to_string(),
            "env var GITHUB_CLIENT_SECRET"
        );
        assert_eq!(SecretSource::ConfigFile.to_string(), "config file (plaintext)");
    }
}
