//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod repo;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use gitquill_client::{ClientBuilder, EditClient, FileStore, Navigator};
use gitquill_config::GitQuillConfig;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Merged configuration.
    pub config: GitQuillConfig,
    /// Explicit `--config` directory, if given.
    pub config_dir: Option<PathBuf>,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Directory holding the persisted token and OAuth state.
    pub fn data_dir(&self) -> Result<PathBuf> {
        self.config
            .storage()
            .dir
            .or_else(|| self.config_dir.clone())
            .or_else(|| gitquill_config::data_dir(&self.config))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
    }

    /// Build an edit client backed by the on-disk store.
    pub fn client(&self, navigator: Option<Arc<dyn Navigator>>) -> Result<EditClient> {
        let github = self.config.github();
        let client_id =
            gitquill_config::resolve_client_id(github.client_id.as_deref()).map(|s| s.value);

        let data_dir = self.data_dir()?;
        let mut builder = ClientBuilder::from_config(&github, client_id)
            .user_agent(format!("gitquill-cli/{}", env!("CARGO_PKG_VERSION")))
            .store(Arc::new(FileStore::new(&data_dir)));
        if let Some(navigator) = navigator {
            builder = builder.navigator(navigator);
        }

        builder.build().context("Failed to build GitHub client")
    }

    /// Build a client and restore the persisted session, failing when the
    /// user is not signed in.
    pub async fn authenticated_client(&self) -> Result<EditClient> {
        let client = self.client(None)?;
        client.init().await;

        if !client.is_authenticated() {
            match client.last_error() {
                Some(e) => anyhow::bail!("{}. Run 'gitquill auth login' to sign in again.", e),
                None => anyhow::bail!("Not signed in. Run 'gitquill auth login' first."),
            }
        }
        Ok(client)
    }
}
