//! Config command - inspect and initialize configuration.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;

use gitquill_config::GitQuillConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write a config file with every default filled in
    Init {
        /// Create project-local config (./gitquill.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the user config file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Init { local, force } => cmd_init(local, force, ctx),
        ConfigCommand::Path => cmd_path(ctx),
    }
}

/// User config file: `--config` directory first, then the platform default.
fn user_config_path(ctx: &Context) -> Result<PathBuf> {
    ctx.config_dir
        .as_ref()
        .map(|dir| dir.join("config.toml"))
        .or_else(gitquill_config::xdg_config_path)
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    if let Some(proxy) = config.proxy.as_mut()
        && proxy.client_secret.is_some()
    {
        proxy.client_secret = Some("********".to_string());
    }

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}

fn cmd_init(local: bool, force: bool, ctx: &Context) -> Result<()> {
    let path = if local {
        PathBuf::from("gitquill.toml")
    } else {
        user_config_path(ctx)?
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    gitquill_config::save_config(&GitQuillConfig::with_defaults(), &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote default config");

    if ctx.json_output {
        println!("{}", serde_json::json!({ "path": path.display().to_string() }));
    } else {
        let green = Style::new().green();
        println!("{} Wrote {}", green.apply_to("✓"), path.display());
    }
    Ok(())
}

fn cmd_path(ctx: &Context) -> Result<()> {
    let path = user_config_path(ctx)?;
    if ctx.json_output {
        println!("{}", serde_json::json!({ "path": path.display().to_string() }));
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
