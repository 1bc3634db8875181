//! Serve command - runs the token exchange proxy.

use std::net::SocketAddr;

use anyhow::{Context as _, Result};
use clap::Args;
use console::Style;

use gitquill_config::{resolve_client_id, resolve_client_secret};
use gitquill_oauth::{EXCHANGE_PATH, ProxyConfig, ProxyServer};

use super::Context;

/// Arguments for the serve command.
///
/// CLI arguments override config file values.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config)
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Disable the permissive CORS layer
    #[arg(long)]
    pub no_cors: bool,
}

/// Run the serve command.
pub async fn run(args: ServeArgs, ctx: &Context) -> Result<()> {
    let section = ctx.config.proxy();

    let bind = args.bind.unwrap_or_else(|| section.bind.clone());
    let bind_addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", bind))?;

    let client_id = resolve_client_id(section.client_id.as_deref());
    let client_secret = resolve_client_secret(section.client_secret.as_deref());

    for (name, secret) in [("client id", &client_id), ("client secret", &client_secret)] {
        if let Some(secret) = secret {
            tracing::debug!(source = %secret.source, "Resolved {}", name);
        }
    }

    let mut config = ProxyConfig::new(bind_addr)
        .with_token_url(&section.token_url)
        .with_timeout(section.timeout());
    config.enable_cors = section.enable_cors && !args.no_cors;
    match (client_id, client_secret) {
        (Some(id), Some(secret)) => {
            config = config.with_credentials(id.value, secret.value);
        }
        _ => {
            tracing::warn!(
                "GitHub OAuth credentials are not configured; every exchange will fail. \
                 Set GITHUB_CLIENT_ID and GITHUB_CLIENT_SECRET."
            );
        }
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let addr = ProxyServer::new(config)
        .run_with_shutdown(async move {
            shutdown_rx.await.ok();
        })
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    if ctx.json_output {
        println!(
            "{}",
            serde_json::json!({ "listening": addr.to_string(), "path": EXCHANGE_PATH })
        );
    } else {
        let green = Style::new().green();
        println!(
            "{} Token exchange proxy listening on http://{}{}",
            green.apply_to("✓"),
            addr,
            EXCHANGE_PATH
        );
        println!("Press Ctrl-C to stop.");
    }

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    tracing::info!("Shutting down token exchange proxy");
    shutdown_tx.send(()).ok();

    Ok(())
}
