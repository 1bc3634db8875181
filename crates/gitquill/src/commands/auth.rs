//! Auth command - GitHub sign-in management.

use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use console::{Style, style};

use gitquill_client::Navigator;

use super::Context;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Start GitHub sign-in (opens the authorization page)
    Login {
        /// Print the authorization URL without opening a browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Finish sign-in with the values GitHub redirected back with
    Callback {
        /// Authorization code
        #[arg(long, required_unless_present = "url", requires = "state")]
        code: Option<String>,

        /// State nonce
        #[arg(long, requires = "code")]
        state: Option<String>,

        /// Full redirect URL (instead of --code and --state)
        #[arg(long, conflicts_with_all = ["code", "state"])]
        url: Option<String>,
    },

    /// Show sign-in status
    Status,

    /// Forget the stored access token
    Logout,
}

/// Run the auth command.
pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    match args.command {
        AuthCommand::Login { no_browser } => cmd_login(no_browser, ctx).await,
        AuthCommand::Callback { code, state, url } => cmd_callback(code, state, url, ctx).await,
        AuthCommand::Status => cmd_status(ctx).await,
        AuthCommand::Logout => cmd_logout(ctx).await,
    }
}

/// Shows the authorization URL and optionally opens it in the default browser.
#[derive(Debug)]
struct BrowserNavigator {
    open: bool,
    json_output: bool,
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> std::io::Result<()> {
        if self.json_output {
            println!("{}", serde_json::json!({ "authorize_url": url }));
        } else {
            println!("Open this URL in your browser:");
            println!();
            println!("  {}", url);
            println!();
        }

        if self.open {
            open_url(url)?;
        }
        Ok(())
    }
}

async fn cmd_login(no_browser: bool, ctx: &Context) -> Result<()> {
    let github = ctx.config.github();
    if gitquill_config::resolve_client_id(github.client_id.as_deref()).is_none() {
        anyhow::bail!(
            "GitHub client ID not configured. Set GITHUB_CLIENT_ID or [github] client_id."
        );
    }

    let navigator = Arc::new(BrowserNavigator {
        open: !no_browser,
        json_output: ctx.json_output,
    });
    let client = ctx.client(Some(navigator))?;

    if !ctx.json_output {
        println!("{}", style("GitHub Sign-in").bold());
        println!("{}", Style::new().dim().apply_to("─".repeat(40)));
        println!();
    }

    client.login();

    if !ctx.json_output {
        println!("After approving, GitHub redirects to {}.", github.redirect_uri);
        println!("Finish with:");
        println!();
        println!("  gitquill auth callback --url '<redirect url>'");
    }

    Ok(())
}

async fn cmd_callback(
    code: Option<String>,
    state: Option<String>,
    url: Option<String>,
    ctx: &Context,
) -> Result<()> {
    let (code, state) = match (url, code, state) {
        (Some(url), _, _) => gitquill_oauth::oauth::parse_callback_url(&url)
            .map_err(|e| anyhow::anyhow!("Failed to parse redirect URL: {}", e))?,
        (None, Some(code), Some(state)) => (code, state),
        _ => anyhow::bail!("Provide --url, or both --code and --state"),
    };

    let client = ctx.client(None)?;
    client.init().await;

    if !client.handle_callback(&code, &state).await {
        let reason = client
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown error".to_string());
        anyhow::bail!("Sign-in failed: {}", reason);
    }

    let session = client.session();
    let Some(user) = session.user() else {
        let reason = client
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "profile unavailable".to_string());
        anyhow::bail!("Token obtained but sign-in could not complete: {}", reason);
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        let green = Style::new().green();
        println!("{} Signed in as {}", green.apply_to("✓"), user.login);
        if client.is_owner() {
            println!("  You own {}/{}", client.repository().owner, client.repository().name);
        }
    }

    Ok(())
}

async fn cmd_status(ctx: &Context) -> Result<()> {
    let client = ctx.client(None)?;
    client.init().await;

    let session = client.session();
    let repo = client.repository();

    if ctx.json_output {
        let status = serde_json::json!({
            "authenticated": client.is_authenticated(),
            "login": session.user().map(|u| u.login.clone()),
            "is_owner": client.is_owner(),
            "repository": format!("{}/{}", repo.owner, repo.name),
            "error": client.last_error().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", style("Authentication Status").bold());
    println!("{}", Style::new().dim().apply_to("─".repeat(40)));

    match session.user() {
        Some(user) => {
            println!("GitHub: signed in as {}", user.login);
            if let Some(name) = &user.name {
                println!("  Name: {}", name);
            }
            println!("  Profile: {}", user.html_url);
            println!(
                "  Repository: {}/{}{}",
                repo.owner,
                repo.name,
                if client.is_owner() { " (owner)" } else { "" }
            );
        }
        None => {
            println!("GitHub: not signed in");
            if let Some(e) = client.last_error() {
                println!("  Last error: {}", e);
            }
            println!("  Run 'gitquill auth login' to sign in");
        }
    }

    Ok(())
}

async fn cmd_logout(ctx: &Context) -> Result<()> {
    let client = ctx.client(None)?;
    client.logout();

    if ctx.json_output {
        println!("{}", serde_json::json!({ "authenticated": false }));
    } else {
        println!("Signed out. Stored token removed.");
    }

    Ok(())
}

/// Try to open a URL in the default browser.
fn open_url(url: &str) -> std::io::Result<()> {
    let (program, args) = browser_command(std::env::consts::OS, url);
    std::process::Command::new(program).args(args).status()?;
    Ok(())
}

/// Program and arguments that open `url` on `os`.
///
/// The URL is always a single argument. On Windows it goes to the URL
/// protocol handler directly, since `cmd /C start` splits it at `&`.
fn browser_command(os: &str, url: &str) -> (&'static str, Vec<String>) {
    match os {
        "macos" => ("open", vec![url.to_string()]),
        "windows" => (
            "rundll32",
            vec!["url.dll,FileProtocolHandler".to_string(), url.to_string()],
        ),
        _ => ("xdg-open", vec![url.to_string()]),
    }
}
