//! Repo command - fork, branch, commit and pull request operations.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;
use serde::Serialize;

use gitquill_client::{DEFAULT_BRANCH, EditClient, FileWrite, ProposedEdit};

use super::Context;

/// Arguments for the repo command.
#[derive(Args, Debug)]
pub struct RepoArgs {
    #[command(subcommand)]
    pub command: RepoCommand,
}

/// Where new file content comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ContentSource {
    /// Read the file body from a local path
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Use this text as the file body
    #[arg(long)]
    pub content: Option<String>,
}

impl ContentSource {
    fn read(&self) -> Result<String> {
        match (&self.file, &self.content) {
            (Some(path), _) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, Some(content)) => Ok(content.clone()),
            (None, None) => anyhow::bail!("Provide --file or --content"),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// Fork the upstream repository (or find the existing fork)
    Fork,

    /// Show your fork of the upstream repository, if any
    CheckFork,

    /// Create a branch from the head of another branch
    Branch {
        /// New branch name
        name: String,

        /// Branch to start from
        #[arg(long, default_value = DEFAULT_BRANCH)]
        from: String,

        /// Repository owner (default: your login)
        #[arg(long)]
        owner: Option<String>,

        /// Repository name (default: the configured repository)
        #[arg(long)]
        repo: Option<String>,
    },

    /// Create or update a file on a branch
    Put {
        /// File path inside the repository
        path: String,

        #[command(flatten)]
        source: ContentSource,

        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Target branch
        #[arg(short, long)]
        branch: String,

        /// Blob sha of the version being replaced (omit to create)
        #[arg(long)]
        sha: Option<String>,

        /// Repository owner (default: your login)
        #[arg(long)]
        owner: Option<String>,

        /// Repository name (default: the configured repository)
        #[arg(long)]
        repo: Option<String>,
    },

    /// Open a pull request from your fork into the upstream repository
    Pr {
        /// Pull request title
        #[arg(short, long)]
        title: String,

        /// Pull request description
        #[arg(long, default_value = "")]
        body: String,

        /// Branch in your fork
        #[arg(long)]
        head: String,

        /// Upstream branch to merge into
        #[arg(long, default_value = DEFAULT_BRANCH)]
        base: String,
    },

    /// Fork, branch, commit and open a pull request in one step
    Propose {
        /// File path inside the repository
        path: String,

        #[command(flatten)]
        source: ContentSource,

        /// Branch to create in your fork
        #[arg(short, long)]
        branch: String,

        /// Pull request title (also the default commit message)
        #[arg(short, long)]
        title: String,

        /// Commit message (default: the title)
        #[arg(short, long)]
        message: Option<String>,

        /// Pull request description
        #[arg(long, default_value = "")]
        body: String,

        /// Upstream branch to start from and merge into
        #[arg(long, default_value = DEFAULT_BRANCH)]
        base: String,
    },
}

/// Run the repo command.
pub async fn run(args: RepoArgs, ctx: &Context) -> Result<()> {
    let client = ctx.authenticated_client().await?;
    let repos = client.repos();
    let green = Style::new().green();
    let dim = Style::new().dim();

    match args.command {
        RepoCommand::Fork => {
            let fork = repos.fork_repo().await?;
            if ctx.json_output {
                print_json(&fork)?;
            } else {
                println!("{} Fork ready: {}", green.apply_to("✓"), fork.full_name);
                println!("  {}", dim.apply_to(&fork.html_url));
            }
        }
        RepoCommand::CheckFork => match repos.check_fork().await {
            Some(fork) => {
                if ctx.json_output {
                    print_json(&fork)?;
                } else {
                    println!("Fork: {}", fork.full_name);
                    println!("  {}", dim.apply_to(&fork.html_url));
                }
            }
            None => {
                if ctx.json_output {
                    println!("null");
                } else {
                    println!("No fork found. Run 'gitquill repo fork' to create one.");
                }
            }
        },
        RepoCommand::Branch {
            name,
            from,
            owner,
            repo,
        } => {
            let (owner, repo) = target(&client, owner, repo);
            let created = repos.create_branch(&owner, &repo, &name, &from).await?;
            if ctx.json_output {
                print_json(&created)?;
            } else {
                println!(
                    "{} Created {} in {}/{} at {}",
                    green.apply_to("✓"),
                    name,
                    owner,
                    repo,
                    dim.apply_to(short_sha(&created.object.sha))
                );
            }
        }
        RepoCommand::Put {
            path,
            source,
            message,
            branch,
            sha,
            owner,
            repo,
        } => {
            let (owner, repo) = target(&client, owner, repo);
            let write = FileWrite {
                owner,
                repo,
                path,
                content: source.read()?,
                message,
                branch,
                sha,
            };
            let result = repos.create_or_update_file(&write).await?;
            if ctx.json_output {
                print_json(&result)?;
            } else {
                println!(
                    "{} Committed {} to {} ({})",
                    green.apply_to("✓"),
                    write.path,
                    write.branch,
                    dim.apply_to(short_sha(&result.commit.sha))
                );
            }
        }
        RepoCommand::Pr {
            title,
            body,
            head,
            base,
        } => {
            let pr = repos.create_pull_request(&title, &body, &head, &base).await?;
            if ctx.json_output {
                print_json(&pr)?;
            } else {
                println!("{} Opened pull request #{}", green.apply_to("✓"), pr.number);
                println!("  {}", pr.html_url);
            }
        }
        RepoCommand::Propose {
            path,
            source,
            branch,
            title,
            message,
            body,
            base,
        } => {
            let edit = ProposedEdit {
                path,
                content: source.read()?,
                commit_message: message.unwrap_or_else(|| title.clone()),
                branch,
                title,
                body,
                base,
            };
            let outcome = client.edits().propose(&edit).await?;
            if ctx.json_output {
                print_json(&outcome)?;
            } else {
                println!("Fork:   {}", outcome.fork.full_name);
                println!(
                    "Commit: {} on {}",
                    short_sha(&outcome.commit.commit.sha),
                    edit.branch
                );
                println!(
                    "{} Opened pull request #{}",
                    green.apply_to("✓"),
                    outcome.pull_request.number
                );
                println!("  {}", outcome.pull_request.html_url);
            }
        }
    }

    Ok(())
}

/// Owner and repository a command acts on. Defaults to the user's fork.
fn target(client: &EditClient, owner: Option<String>, repo: Option<String>) -> (String, String) {
    let owner = owner
        .or_else(|| client.session().user().map(|u| u.login.clone()))
        .unwrap_or_else(|| client.repository().owner.clone());
    let repo = repo.unwrap_or_else(|| client.repository().name.clone());
    (owner, repo)
}

fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
