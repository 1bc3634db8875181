//! Repository mutation API.
//!
//! Every call goes through [`EditClient::github_fetch`], so each one is a
//! single authenticated attempt.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::client::{EditClient, FetchOptions};
use crate::error::{Error, Result};
use crate::types::{
    ContentCommit, CreatePullRequest, CreateRefRequest, FileContent, FileWrite,
    FileWriteRequest, GitRef, PullRequest, Repository,
};

/// Branch used when the caller does not name one.
pub const DEFAULT_BRANCH: &str = "main";

/// Repository mutation API client.
pub struct ReposApi {
    client: EditClient,
}

impl ReposApi {
    pub(crate) fn new(client: EditClient) -> Self {
        Self { client }
    }

    fn login(&self) -> Result<String> {
        self.client
            .inner()
            .state
            .login()
            .ok_or_else(|| Error::NotAuthenticated("no user profile loaded".to_string()))
    }

    /// Fork the upstream repository into the user's account.
    ///
    /// If the provider says the fork already exists, the existing fork is
    /// fetched and returned instead.
    pub async fn fork_repo(&self) -> Result<Repository> {
        let repo = self.client.repository();
        let path = format!("repos/{}/{}/forks", repo.owner, repo.name);

        match self
            .client
            .github_fetch_as(&path, FetchOptions::post_empty())
            .await
        {
            Ok(fork) => Ok(fork),
            Err(e) if e.is_already_exists() => {
                let login = self.login()?;
                tracing::info!(%login, "Fork already exists, fetching it");
                self.client
                    .github_fetch_as(
                        &format!("repos/{}/{}", login, repo.name),
                        FetchOptions::get(),
                    )
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// The user's fork of the upstream repository, if it can be fetched.
    ///
    /// Never fails: a missing user, a missing fork, or any request error all
    /// come back as `None`.
    pub async fn check_fork(&self) -> Option<Repository> {
        let login = self.client.inner().state.login()?;
        let path = format!("repos/{}/{}", login, self.client.repository().name);

        match self.client.github_fetch_as(&path, FetchOptions::get()).await {
            Ok(fork) => Some(fork),
            Err(e) => {
                tracing::debug!(error = %e, "No usable fork");
                None
            }
        }
    }

    /// Commit a file. Creates it when `sha` is `None`, overwrites otherwise.
    pub async fn create_or_update_file(&self, write: &FileWrite) -> Result<ContentCommit> {
        let body = FileWriteRequest {
            message: &write.message,
            content: STANDARD.encode(write.content.as_bytes()),
            branch: &write.branch,
            sha: write.sha.as_deref(),
        };
        let body = serde_json::to_value(&body).map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("failed to encode request: {}", e),
        })?;

        let url = self
            .client
            .contents_url(&write.owner, &write.repo, &write.path)?;
        tracing::info!(
            repo = %format!("{}/{}", write.owner, write.repo),
            path = %write.path,
            branch = %write.branch,
            update = write.sha.is_some(),
            "Committing file"
        );
        self.client
            .github_fetch_as(url.as_str(), FetchOptions::put(body))
            .await
    }

    /// Fetch a file's metadata and content. `None` when it does not exist.
    pub async fn get_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: Option<&str>,
    ) -> Result<Option<FileContent>> {
        let mut url = self.client.contents_url(owner, repo, path)?;
        if let Some(branch) = branch {
            url.query_pairs_mut().append_pair("ref", branch);
        }

        match self
            .client
            .github_fetch_as(url.as_str(), FetchOptions::get())
            .await
        {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create `branch_name` pointing at the head of `from_branch`.
    ///
    /// Two requests, not atomic: when the lookup succeeds and the creation
    /// fails (e.g. the branch exists), nothing is undone and the error is
    /// returned as-is.
    pub async fn create_branch(
        &self,
        owner: &str,
        repo: &str,
        branch_name: &str,
        from_branch: &str,
    ) -> Result<GitRef> {
        let source: GitRef = self
            .client
            .github_fetch_as(
                &format!("repos/{}/{}/git/ref/heads/{}", owner, repo, from_branch),
                FetchOptions::get(),
            )
            .await?;

        let body = serde_json::to_value(CreateRefRequest {
            reference: format!("refs/heads/{}", branch_name),
            sha: source.object.sha,
        })
        .map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("failed to encode request: {}", e),
        })?;

        tracing::info!(%owner, %repo, branch = %branch_name, from = %from_branch, "Creating branch");
        self.client
            .github_fetch_as(
                &format!("repos/{}/{}/git/refs", owner, repo),
                FetchOptions::post(body),
            )
            .await
    }

    /// Open a pull request from `<login>:<head>` into the upstream `base`.
    pub async fn create_pull_request(
        &self,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> Result<PullRequest> {
        let login = self.login()?;
        let repo = self.client.repository();

        let request = serde_json::to_value(CreatePullRequest {
            title,
            body,
            head: format!("{}:{}", login, head),
            base,
        })
        .map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("failed to encode request: {}", e),
        })?;

        tracing::info!(head = %format!("{}:{}", login, head), %base, "Opening pull request");
        self.client
            .github_fetch_as(
                &format!("repos/{}/{}/pulls", repo.owner, repo.name),
                FetchOptions::post(request),
            )
            .await
    }
}
