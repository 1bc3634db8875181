//! End-to-end edit workflow: fork, branch, commit, pull request.

use crate::client::EditClient;
use crate::error::Result;
use crate::types::{EditOutcome, FileWrite, ProposedEdit};

/// Edit workflow API client.
pub struct EditsApi {
    client: EditClient,
}

impl EditsApi {
    pub(crate) fn new(client: EditClient) -> Self {
        Self { client }
    }

    /// Propose a single-file change to the upstream repository.
    ///
    /// Steps run in order and stop at the first failure; earlier steps are
    /// not undone.
    pub async fn propose(&self, edit: &ProposedEdit) -> Result<EditOutcome> {
        let repos = self.client.repos();

        let fork = repos.fork_repo().await?;
        let fork_owner = fork.owner.login.clone();
        let fork_name = fork.name.clone();

        repos
            .create_branch(&fork_owner, &fork_name, &edit.branch, &edit.base)
            .await?;

        let existing = repos
            .get_file(&fork_owner, &fork_name, &edit.path, Some(&edit.branch))
            .await?;

        let commit = repos
            .create_or_update_file(&FileWrite {
                owner: fork_owner,
                repo: fork_name,
                path: edit.path.clone(),
                content: edit.content.clone(),
                message: edit.commit_message.clone(),
                branch: edit.branch.clone(),
                sha: existing.map(|file| file.sha),
            })
            .await?;

        let pull_request = repos
            .create_pull_request(&edit.title, &edit.body, &edit.branch, &edit.base)
            .await?;

        tracing::info!(number = pull_request.number, url = %pull_request.html_url, "Edit proposed");
        Ok(EditOutcome {
            fork,
            commit,
            pull_request,
        })
    }
}
