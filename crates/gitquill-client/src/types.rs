//! Request and response types for the GitHub REST API.
//!
//! Only the fields the editing workflow reads are modeled; everything else in
//! the provider's payloads is ignored.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// Snapshot of the authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// GitHub username.
    pub login: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Display name (may be null if not set).
    #[serde(default)]
    pub name: Option<String>,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Repositories
// ─────────────────────────────────────────────────────────────────────────────

/// Account that owns a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

/// Repository summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: RepoOwner,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
    /// Whether this repository is itself a fork.
    #[serde(default)]
    pub fork: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Git references
// ─────────────────────────────────────────────────────────────────────────────

/// A git reference such as `refs/heads/main`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: GitObject,
}

/// Object a reference points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitObject {
    pub sha: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateRefRequest {
    #[serde(rename = "ref")]
    pub reference: String,
    pub sha: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Contents
// ─────────────────────────────────────────────────────────────────────────────

/// A file write: creation when `sha` is `None`, overwrite otherwise.
///
/// Overwrites must carry the blob sha of the version being replaced; the API
/// rejects stale shas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub content: String,
    pub message: String,
    pub branch: String,
    pub sha: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct FileWriteRequest<'a> {
    pub message: &'a str,
    pub content: String,
    pub branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<&'a str>,
}

/// A file fetched from the contents endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default)]
    pub name: String,
    pub path: String,
    pub sha: String,
    /// Base64 payload, wrapped at 60 columns by the provider.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub encoding: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

impl FileContent {
    /// Decode the file body as UTF-8 text.
    pub fn decoded(&self) -> Result<String> {
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        let bytes = STANDARD.decode(compact).map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("invalid base64 content for {}: {}", self.path, e),
        })?;
        String::from_utf8(bytes).map_err(|e| Error::RequestFailed {
            status: None,
            message: format!("{} is not UTF-8: {}", self.path, e),
        })
    }
}

/// Result of a contents PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCommit {
    #[serde(default)]
    pub content: Option<ContentSummary>,
    pub commit: CommitInfo,
}

/// The file as written by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSummary {
    pub path: String,
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// Commit created by a contents PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub sha: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pull requests
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct CreatePullRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub head: String,
    pub base: &'a str,
}

/// Pull request summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub title: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit workflow
// ─────────────────────────────────────────────────────────────────────────────

/// A single-file change to propose upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedEdit {
    /// File path inside the repository.
    pub path: String,
    /// New file body.
    pub content: String,
    /// Commit message.
    pub commit_message: String,
    /// Branch to create in the fork.
    pub branch: String,
    /// Pull request title.
    pub title: String,
    /// Pull request description.
    pub body: String,
    /// Upstream branch to merge into; also the branch the new one starts from.
    pub base: String,
}

/// Everything produced by a proposed edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub fork: Repository,
    pub commit: ContentCommit,
    pub pull_request: PullRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_profile_with_null_name() {
        let json = r#"{
            "login": "octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "name": null,
            "html_url": "https://github.com/octocat",
            "id": 583231
        }"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.name, None);
    }

    #[test]
    fn test_git_ref_field_rename() {
        let json = r#"{
            "ref": "refs/heads/main",
            "object": {"sha": "aa218f56b14c9653891f9e74264a383fa43fefbd", "type": "commit"}
        }"#;
        let git_ref: GitRef = serde_json::from_str(json).unwrap();
        assert_eq!(git_ref.reference, "refs/heads/main");
        assert_eq!(git_ref.object.kind, "commit");
    }

    #[test]
    fn test_file_write_request_omits_absent_sha() {
        let body = FileWriteRequest {
            message: "add post",
            content: "aGk=".to_string(),
            branch: "draft",
            sha: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["branch"], "draft");
    }

    #[test]
    fn test_file_content_decodes_wrapped_base64() {
        let file = FileContent {
            name: "post.md".to_string(),
            path: "posts/post.md".to_string(),
            sha: "abc".to_string(),
            content: "5L2g5aW9\nLCB3b3Js\nZA==\n".to_string(),
            encoding: "base64".to_string(),
            html_url: None,
        };
        assert_eq!(file.decoded().unwrap(), "你好, world");
    }
}
