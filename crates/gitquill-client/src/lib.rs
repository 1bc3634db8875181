//! GitHub-backed content editing client.
//!
//! Authenticates a user against GitHub with the OAuth authorization-code flow
//! and proposes content changes through forks and pull requests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use gitquill_client::{EditClient, MemoryStore, ProposedEdit, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = EditClient::builder()
//!     .repository("aimerfeng", "AimerFeng_blog")
//!     .store(Arc::new(MemoryStore::new()))
//!     .build()?;
//!
//! // Restore a persisted session
//! client.init().await;
//!
//! // ... after the provider redirects back with `code` and `state`:
//! if client.handle_callback("code", "state").await {
//!     let outcome = client
//!         .edits()
//!         .propose(&ProposedEdit {
//!             path: "posts/hello.md".into(),
//!             content: "# Hello".into(),
//!             commit_message: "Add hello post".into(),
//!             branch: "hello-post".into(),
//!             title: "Add hello post".into(),
//!             body: String::new(),
//!             base: "main".into(),
//!         })
//!         .await?;
//!     println!("Opened {}", outcome.pull_request.html_url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;

pub use api::{DEFAULT_BRANCH, EditsApi, ReposApi};
pub use auth::Navigator;
pub use client::{ClientBuilder, EditClient, FetchOptions, RepoCoordinates};
pub use error::{Error, Result};
pub use session::{AuthPhase, Session};
pub use storage::{FileStore, KeyValueStore, MemoryStore, NullStore, SharedStore};
pub use types::*;
