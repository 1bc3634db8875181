//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use gitquill_client::storage::TOKEN_KEY;
use gitquill_client::{EditClient, MemoryStore, Navigator, SharedStore};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const UPSTREAM_OWNER: &str = "upstream-owner";
pub const REPO_NAME: &str = "blog";
pub const TOKEN: &str = "gho_test_token";
pub const LOGIN: &str = "octocat";

/// Navigator that records every URL it is asked to open.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    pub urls: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) -> std::io::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub fn profile_json(login: &str) -> serde_json::Value {
    serde_json::json!({
        "login": login,
        "id": 1,
        "avatar_url": format!("https://avatars.example/{login}"),
        "name": "The Octocat",
        "html_url": format!("https://github.com/{login}")
    })
}

pub fn repo_json(owner: &str, name: &str) -> serde_json::Value {
    serde_json::json!({
        "id": 42,
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "owner": { "login": owner },
        "html_url": format!("https://github.com/{owner}/{name}"),
        "default_branch": "main",
        "fork": owner != UPSTREAM_OWNER
    })
}

pub fn client_with_store(server: &MockServer, store: SharedStore) -> EditClient {
    EditClient::builder()
        .api_url(server.uri())
        .exchange_url(format!("{}/api/github-oauth", server.uri()))
        .repository(UPSTREAM_OWNER, REPO_NAME)
        .store(store)
        .build()
        .unwrap()
}

pub fn client_with_navigator(
    server: &MockServer,
    store: SharedStore,
    navigator: Arc<RecordingNavigator>,
) -> EditClient {
    EditClient::builder()
        .api_url(server.uri())
        .exchange_url(format!("{}/api/github-oauth", server.uri()))
        .repository(UPSTREAM_OWNER, REPO_NAME)
        .store(store)
        .navigator(navigator)
        .build()
        .unwrap()
}

pub async fn mount_profile(server: &MockServer, login: &str) {
    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_json(login)))
        .mount(server)
        .await;
}

/// A client restored from a persisted token with the profile loaded.
pub async fn authenticated_client(server: &MockServer) -> EditClient {
    mount_profile(server, LOGIN).await;
    let store: SharedStore = Arc::new(MemoryStore::with_entries([(TOKEN_KEY, TOKEN)]));
    let client = client_with_store(server, store);
    client.init().await;
    assert!(client.is_authenticated());
    client
}
