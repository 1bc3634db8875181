//! CLI integration tests for the gitquill command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Argument parsing works as expected
//! - Sign-in state is persisted to and read from the config directory
//!
//! Note: none of these tests reach GitHub. Every invocation runs against an
//! isolated temporary config directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the gitquill binary, isolated in `dir`.
fn gitquill(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gitquill").unwrap();
    cmd.current_dir(dir.path())
        .env("GITQUILL_CONFIG_DIR", dir.path())
        .env_remove("GITHUB_CLIENT_ID")
        .env_remove("GITHUB_CLIENT_SECRET");
    cmd
}

fn state_file(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("client-state.json")
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitquill"))
        .stdout(predicate::str::contains("pull requests"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gitquill"));
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("repo"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_repo_help_lists_operations() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["repo", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fork"))
        .stdout(predicate::str::contains("check-fork"))
        .stdout(predicate::str::contains("branch"))
        .stdout(predicate::str::contains("put"))
        .stdout(predicate::str::contains("pr"))
        .stdout(predicate::str::contains("propose"));
}

#[test]
fn test_global_flags_accepted() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["--verbose", "--json", "--help"])
        .assert()
        .success();
}

// ─────────────────────────────────────────────────────────────────────────────
// Argument Validation Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir).arg("publish").assert().failure();
}

#[test]
fn test_callback_requires_code_or_url() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir).args(["auth", "callback"]).assert().failure();
}

#[test]
fn test_callback_code_requires_state() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["auth", "callback", "--code", "abc"])
        .assert()
        .failure();
}

#[test]
fn test_put_requires_single_content_source() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args([
            "repo", "put", "posts/a.md", "-m", "msg", "-b", "draft", "--content", "x", "--file",
            "a.md",
        ])
        .assert()
        .failure();
}

#[test]
fn test_serve_rejects_bad_bind_address() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["serve", "--bind", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bind address"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Sign-in Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_login_without_client_id_fails() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["auth", "login", "--no-browser"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("client ID not configured"));
    assert!(!state_file(&dir).exists());
}

#[test]
fn test_login_prints_url_and_persists_state() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .env("GITHUB_CLIENT_ID", "Iv1.test")
        .args(["auth", "login", "--no-browser"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://github.com/login/oauth/authorize?client_id=Iv1.test",
        ))
        .stdout(predicate::str::contains("scope=public_repo"))
        .stdout(predicate::str::contains("state="));

    let saved = std::fs::read_to_string(state_file(&dir)).unwrap();
    assert!(saved.contains("oauth_state"));
}

#[test]
fn test_login_json_output() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .env("GITHUB_CLIENT_ID", "Iv1.test")
        .args(["--json", "auth", "login", "--no-browser"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authorize_url\""));
}

#[test]
fn test_callback_with_unknown_state_fails() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["auth", "callback", "--code", "abc", "--state", "forged"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("State verification failed"));
}

#[test]
fn test_callback_url_without_code_fails() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args([
            "auth",
            "callback",
            "--url",
            "http://localhost:3333/admin/callback?state=xyz",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse redirect URL"));
}

#[test]
fn test_status_when_signed_out() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not signed in"));
}

#[test]
fn test_status_json_reports_configured_repository() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[github]\nrepo_owner = \"someone\"\nrepo_name = \"site\"\n",
    )
    .unwrap();

    gitquill(&dir)
        .args(["--json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"authenticated\": false"))
        .stdout(predicate::str::contains("someone/site"));
}

#[test]
fn test_logout_when_signed_out() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Signed out"));
}

#[test]
fn test_repo_commands_require_sign_in() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["repo", "fork"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("[github]"));
    assert!(written.contains("[proxy]"));
    assert!(written.contains("timeout_secs = 30"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[github]\nrepo_owner = \"mine\"\n").unwrap();

    gitquill(&dir)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("mine"));

    gitquill(&dir)
        .args(["config", "init", "--force"])
        .assert()
        .success();
    assert!(!std::fs::read_to_string(&path).unwrap().contains("mine"));
}

#[test]
fn test_config_show_masks_client_secret() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[proxy]\nclient_secret = \"hunter2\"\ntimeout_secs = 7\n",
    )
    .unwrap();

    gitquill(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("timeout_secs = 7"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_path_uses_config_dir() {
    let dir = TempDir::new().unwrap();
    gitquill(&dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
