//! Integration tests for the `sparrow` CLI binary.
//!
//! Argument parsing, help output, completions, config handling and error
//! exit codes, plus a couple of commands against a mocked hub.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sparrow` binary with env isolation.
///
/// Clears all `SPARROW_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn sparrow_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sparrow");
    cmd.env("HOME", "/tmp/sparrow-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/sparrow-cli-test-nonexistent")
        .env_remove("SPARROW_PROFILE")
        .env_remove("SPARROW_HUB")
        .env_remove("SPARROW_PROJECT")
        .env_remove("SPARROW_TOKEN")
        .env_remove("SPARROW_OUTPUT")
        .env_remove("SPARROW_TIMEOUT")
        .env_remove("SPARROW_HISTORY_HOURS");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const PROJECT: &str = "app:1234";
const GATEWAY: &str = "dev:1234";

async fn mount_devices(server: &MockServer) {
    let device_base = format!("/v1/projects/{PROJECT}/devices");

    Mock::given(method("GET"))
        .and(path(device_base.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{
                "uid": GATEWAY,
                "serial_number": "9101112",
                "last_activity": "2021-12-14T07:47:29Z",
                "voltage": 3.8
            }],
            "has_more": false
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{device_base}/{GATEWAY}/environment_variables")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "environment_variables": { "_sn": "Warehouse" }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{device_base}/{GATEWAY}/latest")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "latest_events": [] })))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = sparrow_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    sparrow_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Notehub")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("gateways"))
            .and(predicate::str::contains("latest")),
    );
}

#[test]
fn test_version_flag() {
    sparrow_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sparrow"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    sparrow_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    sparrow_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_toml_path() {
    sparrow_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_and_show_masks_token() {
    let home = tempfile::tempdir().unwrap();
    let isolated = || {
        let mut cmd = sparrow_cmd();
        cmd.env("HOME", home.path()).env("XDG_CONFIG_HOME", home.path());
        cmd
    };

    isolated()
        .args([
            "config",
            "init",
            "--project",
            PROJECT,
            "--token",
            "very-secret",
            "--plaintext",
        ])
        .assert()
        .success();

    isolated()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("project = \"app:1234\"")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("very-secret").not()),
        );

    isolated()
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));
}

#[test]
fn test_config_use_unknown_profile() {
    let output = sparrow_cmd()
        .args(["config", "use", "nope"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(text.contains("nope"), "Expected profile name in error:\n{text}");
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = sparrow_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_sync_without_project() {
    let output = sparrow_cmd().arg("sync").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("No project configured"),
        "Expected missing-project error:\n{text}"
    );
}

#[test]
fn test_sync_without_token_is_auth_error() {
    let output = sparrow_cmd()
        .args(["sync", "--project", PROJECT])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_invalid_hub_url_is_usage_error() {
    let output = sparrow_cmd()
        .args(["sync", "--project", PROJECT, "--token", "t", "--hub", "not a url"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Against a mocked hub ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gateways_list_plain() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    let output = sparrow_cmd()
        .args(["gateways", "list", "-o", "plain", "--project", PROJECT])
        .args(["--token", "t", "--hub", &server.uri()])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), GATEWAY);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_gateways_get_json() {
    let server = MockServer::start().await;
    mount_devices(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/projects/{PROJECT}/devices/{GATEWAY}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": GATEWAY,
            "serial_number": "9101112",
            "last_activity": "2021-12-14T07:47:29Z",
            "voltage": 3.8
        })))
        .mount(&server)
        .await;

    let output = sparrow_cmd()
        .args(["gateways", "get", GATEWAY, "-o", "json-compact"])
        .args(["--project", PROJECT, "--token", "t", "--hub", &server.uri()])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let gateway: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(gateway["uid"], GATEWAY);
    assert_eq!(gateway["name"], "Warehouse");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unauthorized_hub_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = sparrow_cmd()
        .args(["gateways", "list", "--project", PROJECT, "--token", "bad"])
        .args(["--hub", &server.uri()])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
