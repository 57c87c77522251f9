//! Integration tests for the `ontap-san` CLI binary.
//!
//! Argument parsing, help output, shell completions, and exit codes, plus
//! end-to-end runs against a wiremock stand-in for the cluster.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `ontap-san` binary with env isolation.
///
/// Clears every connection variable and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn ontap_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ontap-san");
    cmd.env("HOME", "/tmp/ontap-san-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/ontap-san-cli-test-nonexistent")
        .env_remove("HOST")
        .env_remove("USER")
        .env_remove("PASSWORD")
        .env_remove("ONTAP_OAUTH_TOKEN")
        .env_remove("INSECURE")
        .env_remove("ONTAP_TIMEOUT")
        .env_remove("ONTAP_PROFILE")
        .env_remove("ONTAP_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Same as [`ontap_cmd`], connected to `server` with Basic credentials.
fn connected_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = ontap_cmd();
    cmd.env("HOST", server.uri())
        .env("USER", "admin")
        .env("PASSWORD", "secret");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

const LUN_CREATE: [&str; 11] = [
    "lun-create",
    "--svm",
    "svm1",
    "--volume",
    "vol1",
    "--lun",
    "lun1",
    "--size",
    "100G",
    "--os-type",
    "linux",
];

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = ontap_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    ontap_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("lun-create")
            .and(predicate::str::contains("igroup-add-initiators"))
            .and(predicate::str::contains("lunmap-delete")),
    );
}

#[test]
fn test_version_flag() {
    ontap_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ontap-san"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    ontap_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    ontap_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Usage errors ────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    ontap_cmd()
        .arg("volume-create")
        .assert()
        .code(2)
        .stderr(
            predicate::str::starts_with("error[usage]:")
                .and(predicate::str::contains("volume-create")),
        );
}

#[test]
fn test_missing_required_flag() {
    ontap_cmd()
        .args(["lun-create", "--svm", "svm1", "--volume", "vol1", "--lun", "lun1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--size"));
}

#[test]
fn test_unknown_os_type_rejected() {
    ontap_cmd()
        .args(["lun-create", "--svm", "s", "--volume", "v", "--lun", "l", "--size", "1G"])
        .args(["--os-type", "plan9"])
        .assert()
        .code(2);
}

#[test]
fn test_unknown_placeholder_os_type_rejected() {
    ontap_cmd()
        .args(["lun-create", "--svm", "s", "--volume", "v", "--lun", "l", "--size", "1G"])
        .args(["--os-type", "unknown"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("error[usage]:"));
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_no_host_configured() {
    ontap_cmd()
        .arg("lun-list")
        .assert()
        .code(2)
        .stderr(
            predicate::str::contains("error[config]").and(predicate::str::contains("host")),
        );
}

#[test]
fn test_missing_credentials() {
    ontap_cmd()
        .args(["lun-list", "--host", "127.0.0.1:1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("error[authentication]"));
}

#[test]
fn test_missing_profile() {
    ontap_cmd()
        .args(["lun-list", "--profile", "lab"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'lab' not found"));
}

#[test]
fn test_verbose_prints_help_text() {
    ontap_cmd()
        .args(["-v", "lun-list", "--host", "127.0.0.1:1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ONTAP_OAUTH_TOKEN"));
}

// ── End-to-end against a mock cluster ───────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_lun_create_posts_bytes_and_prints_uuid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/storage/luns"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(body_partial_json(json!({
            "name": "/vol/vol1/lun1",
            "os_type": "linux",
            "space": { "size": 107_374_182_400_u64 }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "num_records": 1,
            "records": [{ "uuid": "5c254d22-96a6-42ac-aad8-0cd9ebd126b6", "name": "/vol/vol1/lun1" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(LUN_CREATE)
        .args(["--output", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5c254d22-96a6-42ac-aad8-0cd9ebd126b6\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bearer_token_from_env() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/storage/luns"))
        .and(header("authorization", "Bearer tok-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .expect(1)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .env("ONTAP_OAUTH_TOKEN", "tok-env")
        .arg("lun-list")
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lun_list_json_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/storage/luns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{
                "uuid": "u-1",
                "name": "/vol/vol1/lun1",
                "svm": { "name": "svm1" },
                "space": { "size": 4096 },
                "status": { "state": "online" },
                "os_type": "vmware"
            }],
            "num_records": 1
        })))
        .mount(&server)
        .await;

    let output = connected_cmd(&server)
        .args(["lun-list", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed[0]["uuid"], "u-1");
    assert_eq!(parsed[0]["volume"], "vol1");
    assert_eq!(parsed[0]["os_type"], "vmware");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_exits_nonzero() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "Volume \"vol1\" does not exist", "code": "917927" }
        })))
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(LUN_CREATE)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[api]").and(predicate::str::contains("917927")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_size_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(["lun-create", "--svm", "svm1", "--volume", "vol1", "--lun", "lun1"])
        .arg("--size=10X")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[validation]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lun_delete_missing_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/storage/luns/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "message": "entry doesn't exist", "code": "4" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(["lun-delete", "--uuid", "gone", "--yes"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("error[not-found]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_without_yes_refuses_non_interactively() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(["lun-delete", "--uuid", "u-1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_forbidden_maps_to_permission_exit_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "message": "not authorized for that command", "code": "6" }
        })))
        .mount(&server)
        .await;

    connected_cmd(&server)
        .arg("igroup-list")
        .assert()
        .code(5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_lunmap_delete_by_names() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/protocols/san/lun-maps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{ "lun": { "uuid": "l-1" }, "igroup": { "uuid": "i-1" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/protocols/san/lun-maps/l-1/i-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    connected_cmd(&server)
        .args(["lunmap-delete", "--lun", "/vol/vol1/lun1", "--igroup", "hosts", "-y"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Unmapped"));
}

/// Write a config with a default `lab` profile pointing at `server`.
fn lab_profile(server: &MockServer) -> tempfile::TempDir {
    let config_home = tempfile::tempdir().unwrap();
    let dir = config_home.path().join("ontap-san");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "default_profile = \"lab\"\n\n\
             [profiles.lab]\n\
             host = \"{}\"\n\
             username = \"ops\"\n\
             password_env = \"LAB_CLUSTER_PASSWORD\"\n",
            server.uri()
        ),
    )
    .unwrap();
    config_home
}

async fn mount_igroup_list(server: &MockServer, authorization: &str) {
    Mock::given(method("GET"))
        .and(path("/api/protocols/san/igroups"))
        .and(header("authorization", authorization))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [{ "uuid": "i-1", "name": "hosts", "os_type": "linux", "protocol": "iscsi" }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_username_beats_login_user() {
    let server = MockServer::start().await;
    // ops:from-env
    mount_igroup_list(&server, "Basic b3BzOmZyb20tZW52").await;
    let config_home = lab_profile(&server);

    ontap_cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("USER", "alice")
        .env("LAB_CLUSTER_PASSWORD", "from-env")
        .args(["igroup-list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("i-1\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_flag_beats_profile_username() {
    let server = MockServer::start().await;
    // root:from-env
    mount_igroup_list(&server, "Basic cm9vdDpmcm9tLWVudg==").await;
    let config_home = lab_profile(&server);

    ontap_cmd()
        .env("XDG_CONFIG_HOME", config_home.path())
        .env("USER", "alice")
        .env("LAB_CLUSTER_PASSWORD", "from-env")
        .args(["igroup-list", "--user", "root", "-o", "plain"])
        .assert()
        .success();
}
