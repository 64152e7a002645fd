use assert_cmd::prelude::*;

use predicates::prelude::*;
use predicates::str::contains;
use serde_json::json;
use std::process::Command;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONNECTION_ARGS: [&str; 12] = [
  "--account",
  "xy12345",
  "--user",
  "analyst",
  "--password",
  "hunter2",
  "--warehouse",
  "COMPUTE_WH",
  "--database",
  "OPS",
  "--schema",
  "INCIDENTS",
];

/// Helper to create a Command for the `resolver` binary isolated from any
/// Snowflake settings in the calling environment.
fn resolver_cmd() -> Command {
  let mut cmd = Command::cargo_bin("resolver").expect("binary exists");
  for var in [
    "SNOWFLAKE_ACCOUNT",
    "SNOWFLAKE_USER",
    "SNOWFLAKE_PASSWORD",
    "SNOWFLAKE_WAREHOUSE",
    "SNOWFLAKE_DATABASE",
    "SNOWFLAKE_SCHEMA",
    "SNOWFLAKE_ROLE",
    "SNOWFLAKE_HOST",
    "RESOLVER_EMBED_MODEL",
    "RESOLVER_COMPLETION_MODEL",
    "RESOLVER_INCIDENT_TABLE",
    "RUST_LOG",
  ] {
    cmd.env_remove(var);
  }
  cmd
}

#[test]
fn test_help_lists_subcommands() {
  resolver_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(contains("resolve").and(contains("check")));
}

#[test]
fn test_blank_description_warns_without_connecting() {
  resolver_cmd()
    .arg("resolve")
    .args(CONNECTION_ARGS)
    .arg("   ")
    .assert()
    .success()
    .stdout(predicate::str::is_empty())
    .stderr(contains("Please enter an incident description."));
}

#[test]
fn test_missing_credentials_fail() {
  resolver_cmd()
    .args(["resolve", "--account", "xy12345", "API gateway timeout"])
    .assert()
    .failure()
    .stderr(contains("--user"));
}

#[test]
fn test_invalid_model_name_is_rejected() {
  resolver_cmd()
    .arg("resolve")
    .args(CONNECTION_ARGS)
    .args(["--completion-model", "arctic'); DROP TABLE x; --", "disk full"])
    .assert()
    .failure()
    .stderr(contains("Invalid Cortex configuration"));
}

#[test]
fn test_unreachable_host_reports_connection_error() {
  resolver_cmd()
    .arg("resolve")
    .args(CONNECTION_ARGS)
    .args(["--snowflake-host", "http://127.0.0.1:9", "disk full on db-3"])
    .assert()
    .failure()
    .stderr(contains("Error while connecting to Snowflake"));
}

#[test]
fn test_version_is_plain() {
  resolver_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(contains(env!("CARGO_PKG_VERSION")).and(contains("courtesy").not()));
}

#[test]
fn test_description_must_be_a_single_argument() {
  resolver_cmd()
    .arg("resolve")
    .args(CONNECTION_ARGS)
    .args(["disk", "full"])
    .assert()
    .failure()
    .stderr(contains("unexpected argument"));
}

fn ok_envelope(data: serde_json::Value) -> ResponseTemplate {
  ResponseTemplate::new(200).set_body_json(json!({
    "data": data, "code": null, "message": null, "success": true
  }))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_description_is_sent_unchanged() {
  let description = "disk  full\ton db-3\n  after failover";
  let server = MockServer::start().await;

  Mock::given(method("POST"))
    .and(path("/session/v1/login-request"))
    .respond_with(ok_envelope(json!({ "token": "cli-token" })))
    .mount(&server)
    .await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .and(body_partial_json(json!({ "bindings": { "1": { "type": "TEXT", "value": description } } })))
    .respond_with(ok_envelope(json!({ "rowset": [["[]"]] })))
    .with_priority(1)
    .expect(1)
    .mount(&server)
    .await;

  Mock::given(method("POST"))
    .and(path("/queries/v1/query-request"))
    .respond_with(ok_envelope(json!({ "rowset": [["Restart the storage controller."]] })))
    .expect(1)
    .mount(&server)
    .await;

  Mock::given(method("POST"))
    .and(path("/session"))
    .respond_with(ok_envelope(serde_json::Value::Null))
    .expect(1)
    .mount(&server)
    .await;

  let host = server.uri();
  let assert = tokio::task::spawn_blocking(move || {
    resolver_cmd()
      .arg("resolve")
      .args(CONNECTION_ARGS)
      .args(["--snowflake-host", host.as_str(), description])
      .assert()
  })
  .await
  .unwrap();

  assert
    .success()
    .stdout(contains("No relevant historical incidents found").and(contains("Restart the storage controller.")));
}
