use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary isolated from the developer's config and environment.
fn voxdesk(home: &TempDir) -> Result<Command> {
    let mut cmd = Command::cargo_bin("voxdesk")?;
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("XDG_STATE_HOME", home.path())
        .env_remove("VOXDESK_API_URL")
        .env_remove("VOXDESK_API_TOKEN")
        .env_remove("VOXDESK_STRIPE_PUBLISHABLE_KEY")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

#[test]
fn help_lists_resource_commands() -> Result<()> {
    let home = TempDir::new()?;
    voxdesk(&home)?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("agents"))
        .stdout(predicate::str::contains("calls"))
        .stdout(predicate::str::contains("VOXDESK_API_URL"));
    Ok(())
}

#[test]
fn missing_token_fails_before_any_request() -> Result<()> {
    let home = TempDir::new()?;
    voxdesk(&home)?
        .args(["agents", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
    Ok(())
}

#[test]
fn invalid_api_url_is_rejected() -> Result<()> {
    let home = TempDir::new()?;
    voxdesk(&home)?
        .args(["--api-url", "localhost:8000", "--token", "t", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_url must start with http"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn agents_list_prints_table() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agent"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "ag_1", "name": "Front desk", "config": { "language": "en-US" } }
        ])))
        .mount(&server)
        .await;

    let home = TempDir::new()?;
    let mut cmd = voxdesk(&home)?;
    cmd.env("VOXDESK_API_URL", server.uri())
        .env("VOXDESK_API_TOKEN", "secret")
        .args(["agents", "list"]);

    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await?;
    assert
        .success()
        .stdout(predicate::str::contains("Front desk"))
        .stdout(predicate::str::contains("en-US"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn api_errors_are_normalized() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "detail": "Token expired" })),
        )
        .mount(&server)
        .await;

    let home = TempDir::new()?;
    let mut cmd = voxdesk(&home)?;
    cmd.args(["--api-url", &server.uri(), "--token", "stale", "whoami"]);

    let assert = tokio::task::spawn_blocking(move || cmd.assert()).await?;
    assert
        .failure()
        .stderr(predicate::str::contains("Token expired"));
    Ok(())
}
