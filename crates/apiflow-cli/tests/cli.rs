use assert_cmd::Command;
use predicates::str::{contains, starts_with};
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;

fn apiflow(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("apiflow"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("APIFLOW_DISABLE_SYSTEM_PROXY", "1")
        .env_remove("APIFLOW_LOG")
        .env_remove("APIFLOW_CONCURRENCY")
        .env_remove("APIFLOW_PUBLISH_URL")
        .env_remove("APIFLOW_PUBLISH_TOKEN");
    cmd
}

fn write_flow(dir: &TempDir, document: Value) -> std::path::PathBuf {
    let path = dir.path().join("flow.json");
    std::fs::write(&path, serde_json::to_string_pretty(&document).unwrap()).unwrap();
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).unwrap()
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    apiflow(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("ApiFlow"));
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    apiflow(home.path()).arg("--version").assert().success();
}

#[test]
fn test_cli_completions() {
    let home = TempDir::new().unwrap();
    apiflow(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(starts_with("_apiflow"));
}

#[test]
fn test_init_then_order() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("flow.json");

    apiflow(home.path())
        .args(["init", path.to_str().unwrap()])
        .assert()
        .success();
    apiflow(home.path())
        .args(["init", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    let output = apiflow(home.path())
        .args(["--format", "json", "order", path.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body = stdout_json(&output.stdout);
    assert_eq!(body["order"], json!(["1", "2"]));
    assert_eq!(body["cycleDetected"], json!(false));
}

#[test]
fn test_order_reports_cycle() {
    let home = TempDir::new().unwrap();
    let path = write_flow(
        &home,
        json!({
            "nodes": [
                {"id": "a", "endpointTemplate": "https://x/a"},
                {"id": "b", "endpointTemplate": "https://x/b"},
                {"id": "c", "endpointTemplate": "https://x/c"}
            ],
            "edges": [
                {"source": "b", "target": "c"},
                {"source": "c", "target": "b"}
            ]
        }),
    );

    let output = apiflow(home.path())
        .args(["--format", "json", "order", path.to_str().unwrap()])
        .output()
        .unwrap();
    let body = stdout_json(&output.stdout);
    assert_eq!(body["order"], json!(["a"]));
    assert_eq!(body["cycleDetected"], json!(true));
    assert_eq!(body["unordered"], json!(["b", "c"]));
}

#[test]
fn test_snapshot_without_edges_is_rejected() {
    let home = TempDir::new().unwrap();
    let path = write_flow(&home, json!({"nodes": []}));

    apiflow(home.path())
        .args(["order", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("edges"));
}

#[test]
fn test_validate_strict_dangling_edge_fails() {
    let home = TempDir::new().unwrap();
    let path = write_flow(
        &home,
        json!({
            "nodes": [{"id": "1", "endpointTemplate": "https://x/1"}],
            "edges": [{"source": "1", "target": "2"}]
        }),
    );

    apiflow(home.path())
        .args(["validate", path.to_str().unwrap()])
        .assert()
        .success();
    apiflow(home.path())
        .args(["validate", "--strict", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("Validation failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_run_against_live_server() {
    use wiremock::matchers::{body_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7, "name": "Ann"}])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/7/copies"))
        .and(body_string(r#"{"name": "Ann"}"#))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let flow = write_flow(
        &home,
        json!({
            "nodes": [
                {"id": "1", "label": "List", "method": "GET", "endpointTemplate": format!("{}/users", server.uri())},
                {"id": "2", "label": "Copy", "method": "POST",
                 "endpointTemplate": format!("{}/users/{{node_1.0.id}}/copies", server.uri()),
                 "bodyTemplate": "{\"name\": \"{node_1.0.name}\"}"},
                {"id": "3", "label": "Broken", "method": "DELETE", "endpointTemplate": format!("{}/missing", server.uri())}
            ],
            "edges": [{"source": "1", "target": "2"}, {"source": "2", "target": "3"}]
        }),
    );
    let flow_arg = flow.to_str().unwrap().to_string();
    let home_path = home.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        apiflow(&home_path)
            .args(["--format", "json", "run", "--write-back", &flow_arg])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let report = stdout_json(&output.stdout);
    assert_eq!(report["order"], json!(["1", "2", "3"]));
    assert_eq!(report["outcomes"]["2"], json!({"success": {"ok": true}}));
    assert!(report["outcomes"]["3"]["error"].as_str().unwrap().contains("404"));

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&flow).unwrap()).unwrap();
    assert_eq!(saved["nodes"][1]["status"], json!("success"));
    assert_eq!(saved["nodes"][2]["status"], json!("error"));
}

#[test]
fn test_publish_without_endpoint_fails() {
    let home = TempDir::new().unwrap();
    let path = write_flow(&home, json!({"nodes": [], "edges": []}));

    apiflow(home.path())
        .args(["publish", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("No publish endpoint configured"));
}
