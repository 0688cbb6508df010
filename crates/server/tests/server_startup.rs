//! Black-box server startup tests: spawn the real binary and probe it.

use std::io::Write;
use std::net::TcpListener;
use std::time::Duration;

use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::time::sleep;

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Create a minimal valid config
fn minimal_config(port: u16, db_path: &std::path::Path) -> String {
    format!(
        r#"
[auth]
method = "none"

[server]
host = "127.0.0.1"
port = {}

[database]
path = "{}"
"#,
        port,
        db_path.display()
    )
}

/// Spawn the server and return a handle
fn spawn_server(config_path: &std::path::Path) -> tokio::process::Child {
    tokio::process::Command::new(env!("CARGO_BIN_EXE_mealog"))
        .env("MEALOG_CONFIG", config_path)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true)
        .spawn()
        .expect("Failed to spawn server")
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/api/v1/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_server_starts_and_serves_health() {
    let port = get_available_port();
    let db_dir = tempfile::tempdir().unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        "{}",
        minimal_config(port, &db_dir.path().join("mealog.db"))
    )
    .unwrap();

    let _server = spawn_server(config_file.path());
    assert!(wait_for_server(port, 100).await, "Server never became ready");

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/health", port))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_server_serves_metrics_and_config() {
    let port = get_available_port();
    let db_dir = tempfile::tempdir().unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        "{}",
        minimal_config(port, &db_dir.path().join("mealog.db"))
    )
    .unwrap();

    let _server = spawn_server(config_file.path());
    assert!(wait_for_server(port, 100).await, "Server never became ready");

    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/metrics", port))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let text = response.text().await.unwrap();
    assert!(text.contains("mealog_http_requests_total"));

    let response = client
        .get(format!("http://127.0.0.1:{}/api/v1/config", port))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["auth"]["method"], "none");
}

#[tokio::test]
async fn test_meals_unavailable_without_llm() {
    // With no [llm] section the extractor is absent, so logging a meal
    // reports service unavailable rather than crashing.
    let port = get_available_port();
    let db_dir = tempfile::tempdir().unwrap();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        "{}",
        minimal_config(port, &db_dir.path().join("mealog.db"))
    )
    .unwrap();

    let _server = spawn_server(config_file.path());
    assert!(wait_for_server(port, 100).await, "Server never became ready");

    let client = Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/api/v1/meals", port))
        .json(&serde_json::json!({
            "description": "pasta al pomodoro 200g",
            "meal_type": "lunch"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 503);
}
