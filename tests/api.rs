use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;

use groundlink::config::Config;

mod common;
use common::shutdown_signal;

fn fake_decoder(dir: &TempDir) -> String {
    let path = dir.path().join("decoder.sh");
    fs::write(
        &path,
        "#!/bin/sh\ncase \"$1\" in\n  start) exec sleep 30 ;;\n  stop) echo finalized ;;\nesac\n",
    )
    .unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }
    path.to_string_lossy().into_owned()
}

fn test_config(dir: &TempDir) -> Config {
    let mut cfg = Config::default();
    cfg.database.url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("test.db3").display()
    );
    cfg.decoder.command = fake_decoder(dir);
    cfg.decoder.grace_ms = 20;
    cfg.decoder.finalize_timeout_ms = 3000;
    cfg
}

async fn spawn_server(cfg: Config) -> SocketAddr {
    let ip = IpAddr::V4(Ipv4Addr::LOCALHOST);
    let listener = TcpListener::bind(SocketAddr::new(ip, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(groundlink::serve(cfg, listener, shutdown_signal()));
    addr
}

fn encode(text: &str) -> String {
    text.bytes().map(|b| format!("{b:08b}")).collect()
}

#[tokio::test]
async fn test_recording_status_defaults_idle() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;

    let body: Value = reqwest::get(format!("http://{addr}/api/recording/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "idle");
}

#[tokio::test]
async fn test_status_update_round_trip() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    let res = client
        .post(format!("http://{addr}/api/recording/status"))
        .json(&serde_json::json!({
            "status": "recording",
            "timestamp": "2025-03-01T12:00:00Z"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let body: Value = reqwest::get(format!("http://{addr}/api/recording/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "recording");

    // no live process: the composite view must not report recording
    let composite: Value = reqwest::get(format!("http://{addr}/api/status"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(composite["recording"], false);
    assert_eq!(composite["status"], "recording");
}

#[tokio::test]
async fn test_afsk_audio_ingest_with_voltage() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    let res = client
        .post(format!("http://{addr}/api/afsk/audio"))
        .json(&serde_json::json!({ "binaryData": encode("V10") }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["ascii"], "V10");

    let telemetry: Value = reqwest::get(format!("http://{addr}/api/telemetry"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = telemetry.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["message"], "V10");
    assert_eq!(rows[0]["binaryData"], encode("V10"));

    let voltages: Value = reqwest::get(format!("http://{addr}/api/voltages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let readings = voltages["voltageData"].as_array().unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["volt"], 10.0);
}

#[tokio::test]
async fn test_afsk_audio_rejects_bad_payloads() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    let res = client
        .post(format!("http://{addr}/api/afsk/audio"))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("http://{addr}/api/afsk/audio"))
        .json(&serde_json::json!({ "binaryData": "0101" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    // neither rejection persisted anything
    let telemetry: Value = reqwest::get(format!("http://{addr}/api/telemetry"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(telemetry.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recording_lifecycle() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    let res = client
        .post(format!("http://{addr}/api/recording/start"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["pid"].as_u64().is_some());

    // second start is rejected, never queued
    let res = client
        .post(format!("http://{addr}/api/recording/start"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CONFLICT);

    let res = client
        .post(format!("http://{addr}/api/recording/stop"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["output"].as_str().unwrap().contains("finalized"));

    // nothing left to stop
    let res = client
        .post(format!("http://{addr}/api/recording/stop"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    // reset always succeeds
    let res = client
        .post(format!("http://{addr}/api/recording/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn test_stop_after_reset_reports_not_running() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    client
        .post(format!("http://{addr}/api/recording/start"))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    client
        .post(format!("http://{addr}/api/recording/reset"))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .post(format!("http://{addr}/api/recording/stop"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sensor_and_log_crud() {
    let dir = TempDir::new().unwrap();
    let addr = spawn_server(test_config(&dir)).await;
    let client = Client::new();

    let res = client
        .post(format!("http://{addr}/api/power"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let power: Value = reqwest::get(format!("http://{addr}/api/power"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(power["powerData"].as_array().unwrap().len(), 1);

    let res = client
        .post(format!("http://{addr}/api/logs"))
        .json(&serde_json::json!({
            "callsign": "W1AW",
            "telemetryData": "V7 at pass start"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let logs: Value = reqwest::get(format!("http://{addr}/api/logs"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = logs.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["callsign"], "W1AW");

    let res = reqwest::get(format!("http://{addr}/api/voltages/999")).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
}
