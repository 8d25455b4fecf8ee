use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recorder::CompositeStatus;
use crate::result::Result;
use crate::status::RecordingStatus;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StartResponse {
    success: bool,
    message: String,
    pid: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StopResponse {
    success: bool,
    message: String,
    output: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetResponse {
    success: bool,
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdate {
    status: String,
    timestamp: Option<DateTime<Utc>>,
    error: Option<String>,
}

#[derive(Serialize)]
struct Ack {
    success: bool,
}

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/recording/start", post(start))
        .route("/api/recording/stop", post(stop))
        .route("/api/recording/reset", post(reset))
        .route("/api/recording/status", post(update_status).get(get_status))
        .route("/api/status", get(composite))
}

async fn start(State(state): State<AppState>) -> Result<Json<StartResponse>> {
    let pid = state.recorder.start().await?;
    Ok(Json(StartResponse {
        success: true,
        message: "Recording started".to_string(),
        pid,
    }))
}

async fn stop(State(state): State<AppState>) -> Result<Json<StopResponse>> {
    let output = state.recorder.stop().await?;
    Ok(Json(StopResponse {
        success: true,
        message: "Recording stopped and processed".to_string(),
        output,
    }))
}

async fn reset(State(state): State<AppState>) -> Result<Json<ResetResponse>> {
    state.recorder.reset().await?;
    Ok(Json(ResetResponse {
        success: true,
        message: "Recording reset".to_string(),
    }))
}

async fn update_status(
    State(state): State<AppState>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Ack>> {
    state
        .ingest
        .ingest_status(&body.status, body.timestamp, body.error)
        .await?;
    Ok(Json(Ack { success: true }))
}

async fn get_status(State(state): State<AppState>) -> Json<RecordingStatus> {
    Json(state.status.get())
}

async fn composite(State(state): State<AppState>) -> Json<CompositeStatus> {
    Json(state.recorder.composite(&state.status))
}
