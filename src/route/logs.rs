use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::entity::logs;
use crate::error::AppError;
use crate::result::Result;
use crate::service::logs::LogsService;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddLog {
    callsign: String,
    telemetry_data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddLogResponse {
    success: bool,
    message: String,
}

pub fn route() -> Router<AppState> {
    Router::new().route("/api/logs", get(get_logs).post(add_log))
}

async fn get_logs(State(state): State<AppState>) -> Result<Json<Vec<logs::Model>>> {
    match LogsService::all(state.database.get_connection()).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            error!("Failed to fetch logs: {}", e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}

async fn add_log(
    State(state): State<AppState>,
    Json(body): Json<AddLog>,
) -> Result<Json<AddLogResponse>> {
    if body.callsign.trim().is_empty() {
        return Err(AppError::MalformedPayload("callsign is required".to_string()));
    }

    LogsService::insert(
        state.database.get_connection(),
        body.callsign,
        body.telemetry_data,
        Utc::now(),
    )
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(AddLogResponse {
        success: true,
        message: "Log added successfully".to_string(),
    }))
}
