use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::entity::telemetry;
use crate::error::AppError;
use crate::result::Result;
use crate::service::telemetry::{TelemetryQueryParams, TelemetryService};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AfskAudio {
    binary_data: Option<String>,
    plot_path: Option<String>,
    goertzel_plot_path: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AfskResponse {
    success: bool,
    message: String,
    ascii: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    plot_path: Option<String>,
}

#[derive(Deserialize)]
struct TelemetryQuery {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/afsk/audio", post(afsk_audio))
        .route("/api/telemetry", get(get_telemetry))
}

async fn afsk_audio(
    State(state): State<AppState>,
    Json(body): Json<AfskAudio>,
) -> Result<Json<AfskResponse>> {
    let binary = body.binary_data.unwrap_or_default();
    let plot_path = body.plot_path.clone();
    let outcome = state
        .ingest
        .ingest(&binary, body.plot_path, body.goertzel_plot_path, body.timestamp)
        .await?;
    Ok(Json(AfskResponse {
        success: true,
        message: "Data stored successfully".to_string(),
        ascii: outcome.ascii,
        plot_path,
    }))
}

async fn get_telemetry(
    State(state): State<AppState>,
    Query(query): Query<TelemetryQuery>,
) -> Result<Json<Vec<telemetry::Model>>> {
    let params = TelemetryQueryParams {
        start: query.start,
        end: query.end,
    };
    match TelemetryService::query(state.database.get_connection(), params).await {
        Ok(rows) => Ok(Json(rows)),
        Err(e) => {
            error!("Failed to fetch telemetry: {}", e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}
