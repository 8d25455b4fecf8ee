use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::error;

use crate::entity::voltages;
use crate::error::AppError;
use crate::result::Result;
use crate::service::voltages::VoltagesService;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoltagesResponse {
    current_date_time: DateTime<Utc>,
    voltage_data: Vec<voltages::Model>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoltageByIdResponse {
    current_date_time: DateTime<Utc>,
    current_voltage: voltages::Model,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddVoltageResponse {
    message: String,
    voltage: f64,
}

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/voltages", get(get_voltages).post(add_voltage))
        .route("/api/voltages/:id", get(get_voltage_by_id))
}

fn read_voltage_from_sensor() -> f64 {
    rand::thread_rng().gen_range(1..=10) as f64
}

async fn get_voltages(State(state): State<AppState>) -> Result<Json<VoltagesResponse>> {
    match VoltagesService::all(state.database.get_connection()).await {
        Ok(rows) => Ok(Json(VoltagesResponse {
            current_date_time: Utc::now(),
            voltage_data: rows,
        })),
        Err(e) => {
            error!("Failed to fetch voltages: {}", e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}

async fn add_voltage(State(state): State<AppState>) -> Result<Json<AddVoltageResponse>> {
    let reading = read_voltage_from_sensor();
    VoltagesService::insert(
        state.database.get_connection(),
        "New sensor reading".to_string(),
        reading,
        Utc::now(),
    )
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(AddVoltageResponse {
        message: "Voltage added".to_string(),
        voltage: reading,
    }))
}

async fn get_voltage_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<VoltageByIdResponse>> {
    match VoltagesService::by_id(state.database.get_connection(), id).await {
        Ok(Some(row)) => Ok(Json(VoltageByIdResponse {
            current_date_time: Utc::now(),
            current_voltage: row,
        })),
        Ok(None) => Err(AppError::ResourceNotFound),
        Err(e) => {
            error!("Failed to fetch voltage {}: {}", id, e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}
