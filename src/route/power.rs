use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::error;

use crate::entity::power;
use crate::error::AppError;
use crate::result::Result;
use crate::service::power::PowerService;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PowerResponse {
    current_date_time: DateTime<Utc>,
    power_data: Vec<power::Model>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PowerByIdResponse {
    current_date_time: DateTime<Utc>,
    current_power: power::Model,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddPowerResponse {
    message: String,
    wattage: i32,
}

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/power", get(get_power).post(add_power))
        .route("/api/power/:id", get(get_power_by_id))
}

fn read_wattage_from_sensor() -> i32 {
    rand::thread_rng().gen_range(1..=10)
}

async fn get_power(State(state): State<AppState>) -> Result<Json<PowerResponse>> {
    match PowerService::all(state.database.get_connection()).await {
        Ok(rows) => Ok(Json(PowerResponse {
            current_date_time: Utc::now(),
            power_data: rows,
        })),
        Err(e) => {
            error!("Failed to fetch power readings: {}", e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}

async fn add_power(State(state): State<AppState>) -> Result<Json<AddPowerResponse>> {
    let reading = read_wattage_from_sensor();
    PowerService::insert(
        state.database.get_connection(),
        "New power reading".to_string(),
        reading,
        Utc::now(),
    )
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(Json(AddPowerResponse {
        message: "Power added".to_string(),
        wattage: reading,
    }))
}

async fn get_power_by_id(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PowerByIdResponse>> {
    match PowerService::by_id(state.database.get_connection(), id).await {
        Ok(Some(row)) => Ok(Json(PowerByIdResponse {
            current_date_time: Utc::now(),
            current_power: row,
        })),
        Ok(None) => Err(AppError::ResourceNotFound),
        Err(e) => {
            error!("Failed to fetch power reading {}: {}", id, e);
            Err(AppError::DatabaseError(e.to_string()))
        }
    }
}
