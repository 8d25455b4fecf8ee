use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entity::logs::{self, Entity as Logs};

pub struct LogsService;

impl LogsService {
    pub async fn insert(
        db: &DatabaseConnection,
        callsign: String,
        telemetry_data: String,
        created_at: DateTime<Utc>,
    ) -> Result<logs::Model> {
        let row = logs::ActiveModel {
            callsign: Set(callsign),
            telemetry_data: Set(telemetry_data),
            created_at: Set(chrono::DateTime::<chrono::FixedOffset>::from(created_at)),
            ..Default::default()
        };
        Ok(row.insert(db).await?)
    }

    pub async fn all(db: &DatabaseConnection) -> Result<Vec<logs::Model>> {
        Ok(Logs::find().all(db).await?)
    }
}
