use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entity::voltages::{self, Entity as Voltages};

pub struct VoltagesService;

impl VoltagesService {
    pub async fn insert(
        db: &DatabaseConnection,
        message: String,
        volt: f64,
        created_at: DateTime<Utc>,
    ) -> Result<voltages::Model> {
        let row = voltages::ActiveModel {
            message: Set(message),
            volt: Set(volt),
            created_at: Set(chrono::DateTime::<chrono::FixedOffset>::from(created_at)),
            ..Default::default()
        };
        Ok(row.insert(db).await?)
    }

    pub async fn all(db: &DatabaseConnection) -> Result<Vec<voltages::Model>> {
        Ok(Voltages::find().all(db).await?)
    }

    pub async fn by_id(db: &DatabaseConnection, id: i32) -> Result<Option<voltages::Model>> {
        Ok(Voltages::find_by_id(id).one(db).await?)
    }
}
