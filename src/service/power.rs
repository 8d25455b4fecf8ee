use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entity::power::{self, Entity as Power};

pub struct PowerService;

impl PowerService {
    pub async fn insert(
        db: &DatabaseConnection,
        message: String,
        watt: i32,
        created_at: DateTime<Utc>,
    ) -> Result<power::Model> {
        let row = power::ActiveModel {
            message: Set(message),
            watt: Set(watt),
            created_at: Set(chrono::DateTime::<chrono::FixedOffset>::from(created_at)),
            ..Default::default()
        };
        Ok(row.insert(db).await?)
    }

    pub async fn all(db: &DatabaseConnection) -> Result<Vec<power::Model>> {
        Ok(Power::find().all(db).await?)
    }

    pub async fn by_id(db: &DatabaseConnection, id: i32) -> Result<Option<power::Model>> {
        Ok(Power::find_by_id(id).one(db).await?)
    }
}
