use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::telemetry::{self, Entity as Telemetry};

pub struct TelemetryQueryParams {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

pub struct TelemetryService;

impl TelemetryService {
    pub async fn insert(
        db: &DatabaseConnection,
        message: String,
        binary_data: Option<String>,
        plot_path: Option<String>,
        goertzel_plot_path: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<telemetry::Model> {
        let row = telemetry::ActiveModel {
            message: Set(message),
            binary_data: Set(binary_data),
            plot_path: Set(plot_path),
            goertzel_plot_path: Set(goertzel_plot_path),
            created_at: Set(chrono::DateTime::<chrono::FixedOffset>::from(created_at)),
            ..Default::default()
        };
        Ok(row.insert(db).await?)
    }

    pub async fn query(
        db: &DatabaseConnection,
        params: TelemetryQueryParams,
    ) -> Result<Vec<telemetry::Model>> {
        let mut query = Telemetry::find();

        if let Some(start) = params.start {
            let start = chrono::DateTime::<chrono::FixedOffset>::from(start);
            query = query.filter(telemetry::Column::CreatedAt.gte(start));
        }
        if let Some(end) = params.end {
            let end = chrono::DateTime::<chrono::FixedOffset>::from(end);
            query = query.filter(telemetry::Column::CreatedAt.lte(end));
        }

        let rows = query
            .order_by_desc(telemetry::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(rows)
    }
}
