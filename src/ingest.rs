use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::{debug, warn};

use crate::codec;
use crate::error::AppError;
use crate::result::Result;
use crate::service::telemetry::TelemetryService;
use crate::service::voltages::VoltagesService;
use crate::status::{RecordingStatus, StatusStore};

pub struct IngestOutcome {
    pub ascii: String,
}

/// Consumes decoded AFSK payloads and recorder status reports, persisting
/// telemetry rows and derived voltage readings.
#[derive(Clone)]
pub struct TelemetryIngest {
    db: DatabaseConnection,
    status: StatusStore,
}

impl TelemetryIngest {
    pub fn new(db: DatabaseConnection, status: StatusStore) -> Self {
        Self { db, status }
    }

    /// Decodes a bitstream payload and persists it. `created_at` is always
    /// server-generated; a caller-supplied timestamp is only logged, so
    /// clock skew across callers cannot reorder rows.
    pub async fn ingest(
        &self,
        binary_data: &str,
        plot_path: Option<String>,
        goertzel_plot_path: Option<String>,
        client_timestamp: Option<DateTime<Utc>>,
    ) -> Result<IngestOutcome> {
        if binary_data.is_empty() {
            return Err(AppError::MissingPayload);
        }
        let ascii = codec::decode(binary_data)?;
        debug!(ascii = %ascii, ?client_timestamp, "decoded AFSK payload");

        let now = Utc::now();
        TelemetryService::insert(
            &self.db,
            ascii.clone(),
            Some(binary_data.to_string()),
            plot_path,
            goertzel_plot_path,
            now,
        )
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Some(volt) = codec::extract_voltage_strict(&ascii) {
            // independent fact: a failed voltage insert must not undo the
            // telemetry row
            if let Err(e) = VoltagesService::insert(&self.db, ascii.clone(), volt, now).await {
                warn!(error = %e, volt, "voltage insert failed, telemetry row kept");
            }
        }

        Ok(IngestOutcome { ascii })
    }

    /// Records a recorder lifecycle report. The status store is updated
    /// before the persistence calls; this is the store's only write path,
    /// and pollers must keep lifecycle visibility when persistence fails.
    pub async fn ingest_status(
        &self,
        status: &str,
        timestamp: Option<DateTime<Utc>>,
        error: Option<String>,
    ) -> Result<()> {
        self.status.set(RecordingStatus {
            status: status.to_string(),
            timestamp: Some(timestamp.unwrap_or_else(Utc::now)),
            error: error.clone(),
        });

        let message = match &error {
            Some(e) => format!("Recording {status}: {e}"),
            None => format!("Recording {status}"),
        };
        let now = Utc::now();
        TelemetryService::insert(&self.db, message, None, None, None, now)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if let Some(volt) = codec::extract_voltage_loose(status) {
            if let Err(e) = VoltagesService::insert(
                &self.db,
                "Telemetry voltage reading".to_string(),
                volt,
                now,
            )
            .await
            {
                warn!(error = %e, volt, "voltage insert failed for status reading");
            }
        }

        Ok(())
    }
}
