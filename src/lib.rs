use std::future::Future;

use axum::{extract::Request, Router};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, info_span};

use crate::config::Config;
use crate::ingest::TelemetryIngest;
use crate::process::ProcessRegistry;
use crate::recorder::RecordingController;
use crate::service::database::DatabaseService;
use crate::status::StatusStore;

mod codec;
pub mod config;
mod entity;
mod error;
mod ingest;
mod migration;
mod process;
mod recorder;
mod result;
mod route;
mod service;
pub mod signal;
mod status;
pub mod utils;

pub async fn serve<F>(cfg: Config, listener: TcpListener, signal: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    info!("Server listening on {}", listener.local_addr().unwrap());

    let database = DatabaseService::new(&cfg.database)
        .await
        .expect("database init failed");

    let status = StatusStore::new();
    let recorder = RecordingController::new(ProcessRegistry::new(), cfg.decoder.clone());
    let ingest = TelemetryIngest::new(database.connection.clone(), status.clone());

    let app_state = AppState {
        database,
        recorder,
        status,
        ingest,
    };

    let app = Router::new()
        .merge(route::recording::route())
        .merge(route::telemetry::route())
        .merge(route::voltages::route())
        .merge(route::power::route())
        .merge(route::logs::route())
        .layer(if cfg.http.cors {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        })
        .with_state(app_state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let span = info_span!(
                    "http_request",
                    uri = ?request.uri(),
                    method = ?request.method(),
                    span_id = tracing::field::Empty,
                );
                span.record(
                    "span_id",
                    span.id().unwrap_or(tracing::Id::from_u64(42)).into_u64(),
                );
                span
            }),
        );

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .unwrap_or_else(|e| error!("Application error: {e}"));
}

#[derive(Clone)]
struct AppState {
    database: DatabaseService,
    recorder: RecordingController,
    status: StatusStore,
    ingest: TelemetryIngest,
}
