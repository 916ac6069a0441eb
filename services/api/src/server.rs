use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEventStore, JsonlEventStore};
use crate::routes::with_kiosk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use emotion_pay::checkout::{EventIngestService, EventStore};
use emotion_pay::config::AppConfig;
use emotion_pay::error::AppError;
use emotion_pay::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.store.directory.clone() {
        Some(directory) => {
            let store = JsonlEventStore::open(&directory).await?;
            info!(directory = %directory.display(), "appending events to json lines files");
            serve(config, Arc::new(store)).await
        }
        None => {
            info!("keeping events in memory; set APP_STORE_DIR to persist them");
            serve(config, Arc::new(InMemoryEventStore::default())).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: Arc<S>) -> Result<(), AppError>
where
    S: EventStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let ingest = Arc::new(EventIngestService::new(store));
    let app = with_kiosk_routes(ingest)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "emotion pay event api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
