use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use secretary_bot::config::AppConfig;
use secretary_bot::device::SystemClock;
use secretary_bot::error::AppError;
use secretary_bot::telemetry;
use secretary_bot::workflows::secretary::{ScheduledRoutine, SecretaryRoutine, StatusBoard};
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::{load_scenario, load_settings, simulated_session, AppState};
use crate::routes::with_status_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let settings = load_settings(config.routine.settings_path.as_deref())?;
    let scenario = load_scenario(args.scenario.as_deref())?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let device_id = config.routine.device_id.clone();
    let board = Arc::new(StatusBoard::new(device_id.clone()));
    let (_game, session) =
        simulated_session(&device_id, scenario, settings, Arc::new(SystemClock));
    let interval = Duration::from_secs(config.routine.interval_secs);
    let worker_board = board.clone();
    let worker = tokio::task::spawn_blocking(move || {
        ScheduledRoutine::new(SecretaryRoutine::new(session), interval, worker_board).run(None);
    });

    let app = with_status_routes(board)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        device_id = %device_id,
        interval_secs = config.routine.interval_secs,
        "secretary runner ready"
    );

    axum::serve(listener, app).await?;
    if worker.is_finished() {
        warn!("secretary routine worker stopped before the server");
    }
    Ok(())
}
