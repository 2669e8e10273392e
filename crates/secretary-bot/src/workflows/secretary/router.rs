use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::json;

use super::status::StatusBoard;

/// Read-only endpoints over the routine's latest state.
pub fn status_router(board: Arc<StatusBoard>) -> Router {
    Router::new()
        .route("/api/v1/secretary/positions", get(positions_handler))
        .route("/api/v1/secretary/cycles/latest", get(latest_cycle_handler))
        .with_state(board)
}

pub(crate) async fn positions_handler(State(board): State<Arc<StatusBoard>>) -> Response {
    let snapshot = board.snapshot();
    let payload = json!({
        "device_id": snapshot.device_id,
        "updated_at": snapshot.updated_at,
        "positions": snapshot.positions,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn latest_cycle_handler(State(board): State<Arc<StatusBoard>>) -> Response {
    let snapshot = board.snapshot();
    match snapshot.latest_cycle {
        Some(report) => {
            let payload = json!({
                "cycles_run": snapshot.cycles_run,
                "last_error": snapshot.last_error,
                "report": report,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        None => {
            let payload = json!({
                "error": "no cycle has completed yet",
                "cycles_run": snapshot.cycles_run,
                "last_error": snapshot.last_error,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
