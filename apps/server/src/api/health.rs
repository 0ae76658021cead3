use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use givebox_storage_sqlite::db;

use crate::main_lib::AppState;

async fn healthz() -> &'static str {
    "ok"
}

/// Ready once the database answers a trivial query.
async fn readyz(State(state): State<Arc<AppState>>) -> (StatusCode, &'static str) {
    match db::ping(&state.pool) {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::warn!(error = %e, db = %state.db_path, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
