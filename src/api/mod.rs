//! HTTP API consumed by the browser UI.
//!
//! ## Endpoints
//!
//! - `POST /api/request` - dispatch a request and record it in history
//! - `GET /api/history?page=&limit=` - newest-first page of history records
//! - `GET /api/history/{id}` - a single history record
//! - `DELETE /api/history?id=` - delete a history record
//! - `GET /health` - liveness probe
//!
//! Failures are answered with `{ "error": "<message>" }`: 400 for invalid
//! input, 404 for unknown history ids, 500 for storage failures. A request
//! whose target cannot be reached is not a failure here; it is reported with
//! `status: 0` in a normal 200 response.

pub mod error;
pub mod history;
pub mod request;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::history::HistoryStorage;
use crate::runner::RequestExecutor;

/// Shared handles, created once at startup.
pub struct AppState {
    pub executor: RequestExecutor,
    pub storage: HistoryStorage,
}

impl AppState {
    pub fn new(executor: RequestExecutor) -> Self {
        let storage = executor.storage().clone();
        Self { executor, storage }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/request", post(request::dispatch))
        .route("/api/history", get(history::list).delete(history::delete))
        .route("/api/history/{id}", get(history::show))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
