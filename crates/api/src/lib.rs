//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - `POST /generate_report`, which schedules a report and answers at once
//! - `GET /health`
//! - JSON error responses built from `AppError`

pub mod error;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tally_core::reports::ReportDispatcher;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body. Report requests are a handful of fields.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Schedules report pipelines without waiting for them.
    pub reports: Arc<dyn ReportDispatcher>,
}

impl AppState {
    /// Creates the state around a dispatcher.
    pub fn new(reports: Arc<dyn ReportDispatcher>) -> Self {
        Self { reports }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
