use crate::infra::{AppState, Desk};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use licita::error::AppError;
use licita::workflows::import::TenderCsvImporter;
use licita::workflows::tenders::{tender_router, Tender};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tracing::info;

pub(crate) fn with_service_routes(desk: Arc<Desk>) -> Router {
    tender_router(desk.clone())
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/import/csv", post(import_csv_endpoint))
        .layer(Extension(desk))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Registers every row of a spreadsheet export sent as the request body.
pub(crate) async fn import_csv_endpoint(
    Extension(desk): Extension<Arc<Desk>>,
    body: String,
) -> Result<(StatusCode, Json<Vec<Tender>>), AppError> {
    let drafts = TenderCsvImporter::from_reader(Cursor::new(body.into_bytes()))?;
    let now = Utc::now();
    let created = drafts
        .into_iter()
        .map(|draft| desk.register(draft, now))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = created.len(), "spreadsheet rows registered");
    Ok((StatusCode::CREATED, Json(created)))
}
