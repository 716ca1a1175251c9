use crate::infra::{build_policy, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;
use subsidy_optimizer::error::AppError;
use subsidy_optimizer::workflows::allocation::{AllocationDocument, AllocationEngine};
use subsidy_optimizer::workflows::candidates::CandidateImporter;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct OptimizeRequest {
    #[serde(default)]
    pub(crate) budget: Option<f64>,
    #[serde(default)]
    pub(crate) alpha: Option<f64>,
    #[serde(default)]
    pub(crate) category_budgets: bool,
    /// Custom sub-budget shares keyed by category label.
    #[serde(default)]
    pub(crate) category_shares: BTreeMap<String, f64>,
    /// Inline eligibility results; replaces the configured dataset.
    #[serde(default)]
    pub(crate) candidates_csv: Option<String>,
}

pub(crate) fn optimizer_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/optimize", post(optimize_endpoint))
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

pub(crate) async fn optimize_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<OptimizeRequest>,
) -> Result<Json<AllocationDocument>, AppError> {
    let OptimizeRequest {
        budget,
        alpha,
        category_budgets,
        category_shares,
        candidates_csv,
    } = payload;
    let defaults = Arc::clone(&state.optimizer);
    let category_shares: Vec<(String, f64)> = category_shares.into_iter().collect();
    let policy = build_policy(
        alpha.unwrap_or(defaults.default_alpha),
        budget.unwrap_or(defaults.default_budget),
        category_budgets,
        &category_shares,
    )?;

    let document = tokio::task::spawn_blocking(move || -> Result<AllocationDocument, AppError> {
        let pool = match candidates_csv {
            Some(csv) => CandidateImporter::from_reader(Cursor::new(csv.into_bytes()))?,
            None => CandidateImporter::from_path(&defaults.candidates_path)?,
        };
        let run = AllocationEngine::new(policy).run(&pool.pairs)?;
        info!(
            pool_size = run.pool_size(),
            selected = run.selections().len(),
            "optimization request served"
        );
        Ok(run.document(Utc::now()))
    })
    .await
    .map_err(std::io::Error::other)??;

    Ok(Json(document))
}
