//! Maintenance endpoints under `/admin`. These bypass latency and failure
//! injection.

use axum::{extract::State, Json};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::errors::AppError;
use crate::models::SuccessResponse;
use crate::seed::{seed_db, SeedOutcome};
use crate::state::AppState;
use crate::store::snapshot::{Snapshot, StoreStatus};

/// GET /admin/status
pub async fn handle_status(State(state): State<AppState>) -> Result<Json<StoreStatus>, AppError> {
    Ok(Json(state.store.status().await?))
}

/// GET /admin/export
pub async fn handle_export(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    Ok(Json(state.store.export_snapshot().await?))
}

/// POST /admin/import
///
/// Replaces every collection with the snapshot. Duplicate ids inside the
/// snapshot abort the whole import with 409.
pub async fn handle_import(
    State(state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Result<Json<StoreStatus>, AppError> {
    state.store.import_snapshot(&snapshot).await?;
    Ok(Json(state.store.status().await?))
}

/// POST /admin/reset
pub async fn handle_reset(
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.reset().await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /admin/seed
pub async fn handle_seed(State(state): State<AppState>) -> Result<Json<SeedOutcome>, AppError> {
    let mut rng = StdRng::from_entropy();
    let outcome = seed_db(&state.store, &state.catalog, &mut rng, state.seed_candidates).await?;
    Ok(Json(outcome))
}
