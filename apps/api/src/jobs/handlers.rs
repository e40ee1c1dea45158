//! Axum route handlers for the Jobs API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::jobs::ordering::reorder;
use crate::models::job::{Job, JobPatch, ListJobsQuery, NewJob, ReorderRequest};
use crate::models::now_ms;
use crate::models::page::{paginate, Page};
use crate::models::SuccessResponse;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: usize = 8;

fn job_not_found() -> AppError {
    AppError::NotFound("Job not found".to_string())
}

/// GET /api/jobs
///
/// Filters by title/tag substring and exact status, sorts by board order,
/// then paginates. `total` is the filtered count.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListJobsQuery>,
) -> Result<Json<Page<Job>>, AppError> {
    let mut jobs: Vec<Job> = state.store.to_array().await?;

    let search = params.search.unwrap_or_default().to_lowercase();
    if !search.is_empty() {
        jobs.retain(|j| j.matches_search(&search));
    }
    if let Some(status) = params.status.filter(|s| !s.is_empty()) {
        jobs.retain(|j| j.status.map(|s| s.as_str()) == Some(status.as_str()));
    }
    jobs.sort_by_key(|j| j.order);

    Ok(Json(paginate(
        jobs,
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    )))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Job>, AppError> {
    let job = state.store.get::<Job>(&id).await?.ok_or_else(job_not_found)?;
    Ok(Json(job))
}

/// GET /api/jobs/by-slug/:slug
pub async fn handle_get_job_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Job>, AppError> {
    let job = state
        .store
        .index::<Job>("slug")?
        .equals(slug)
        .await?
        .into_iter()
        .next()
        .ok_or_else(job_not_found)?;
    Ok(Json(job))
}

/// POST /api/jobs
///
/// Appends the job to the end of the board. Slug and status are stored as sent.
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(payload): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    state.simulation.check_write("create job")?;

    let order = state.store.count::<Job>().await? as i64 + 1;
    let job = payload.into_job(order, now_ms());
    state.store.add(&job).await?;

    info!("Created job {} '{}' at position {}", job.id, job.title, job.order);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PATCH /api/jobs/:id
pub async fn handle_patch_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Result<Json<Job>, AppError> {
    state.simulation.check_write("patch job")?;

    let existing = state.store.get::<Job>(&id).await?.ok_or_else(job_not_found)?;
    let updated = patch.apply(existing);
    state.store.put(&updated).await?;

    info!("Updated job {id}");
    Ok(Json(updated))
}

/// PATCH /api/jobs/:id/reorder
///
/// Renumbers the whole board in one transaction so `order` stays a
/// permutation of `1..=N` even if a write fails midway.
pub async fn handle_reorder_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.simulation.check_write("reorder job")?;

    let jobs: Vec<Job> = state.store.to_array().await?;
    let reordered = reorder(jobs, &id, req.to_order).ok_or_else(job_not_found)?;

    let mut tx = state.store.transaction().await?;
    for job in &reordered {
        tx.put(job).await?;
    }
    tx.commit().await?;

    info!(
        "Moved job {id} from {:?} to position {} ({} jobs renumbered)",
        req.from_order,
        req.to_order,
        reordered.len()
    );
    Ok(Json(SuccessResponse::ok()))
}
