pub mod admin;
pub mod health;

use axum::{
    extract::OriginalUri,
    http::Method,
    middleware,
    routing::{get, patch, post},
    Router,
};
use tracing::warn;

use crate::assessments::handlers as assessments;
use crate::candidates::handlers as candidates;
use crate::errors::AppError;
use crate::jobs::handlers as jobs;
use crate::simulation::simulate_latency;
use crate::state::AppState;

async fn api_fallback(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    warn!("No handler for {method} {}", uri.path());
    AppError::NotFound(format!("No handler for {method} {}", uri.path()))
}

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        // Jobs
        .route("/jobs", get(jobs::handle_list_jobs).post(jobs::handle_create_job))
        .route("/jobs/by-slug/:slug", get(jobs::handle_get_job_by_slug))
        .route("/jobs/:id", get(jobs::handle_get_job).patch(jobs::handle_patch_job))
        .route("/jobs/:id/reorder", patch(jobs::handle_reorder_job))
        // Candidates
        .route(
            "/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route(
            "/candidates/:id",
            get(candidates::handle_get_candidate).patch(candidates::handle_patch_candidate),
        )
        .route("/candidates/:id/timeline", get(candidates::handle_get_timeline))
        // Assessments; `:id` is the assessment id for GET and the job id for PUT
        .route(
            "/assessments",
            get(assessments::handle_list_assessments).post(assessments::handle_create_assessment),
        )
        .route("/assessments/job/:job_id", get(assessments::handle_list_for_job))
        .route(
            "/assessments/:id",
            get(assessments::handle_get_assessment).put(assessments::handle_replace_assessment),
        )
        .route("/assessments/:id/submit", post(assessments::handle_submit_response))
        .fallback(api_fallback)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            simulate_latency,
        ))
}

fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(admin::handle_status))
        .route("/export", get(admin::handle_export))
        .route("/import", post(admin::handle_import))
        .route("/reset", post(admin::handle_reset))
        .route("/seed", post(admin::handle_seed))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api_router(&state))
        .nest("/admin", admin_router())
        .with_state(state)
}
